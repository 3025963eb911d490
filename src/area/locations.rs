use crate::area::position::LonLat;
use crate::elements::Node;

use std::collections::BTreeMap;

/// Node coordinate store for resolving way node refs. Missing nodes
/// resolve to None rather than an error: partial extracts routinely
/// truncate ways at the boundary.
pub struct Locations {
    locs: BTreeMap<i64, LonLat>,
    max_locs: usize,
}

impl Locations {
    pub fn new() -> Locations {
        Locations {
            locs: BTreeMap::new(),
            max_locs: 0,
        }
    }

    pub fn add_node(&mut self, n: &Node) {
        self.locs.insert(n.id, LonLat::new(n.lon, n.lat));
        self.max_locs = usize::max(self.max_locs, self.locs.len());
    }

    pub fn get_loc(&self, i: &i64) -> Option<LonLat> {
        self.locs.get(i).map(|l| l.clone())
    }

    pub fn way_locs(&self, refs: &[i64]) -> Vec<Option<LonLat>> {
        refs.iter().map(|r| self.get_loc(r)).collect()
    }

    pub fn len(&self) -> usize {
        self.locs.len()
    }

    pub fn clear(&mut self) {
        self.locs.clear();
    }
}

impl std::fmt::Display for Locations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Locations[{} locations [{} max]]",
            self.locs.len(),
            self.max_locs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_way_locs() {
        let mut locs = Locations::new();
        let mut n = Node::new(1);
        n.lon = 100;
        n.lat = 200;
        locs.add_node(&n);
        let mut n = Node::new(2);
        n.lon = 300;
        n.lat = 400;
        locs.add_node(&n);

        let ll = locs.way_locs(&[1, 5, 2]);
        assert_eq!(ll[0], Some(LonLat::new(100, 200)));
        assert_eq!(ll[1], None);
        assert_eq!(ll[2], Some(LonLat::new(300, 400)));
        assert_eq!(locs.len(), 2);
    }
}
