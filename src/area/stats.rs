use std::fmt;
use std::ops::AddAssign;

/// Counters reported by assembler invocations and by the collector
/// itself. Merged by addition, so totals are independent of the order
/// the pieces arrive in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, serde::Serialize)]
pub struct AreaStats {
    pub from_relations: i64,
    pub from_ways: i64,
    pub outer_rings: i64,
    pub inner_rings: i64,
    pub open_rings: i64,
    pub wrong_role: i64,
    pub invalid_locations: i64,
    pub invalid_geometries: i64,
    pub no_way_members: i64,
    pub incomplete_relations: i64,
    pub skipped_unresolved: i64,
}

impl AreaStats {
    pub fn new() -> AreaStats {
        Default::default()
    }

    pub fn num_areas(&self) -> i64 {
        self.from_relations + self.from_ways
    }
}

impl AddAssign for AreaStats {
    fn add_assign(&mut self, other: AreaStats) {
        self.from_relations += other.from_relations;
        self.from_ways += other.from_ways;
        self.outer_rings += other.outer_rings;
        self.inner_rings += other.inner_rings;
        self.open_rings += other.open_rings;
        self.wrong_role += other.wrong_role;
        self.invalid_locations += other.invalid_locations;
        self.invalid_geometries += other.invalid_geometries;
        self.no_way_members += other.no_way_members;
        self.incomplete_relations += other.incomplete_relations;
        self.skipped_unresolved += other.skipped_unresolved;
    }
}

impl fmt::Display for AreaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AreaStats[{} from relations, {} from ways, {} outer / {} inner rings, {} open, {} wrong role, {} invalid locations, {} invalid geometries, {} without way members, {} incomplete, {} unresolved]",
            self.from_relations,
            self.from_ways,
            self.outer_rings,
            self.inner_rings,
            self.open_rings,
            self.wrong_role,
            self.invalid_locations,
            self.invalid_geometries,
            self.no_way_members,
            self.incomplete_relations,
            self.skipped_unresolved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assign_commutes() {
        let mut a = AreaStats::new();
        a.from_relations = 3;
        a.outer_rings = 4;
        a.open_rings = 1;

        let mut b = AreaStats::new();
        b.from_relations = 1;
        b.from_ways = 7;
        b.inner_rings = 2;

        let mut ab = a;
        ab += b;
        let mut ba = b;
        ba += a;
        assert_eq!(ab, ba);
        assert_eq!(ab.from_relations, 4);
        assert_eq!(ab.num_areas(), 11);
    }

    #[test]
    fn test_serialize() {
        let mut a = AreaStats::new();
        a.from_ways = 2;
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["from_ways"], 2);
    }
}
