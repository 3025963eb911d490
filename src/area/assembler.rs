use crate::area::output::AreaBuffer;
use crate::area::position::{polygon_contains, LonLat};
use crate::area::rings::{collect_rings, AreaGeometry, PolygonPart, Ring, RingPart};
use crate::area::stats::AreaStats;
use crate::elements::{ElementType, Relation, Way};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind, Result};

/// Turns resolved way data into polygon records. Failures are per-input:
/// the caller treats Err as "this input produced no polygon" and keeps
/// scanning. Ok with nothing written to the buffer is a valid outcome.
pub trait AreaAssembler: Sync + Send + 'static {
    fn assemble_way(
        &self,
        way: &Way,
        locs: &[Option<LonLat>],
        out: &mut AreaBuffer,
    ) -> Result<AreaStats>;

    fn assemble_relation(
        &self,
        rel: &Relation,
        members: &[(Way, Vec<Option<LonLat>>)],
        out: &mut AreaBuffer,
    ) -> Result<AreaStats>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblerConfig {
    #[serde(default)]
    pub check_roles: bool,
}

impl Default for AssemblerConfig {
    fn default() -> AssemblerConfig {
        AssemblerConfig { check_roles: false }
    }
}

impl AssemblerConfig {
    pub fn from_json(data: &str) -> Result<AssemblerConfig> {
        serde_json::from_str(data).map_err(|e| Error::new(ErrorKind::Other, e.to_string()))
    }
}

fn full_locations(way: &Way, locs: &[Option<LonLat>]) -> Result<Vec<LonLat>> {
    if way.refs.len() != locs.len() {
        return Err(Error::new(ErrorKind::Other, "invalid location"));
    }
    let mut res = Vec::with_capacity(locs.len());
    for l in locs {
        match l {
            Some(l) => res.push(l.clone()),
            None => {
                return Err(Error::new(ErrorKind::Other, "invalid location"));
            }
        }
    }
    Ok(res)
}

pub struct RingAssembler {
    config: AssemblerConfig,
}

impl RingAssembler {
    pub fn new(config: AssemblerConfig) -> RingAssembler {
        RingAssembler { config: config }
    }

    fn check_role(
        &self,
        st: &mut AreaStats,
        roles: &BTreeMap<i64, String>,
        ring: &Ring,
        expected: &str,
    ) {
        if !self.config.check_roles {
            return;
        }
        match roles.get(&ring.parts[0].orig_id) {
            None => {}
            Some(role) => {
                if !role.is_empty() && role != expected {
                    st.wrong_role += 1;
                }
            }
        }
    }
}

impl AreaAssembler for RingAssembler {
    fn assemble_way(
        &self,
        way: &Way,
        locs: &[Option<LonLat>],
        out: &mut AreaBuffer,
    ) -> Result<AreaStats> {
        let ll = full_locations(way, locs)?;

        let mut ring = Ring::new();
        ring.parts
            .push(RingPart::new(way.id, false, way.refs.clone(), ll));
        if !ring.is_ring() {
            return Err(Error::new(ErrorKind::Other, "not a closed ring"));
        }
        ring.calc_area()?;

        let mut st = AreaStats::new();
        st.from_ways += 1;
        st.outer_rings += 1;

        let a = AreaGeometry::from_way(way, vec![PolygonPart::new(ring)]);
        out.push_area(&a)?;
        Ok(st)
    }

    fn assemble_relation(
        &self,
        rel: &Relation,
        members: &[(Way, Vec<Option<LonLat>>)],
        out: &mut AreaBuffer,
    ) -> Result<AreaStats> {
        let mut st = AreaStats::new();

        let mut roles = BTreeMap::new();
        for m in &rel.members {
            if m.mem_type == ElementType::Way {
                roles.entry(m.mem_ref).or_insert_with(|| m.role.clone());
            }
        }

        let mut parts = Vec::with_capacity(members.len());
        for (w, locs) in members {
            match full_locations(w, locs) {
                Err(_) => {
                    st.invalid_locations += 1;
                }
                Ok(ll) => {
                    if ll.len() < 2 {
                        st.invalid_locations += 1;
                    } else {
                        parts.push(RingPart::new(w.id, false, w.refs.clone(), ll));
                    }
                }
            }
        }

        let (mut rings, leftover) = collect_rings(parts);
        st.open_rings += leftover.len() as i64;

        for r in rings.iter_mut() {
            r.calc_area()?;
        }
        // largest rings first, so an outer is placed before the rings it encloses
        rings.sort_by(|a, b| {
            b.area
                .abs()
                .partial_cmp(&a.area.abs())
                .unwrap_or(Ordering::Equal)
        });

        let mut polys: Vec<PolygonPart> = Vec::new();
        let mut exteriors: Vec<Vec<LonLat>> = Vec::new();
        for r in rings {
            let ll = r.lonlats()?;
            let mut enclosing = None;
            for i in 0..polys.len() {
                if polygon_contains(&exteriors[i], &ll) {
                    enclosing = Some(i);
                    break;
                }
            }
            match enclosing {
                Some(i) => {
                    self.check_role(&mut st, &roles, &r, "inner");
                    st.inner_rings += 1;
                    polys[i].add_interior(r);
                }
                None => {
                    self.check_role(&mut st, &roles, &r, "outer");
                    st.outer_rings += 1;
                    polys.push(PolygonPart::new(r));
                    exteriors.push(ll);
                }
            }
        }

        if polys.is_empty() {
            return Ok(st);
        }

        st.from_relations += 1;
        let a = AreaGeometry::from_relation(rel, polys);
        out.push_area(&a)?;
        Ok(st)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Member, Tag};

    fn way_with_locs(id: i64, refs: Vec<i64>, coords: Vec<(f64, f64)>) -> (Way, Vec<Option<LonLat>>) {
        let mut w = Way::new(id);
        w.refs = refs;
        let locs = coords
            .iter()
            .map(|(x, y)| Some(LonLat::from_degrees(*x, *y)))
            .collect();
        (w, locs)
    }

    fn mp_relation(id: i64, members: Vec<(i64, &str)>) -> Relation {
        let mut r = Relation::new(id);
        r.tags.push(Tag::new(
            String::from("type"),
            String::from("multipolygon"),
        ));
        for (w, role) in members {
            r.members
                .push(Member::new(String::from(role), ElementType::Way, w));
        }
        r
    }

    #[test]
    fn test_config_from_json() {
        let c = AssemblerConfig::from_json("{\"check_roles\": true}").unwrap();
        assert!(c.check_roles);
        let c = AssemblerConfig::from_json("{}").unwrap();
        assert!(!c.check_roles);
        assert!(AssemblerConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_assemble_way() {
        let asm = RingAssembler::new(AssemblerConfig::default());
        let mut out = AreaBuffer::new();
        let (w, locs) = way_with_locs(
            9,
            vec![1, 2, 3, 4, 1],
            vec![
                (0.0, 0.0),
                (0.01, 0.0),
                (0.01, 0.01),
                (0.0, 0.01),
                (0.0, 0.0),
            ],
        );
        let st = asm.assemble_way(&w, &locs, &mut out).unwrap();
        assert_eq!(st.from_ways, 1);
        assert_eq!(st.outer_rings, 1);
        assert_eq!(out.num_areas(), 1);

        let aa = out.read_areas().unwrap();
        assert!(aa[0].from_way);
        assert!(aa[0].area > 0.0);
    }

    #[test]
    fn test_assemble_way_unresolved_location() {
        let asm = RingAssembler::new(AssemblerConfig::default());
        let mut out = AreaBuffer::new();
        let (w, mut locs) = way_with_locs(
            9,
            vec![1, 2, 3, 1],
            vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.0)],
        );
        locs[1] = None;
        assert!(asm.assemble_way(&w, &locs, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_assemble_relation_outer_inner() {
        let asm = RingAssembler::new(AssemblerConfig::default());
        let mut out = AreaBuffer::new();

        let outer = way_with_locs(
            1,
            vec![1, 2, 3, 4, 1],
            vec![
                (0.0, 0.0),
                (0.03, 0.0),
                (0.03, 0.03),
                (0.0, 0.03),
                (0.0, 0.0),
            ],
        );
        let inner = way_with_locs(
            2,
            vec![5, 6, 7, 5],
            vec![(0.01, 0.01), (0.02, 0.01), (0.015, 0.02), (0.01, 0.01)],
        );
        let rel = mp_relation(100, vec![(1, "outer"), (2, "inner")]);

        let st = asm
            .assemble_relation(&rel, &[outer, inner], &mut out)
            .unwrap();
        assert_eq!(st.from_relations, 1);
        assert_eq!(st.outer_rings, 1);
        assert_eq!(st.inner_rings, 1);
        assert_eq!(st.open_rings, 0);
        assert_eq!(out.num_areas(), 1);

        let aa = out.read_areas().unwrap();
        assert_eq!(aa[0].parts.len(), 1);
        assert_eq!(aa[0].parts[0].interiors.len(), 1);
        assert!(aa[0].parts[0].area < aa[0].parts[0].exterior.area);
    }

    #[test]
    fn test_assemble_relation_split_outer() {
        // the outer ring arrives as two way segments
        let asm = RingAssembler::new(AssemblerConfig::default());
        let mut out = AreaBuffer::new();

        let half1 = way_with_locs(
            1,
            vec![1, 2, 3],
            vec![(0.0, 0.0), (0.03, 0.0), (0.03, 0.03)],
        );
        let half2 = way_with_locs(
            2,
            vec![3, 4, 1],
            vec![(0.03, 0.03), (0.0, 0.03), (0.0, 0.0)],
        );
        let rel = mp_relation(101, vec![(1, "outer"), (2, "outer")]);

        let st = asm
            .assemble_relation(&rel, &[half1, half2], &mut out)
            .unwrap();
        assert_eq!(st.from_relations, 1);
        assert_eq!(st.outer_rings, 1);
        assert_eq!(out.num_areas(), 1);
    }

    #[test]
    fn test_assemble_relation_open_ring() {
        let asm = RingAssembler::new(AssemblerConfig::default());
        let mut out = AreaBuffer::new();

        let open = way_with_locs(1, vec![1, 2, 3], vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01)]);
        let rel = mp_relation(102, vec![(1, "outer")]);

        let st = asm.assemble_relation(&rel, &[open], &mut out).unwrap();
        assert_eq!(st.from_relations, 0);
        assert_eq!(st.open_rings, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_assemble_relation_skips_unresolved_member() {
        let asm = RingAssembler::new(AssemblerConfig::default());
        let mut out = AreaBuffer::new();

        let outer = way_with_locs(
            1,
            vec![1, 2, 3, 1],
            vec![(0.0, 0.0), (0.03, 0.0), (0.03, 0.03), (0.0, 0.0)],
        );
        let (bad_way, mut bad_locs) = way_with_locs(
            2,
            vec![5, 6, 7, 5],
            vec![(0.01, 0.01), (0.02, 0.01), (0.015, 0.02), (0.01, 0.01)],
        );
        bad_locs[0] = None;
        let rel = mp_relation(103, vec![(1, "outer"), (2, "inner")]);

        let st = asm
            .assemble_relation(&rel, &[outer, (bad_way, bad_locs)], &mut out)
            .unwrap();
        assert_eq!(st.invalid_locations, 1);
        assert_eq!(st.from_relations, 1);
        assert_eq!(st.inner_rings, 0);
        assert_eq!(out.num_areas(), 1);
    }

    #[test]
    fn test_check_roles() {
        let asm = RingAssembler::new(AssemblerConfig { check_roles: true });
        let mut out = AreaBuffer::new();

        let outer = way_with_locs(
            1,
            vec![1, 2, 3, 4, 1],
            vec![
                (0.0, 0.0),
                (0.03, 0.0),
                (0.03, 0.03),
                (0.0, 0.03),
                (0.0, 0.0),
            ],
        );
        let inner = way_with_locs(
            2,
            vec![5, 6, 7, 5],
            vec![(0.01, 0.01), (0.02, 0.01), (0.015, 0.02), (0.01, 0.01)],
        );
        // inner ring tagged as outer
        let rel = mp_relation(104, vec![(1, "outer"), (2, "outer")]);

        let st = asm
            .assemble_relation(&rel, &[outer, inner], &mut out)
            .unwrap();
        assert_eq!(st.wrong_role, 1);
        assert_eq!(st.from_relations, 1);
    }
}
