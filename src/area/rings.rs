use crate::area::position::{calc_ring_area, coordinate_as_float, LonLat};
use crate::elements::{Info, Relation, Tag, Way};

use serde_json::{json, Map, Value};
use std::fmt;
use std::io::{Error, ErrorKind, Result};

#[derive(Clone, serde::Serialize)]
pub struct RingPart {
    pub orig_id: i64,
    pub is_reversed: bool,
    pub refs: Vec<i64>,
    pub lonlats: Vec<LonLat>,
}

impl fmt::Debug for RingPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingPart")
            .field("orig_id", &self.orig_id)
            .field("is_reversed", &self.is_reversed)
            .field("np", &self.refs.len())
            .finish()
    }
}

impl RingPart {
    pub fn new(orig_id: i64, is_reversed: bool, refs: Vec<i64>, lonlats: Vec<LonLat>) -> RingPart {
        RingPart {
            orig_id,
            is_reversed,
            refs,
            lonlats,
        }
    }

    fn first_last(&self) -> (LonLat, LonLat) {
        let f = self.lonlats[0].clone();
        let t = self.lonlats[self.lonlats.len() - 1].clone();
        if self.is_reversed {
            (t, f)
        } else {
            (f, t)
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Ring {
    pub parts: Vec<RingPart>,
    pub area: f64,
}

impl Ring {
    pub fn new() -> Ring {
        Ring {
            parts: Vec::new(),
            area: 0.0,
        }
    }

    pub fn reverse(&mut self) {
        self.parts.reverse();
        for p in self.parts.iter_mut() {
            p.is_reversed = !p.is_reversed;
        }
        self.area *= -1.0;
    }

    /// First and last coordinate of the merged part sequence. Ring closure
    /// is decided on coordinates, not node ids: two ways may meet at the
    /// same location under different node ids.
    pub fn first_last(&self) -> (LonLat, LonLat) {
        let (f, _) = self.parts[0].first_last();
        let (_, t) = self.parts[self.parts.len() - 1].first_last();
        (f, t)
    }

    pub fn is_ring(&self) -> bool {
        if self.parts.is_empty() {
            return false;
        }
        let (f, t) = self.first_last();
        f == t
    }

    pub fn refs(&self) -> Vec<i64> {
        let mut res: Vec<i64> = Vec::new();
        for p in &self.parts {
            if p.is_reversed {
                append_merged(&mut res, p.refs.iter().rev().copied());
            } else {
                append_merged(&mut res, p.refs.iter().copied());
            }
        }
        res
    }

    pub fn lonlats(&self) -> Result<Vec<LonLat>> {
        let mut res: Vec<LonLat> = Vec::new();
        for p in &self.parts {
            let mut ll = p.lonlats.clone();
            if p.is_reversed {
                ll.reverse();
            }
            let mut ii = ll.into_iter();
            if !res.is_empty() {
                let f = ii.next().unwrap();
                if res[res.len() - 1] != f {
                    return Err(Error::new(ErrorKind::Other, "not a ring"));
                }
            }
            res.extend(ii);
        }
        if res.is_empty() || res[0] != res[res.len() - 1] {
            return Err(Error::new(ErrorKind::Other, "not a ring"));
        }
        Ok(res)
    }

    pub fn calc_area(&mut self) -> Result<f64> {
        let ll = self.lonlats()?;
        self.area = calc_ring_area(&ll);
        Ok(self.area)
    }
}

fn append_merged(res: &mut Vec<i64>, vals: impl Iterator<Item = i64>) {
    let mut ii = vals.peekable();
    if !res.is_empty() {
        match ii.peek() {
            Some(f) => {
                if res[res.len() - 1] == *f {
                    ii.next();
                }
            }
            None => {}
        }
    }
    res.extend(ii);
}

fn merge_rings(rings: &mut Vec<Ring>) -> (bool, Option<Ring>) {
    if rings.len() == 0 {
        return (false, None);
    }
    if rings.len() == 1 {
        if rings[0].is_ring() {
            let zz = rings.remove(0);
            return (true, Some(zz));
        }
        return (false, None);
    }

    for i in 0..rings.len() {
        let (f, t) = rings[i].first_last();
        if f == t {
            let zz = rings.remove(i);
            return (true, Some(zz));
        }
        for j in i + 1..rings.len() {
            let (g, u) = rings[j].first_last();

            if t == g {
                let zz = rings.remove(j);
                rings[i].parts.extend(zz.parts);
                if rings[i].is_ring() {
                    let zz = rings.remove(i);
                    return (true, Some(zz));
                }
                return (true, None);
            } else if t == u {
                let mut zz = rings.remove(j);
                zz.reverse();
                rings[i].parts.extend(zz.parts);
                if rings[i].is_ring() {
                    let zz = rings.remove(i);
                    return (true, Some(zz));
                }
                return (true, None);
            } else if f == u {
                let mut zz = rings.remove(j);
                zz.reverse();
                rings[i].reverse();
                rings[i].parts.extend(zz.parts);
                return (true, None);
            } else if f == g {
                let zz = rings.remove(j);
                rings[i].reverse();
                rings[i].parts.extend(zz.parts);
                return (true, None);
            }
        }
    }
    return (false, None);
}

/// Joins way segments end to end into closed rings. Returns the closed
/// rings plus whatever segments could not be merged into one.
pub fn collect_rings(ww: Vec<RingPart>) -> (Vec<Ring>, Vec<RingPart>) {
    let mut parts = Vec::new();
    for w in ww {
        let mut r = Ring::new();
        r.parts.push(w);
        parts.push(r);
    }

    let mut res = Vec::new();
    loop {
        let (f, r) = merge_rings(&mut parts);
        match r {
            None => {}
            Some(r) => {
                res.push(r);
            }
        }
        if !f {
            break;
        }
    }

    let mut rem = Vec::new();
    for p in parts {
        for q in p.parts {
            rem.push(q);
        }
    }

    (res, rem)
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PolygonPart {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,

    pub area: f64,
}

impl PolygonPart {
    pub fn new(mut ext: Ring) -> PolygonPart {
        if ext.area < 0.0 {
            ext.reverse();
        }
        let a = ext.area;
        PolygonPart {
            exterior: ext,
            interiors: Vec::new(),
            area: a,
        }
    }

    pub fn add_interior(&mut self, mut p: Ring) {
        if p.area > 0.0 {
            p.reverse();
        }
        self.area += p.area;
        self.interiors.push(p);
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AreaGeometry {
    pub id: i64,
    pub from_way: bool,
    pub info: Option<Info>,
    pub tags: Vec<Tag>,
    pub parts: Vec<PolygonPart>,
    pub area: f64,
}

impl AreaGeometry {
    pub fn from_way(way: &Way, parts: Vec<PolygonPart>) -> AreaGeometry {
        let area = parts.iter().map(|p| p.area).sum();
        AreaGeometry {
            id: way.id,
            from_way: true,
            info: way.info.clone(),
            tags: way.tags.clone(),
            parts: parts,
            area: area,
        }
    }

    pub fn from_relation(rel: &Relation, parts: Vec<PolygonPart>) -> AreaGeometry {
        let area = parts.iter().map(|p| p.area).sum();
        AreaGeometry {
            id: rel.id,
            from_way: false,
            info: rel.info.clone(),
            tags: rel.tags.clone(),
            parts: parts,
            area: area,
        }
    }

    /// Even ids for areas built from a single way, odd for areas built
    /// from a relation, so both can share one id space.
    pub fn area_id(&self) -> i64 {
        if self.from_way {
            2 * self.id
        } else {
            2 * self.id + 1
        }
    }

    pub fn to_geojson(&self) -> Result<Value> {
        let mut polys = Vec::new();
        for p in &self.parts {
            let mut rings = Vec::new();
            rings.push(ring_coordinates(&p.exterior)?);
            for ii in &p.interiors {
                rings.push(ring_coordinates(ii)?);
            }
            polys.push(json!(rings));
        }
        let mut props = Map::new();
        for t in &self.tags {
            props.insert(t.key.clone(), json!(t.val));
        }
        Ok(json!({
            "type": "Feature",
            "id": self.area_id(),
            "properties": props,
            "geometry": {"type": "MultiPolygon", "coordinates": polys}
        }))
    }
}

impl fmt::Display for AreaGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AreaGeometry[{} {} with {} parts, area {:0.1}]",
            if self.from_way { "way" } else { "relation" },
            self.id,
            self.parts.len(),
            self.area
        )
    }
}

fn ring_coordinates(r: &Ring) -> Result<Vec<Vec<f64>>> {
    let mut res = Vec::new();
    for l in r.lonlats()? {
        res.push(vec![coordinate_as_float(l.lon), coordinate_as_float(l.lat)]);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::position::LonLat;

    fn part(orig_id: i64, refs: Vec<i64>, coords: Vec<(f64, f64)>) -> RingPart {
        let lonlats = coords
            .iter()
            .map(|(x, y)| LonLat::from_degrees(*x, *y))
            .collect();
        RingPart::new(orig_id, false, refs, lonlats)
    }

    #[test]
    fn test_collect_rings_two_parts() {
        let a = part(1, vec![1, 2, 3], vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01)]);
        let b = part(2, vec![3, 4, 1], vec![(0.01, 0.01), (0.0, 0.01), (0.0, 0.0)]);

        let (rings, rem) = collect_rings(vec![a, b]);
        assert_eq!(rings.len(), 1);
        assert!(rem.is_empty());
        assert!(rings[0].is_ring());
        assert_eq!(rings[0].refs(), vec![1, 2, 3, 4, 1]);
        assert_eq!(rings[0].lonlats().unwrap().len(), 5);
    }

    #[test]
    fn test_collect_rings_reversed_part() {
        let a = part(1, vec![1, 2, 3], vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01)]);
        // same second segment but wound the other way round
        let b = part(2, vec![1, 4, 3], vec![(0.0, 0.0), (0.0, 0.01), (0.01, 0.01)]);

        let (rings, rem) = collect_rings(vec![a, b]);
        assert_eq!(rings.len(), 1);
        assert!(rem.is_empty());
        assert!(rings[0].is_ring());
    }

    #[test]
    fn test_collect_rings_leftover() {
        let a = part(
            1,
            vec![1, 2, 3, 1],
            vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.0)],
        );
        let b = part(2, vec![7, 8], vec![(0.5, 0.5), (0.6, 0.5)]);

        let (rings, rem) = collect_rings(vec![a, b]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rem.len(), 1);
        assert_eq!(rem[0].orig_id, 2);
    }

    #[test]
    fn test_collect_rings_closed_ring_after_open_segment() {
        let open = part(1, vec![7, 8], vec![(0.5, 0.5), (0.6, 0.5)]);
        let closed = part(
            2,
            vec![1, 2, 3, 1],
            vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.0)],
        );

        let (rings, rem) = collect_rings(vec![open, closed]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].parts[0].orig_id, 2);
        assert_eq!(rem.len(), 1);
        assert_eq!(rem[0].orig_id, 1);
    }

    #[test]
    fn test_polygon_part_orientation() {
        let mut ext = Ring::new();
        ext.parts.push(part(
            1,
            vec![1, 2, 3, 4, 1],
            vec![
                (0.0, 0.0),
                (0.01, 0.0),
                (0.01, 0.01),
                (0.0, 0.01),
                (0.0, 0.0),
            ],
        ));
        ext.calc_area().unwrap();
        assert!(ext.area < 0.0);

        let p = PolygonPart::new(ext);
        assert!(p.area > 0.0);
        assert!(p.exterior.area > 0.0);

        let mut inner = Ring::new();
        inner.parts.push(part(
            2,
            vec![5, 6, 7, 5],
            vec![(0.002, 0.002), (0.004, 0.002), (0.003, 0.004), (0.002, 0.002)],
        ));
        inner.calc_area().unwrap();
        let inner_area = inner.area.abs();

        let mut p = p;
        let before = p.area;
        p.add_interior(inner);
        assert!(p.interiors[0].area < 0.0);
        assert!((before - inner_area - p.area).abs() < 1e-6);
    }

    #[test]
    fn test_area_geometry_geojson() {
        let mut ext = Ring::new();
        ext.parts.push(part(
            1,
            vec![1, 2, 3, 1],
            vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.0)],
        ));
        ext.calc_area().unwrap();

        let mut w = Way::new(17);
        w.tags.push(Tag::new(
            String::from("natural"),
            String::from("water"),
        ));
        let a = AreaGeometry::from_way(&w, vec![PolygonPart::new(ext)]);
        assert_eq!(a.area_id(), 34);

        let gj = a.to_geojson().unwrap();
        assert_eq!(gj["geometry"]["type"], "MultiPolygon");
        assert_eq!(gj["properties"]["natural"], "water");
        assert_eq!(gj["geometry"]["coordinates"][0][0].as_array().unwrap().len(), 4);
    }
}
