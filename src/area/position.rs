use std::borrow::Borrow;
use std::f64::consts::PI;

pub const EARTH_WIDTH: f64 = 20037508.342789244;

pub fn coordinate_as_integer(v: f64) -> i32 {
    if v > 0.0 {
        return ((v * 10000000.0) + 0.5) as i32;
    }
    ((v * 10000000.0) - 0.5) as i32
}

pub fn coordinate_as_float(v: i32) -> f64 {
    (v as f64) * 0.0000001
}

fn latitude_mercator(y: f64, scale: f64) -> f64 {
    (PI * (1.0 + y / 90.0) / 4.0).tan().ln() * scale / PI
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct LonLat {
    pub lon: i32,
    pub lat: i32,
}
impl LonLat {
    pub fn new(lon: i32, lat: i32) -> LonLat {
        LonLat { lon, lat }
    }

    pub fn from_degrees(lon: f64, lat: f64) -> LonLat {
        LonLat::new(coordinate_as_integer(lon), coordinate_as_integer(lat))
    }

    pub fn forward(&self) -> XY {
        let x = coordinate_as_float(self.lon) * EARTH_WIDTH / 180.0;
        let y = latitude_mercator(coordinate_as_float(self.lat), EARTH_WIDTH);
        XY::new(f64::round(x * 100.0) / 100.0, f64::round(y * 100.0) / 100.0)
    }
}

use serde::ser::{Serialize, SerializeSeq, Serializer};
impl Serialize for LonLat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.lon)?;
        seq.serialize_element(&self.lat)?;
        seq.end()
    }
}

#[derive(Clone, PartialEq, PartialOrd, Debug)]
pub struct XY {
    pub x: f64,
    pub y: f64,
}
impl XY {
    pub fn new(x: f64, y: f64) -> XY {
        XY { x, y }
    }
}

pub fn calc_ring_area<T: Borrow<LonLat>>(lonlats: &[T]) -> f64 {
    if lonlats.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;

    let mut prev = lonlats[0].borrow().forward();

    for i in 1..lonlats.len() {
        let curr = lonlats[i].borrow().forward();
        area += prev.x * curr.y - prev.y * curr.x;
        prev = curr
    }

    return -1.0 * area / 2.0; //want polygon exteriors to be anti-clockwise
}

fn segment_side(p1: &LonLat, p2: &LonLat, q: &LonLat) -> i32 {
    let s = (q.lon as f64 - p1.lon as f64) * (p2.lat as f64 - p1.lat as f64)
        - (p2.lon as f64 - p1.lon as f64) * (q.lat as f64 - p1.lat as f64);

    if s < 0.0 {
        -1
    } else if s > 0.0 {
        1
    } else {
        0
    }
}

pub fn segment_intersects(p1: &LonLat, p2: &LonLat, q1: &LonLat, q2: &LonLat) -> bool {
    let pq1 = segment_side(p1, p2, q1);
    let pq2 = segment_side(p1, p2, q2);
    if pq1 == pq2 {
        return false;
    }

    let qp1 = segment_side(q1, q2, p1);
    let qp2 = segment_side(q1, q2, p2);
    if qp1 == qp2 {
        return false;
    }
    true
}

pub fn line_intersects<T0: Borrow<LonLat>, T1: Borrow<LonLat>>(left: &[T0], right: &[T1]) -> bool {
    if left.len() < 2 || right.len() < 2 {
        return false;
    }

    for i in 0..(left.len() - 1) {
        for j in 0..(right.len() - 1) {
            if segment_intersects(
                &left[i].borrow(),
                &left[i + 1].borrow(),
                &right[j].borrow(),
                &right[j + 1].borrow(),
            ) {
                return true;
            }
        }
    }
    false
}

pub fn point_in_poly<T: Borrow<LonLat>>(line: &[T], pt: &LonLat) -> bool {
    let testx = coordinate_as_float(pt.lon);
    let testy = coordinate_as_float(pt.lat);

    let mut c = false;
    for i in 0..line.len() {
        let j = if i == 0 { line.len() - 1 } else { i - 1 };
        let vxi = coordinate_as_float(line[i].borrow().lon);
        let vyi = coordinate_as_float(line[i].borrow().lat);
        let vxj = coordinate_as_float(line[j].borrow().lon);
        let vyj = coordinate_as_float(line[j].borrow().lat);

        if (vyi > testy) != (vyj > testy) {
            if testx < (vxj - vxi) * (testy - vyi) / (vyj - vyi) + vxi {
                c = !c;
            }
        }
    }
    c
}

pub fn polygon_contains<T0: Borrow<LonLat>, T1: Borrow<LonLat>>(
    bigger: &[T0],
    smaller: &[T1],
) -> bool {
    if smaller.is_empty() {
        return false;
    }
    if line_intersects(bigger, smaller) {
        return false;
    }

    point_in_poly(bigger, smaller[0].borrow())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f64, cy: f64, half: f64) -> Vec<LonLat> {
        vec![
            LonLat::from_degrees(cx - half, cy - half),
            LonLat::from_degrees(cx + half, cy - half),
            LonLat::from_degrees(cx + half, cy + half),
            LonLat::from_degrees(cx - half, cy + half),
            LonLat::from_degrees(cx - half, cy - half),
        ]
    }

    #[test]
    fn test_ring_area_sign() {
        // anti-clockwise winding comes out negative, reversal flips the sign
        let ccw = square(0.0, 0.0, 0.01);
        let area = calc_ring_area(&ccw);
        assert!(area < 0.0);

        let mut cw = ccw.clone();
        cw.reverse();
        let area_cw = calc_ring_area(&cw);
        assert!(area_cw > 0.0);
        assert!((area + area_cw).abs() < 1e-6);
    }

    #[test]
    fn test_point_in_poly() {
        let sq = square(0.0, 0.0, 0.01);
        assert!(point_in_poly(&sq, &LonLat::from_degrees(0.0, 0.0)));
        assert!(!point_in_poly(&sq, &LonLat::from_degrees(0.05, 0.0)));
    }

    #[test]
    fn test_polygon_contains() {
        let outer = square(0.0, 0.0, 0.02);
        let inner = square(0.0, 0.0, 0.005);
        let apart = square(1.0, 1.0, 0.005);
        assert!(polygon_contains(&outer, &inner));
        assert!(!polygon_contains(&inner, &outer));
        assert!(!polygon_contains(&outer, &apart));
    }
}
