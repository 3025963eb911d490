use crate::area::position::LonLat;
use crate::elements::{ElementType, Info, Tag, Way};

use simple_protocolbuffers::{
    pack_data, pack_delta_int, pack_delta_int_ref, pack_int, pack_value, read_delta_packed_int,
    read_packed_int, IterTags, PbfTag,
};

use std::collections::BTreeMap;
use std::io::{Error, ErrorKind, Result};

struct StringTable {
    idx: BTreeMap<String, u64>,
    strings: Vec<String>,
}

impl StringTable {
    fn new() -> StringTable {
        StringTable {
            idx: BTreeMap::new(),
            strings: Vec::new(),
        }
    }

    fn call(&mut self, s: &str) -> u64 {
        match self.idx.get(s) {
            Some(i) => *i,
            None => {
                let i = self.strings.len() as u64;
                self.idx.insert(String::from(s), i);
                self.strings.push(String::from(s));
                i
            }
        }
    }

    fn get(&self, i: u64) -> Result<&str> {
        if i as usize >= self.strings.len() {
            return Err(Error::new(
                ErrorKind::Other,
                format!("string idx {} out of range", i),
            ));
        }
        Ok(&self.strings[i as usize])
    }
}

/// Append-only arena holding a packed copy of every way retained for a
/// pending relation, addressed by byte offset. Offsets stay valid for the
/// lifetime of the buffer; a way is written at most once however many
/// relations need it.
pub struct MemberBuffer {
    data: Vec<u8>,
    strings: StringTable,
    offsets: BTreeMap<(ElementType, i64), u64>,
}

impl MemberBuffer {
    pub fn new() -> MemberBuffer {
        MemberBuffer {
            data: Vec::new(),
            strings: StringTable::new(),
            offsets: BTreeMap::new(),
        }
    }

    pub fn committed(&self) -> usize {
        self.data.len()
    }

    pub fn num_members(&self) -> usize {
        self.offsets.len()
    }

    pub fn contains(&self, mem_type: ElementType, id: i64) -> bool {
        self.offsets.contains_key(&(mem_type, id))
    }

    pub fn get_offset(&self, mem_type: ElementType, id: i64) -> Option<u64> {
        self.offsets.get(&(mem_type, id)).map(|o| *o)
    }

    pub fn add_way(&mut self, way: &Way, locs: &[Option<LonLat>]) -> u64 {
        match self.offsets.get(&(ElementType::Way, way.id)) {
            Some(o) => *o,
            None => {
                let rec = self.pack_way(way, locs);
                let offset = self.data.len() as u64;
                pack_data(&mut self.data, 1, &rec);
                self.offsets.insert((ElementType::Way, way.id), offset);
                offset
            }
        }
    }

    pub fn read_way(&self, offset: u64) -> Result<(Way, Vec<Option<LonLat>>)> {
        if offset as usize >= self.data.len() {
            return Err(Error::new(
                ErrorKind::Other,
                format!("offset {} out of range", offset),
            ));
        }
        match IterTags::new(&self.data[offset as usize..]).next() {
            Some(PbfTag::Data(1, rec)) => self.unpack_way(rec),
            _ => Err(Error::new(
                ErrorKind::Other,
                format!("no way record at offset {}", offset),
            )),
        }
    }

    pub fn way_by_id(&self, id: i64) -> Option<(Way, Vec<Option<LonLat>>)> {
        match self.get_offset(ElementType::Way, id) {
            None => None,
            Some(o) => self.read_way(o).ok(),
        }
    }

    fn pack_way(&mut self, way: &Way, locs: &[Option<LonLat>]) -> Vec<u8> {
        let mut res = Vec::with_capacity(30 + 5 * way.tags.len() + 10 * way.refs.len());

        pack_value(&mut res, 1, way.id as u64);

        if !way.tags.is_empty() {
            let strings = &mut self.strings;
            let kk = pack_int(way.tags.iter().map(|t| strings.call(&t.key)));
            let vv = pack_int(way.tags.iter().map(|t| strings.call(&t.val)));
            pack_data(&mut res, 2, &kk);
            pack_data(&mut res, 3, &vv);
        }

        match &way.info {
            Some(info) => {
                let mut ii = Vec::with_capacity(30);
                pack_value(&mut ii, 1, info.version as u64);
                pack_value(&mut ii, 2, info.timestamp as u64);
                pack_value(&mut ii, 3, info.changeset as u64);
                pack_value(&mut ii, 4, info.user_id as u64);
                pack_value(&mut ii, 5, self.strings.call(&info.user));
                pack_data(&mut res, 4, &ii);
            }
            None => {}
        }

        if !way.refs.is_empty() {
            pack_data(&mut res, 8, &pack_delta_int_ref(way.refs.iter()));
        }

        if !locs.is_empty() {
            pack_data(
                &mut res,
                9,
                &pack_int(locs.iter().map(|l| if l.is_some() { 1 } else { 0 })),
            );
            pack_data(
                &mut res,
                10,
                &pack_delta_int(locs.iter().filter_map(|l| l.as_ref()).map(|l| l.lon as i64)),
            );
            pack_data(
                &mut res,
                11,
                &pack_delta_int(locs.iter().filter_map(|l| l.as_ref()).map(|l| l.lat as i64)),
            );
        }

        res
    }

    fn unpack_way(&self, data: &[u8]) -> Result<(Way, Vec<Option<LonLat>>)> {
        let mut way = Way::new(0);
        let mut kk = Vec::new();
        let mut vv = Vec::new();
        let mut present = Vec::new();
        let mut lons = Vec::new();
        let mut lats = Vec::new();

        for t in IterTags::new(data) {
            match t {
                PbfTag::Value(1, i) => {
                    way.id = i as i64;
                }
                PbfTag::Data(2, d) => {
                    kk = read_packed_int(&d);
                }
                PbfTag::Data(3, d) => {
                    vv = read_packed_int(&d);
                }
                PbfTag::Data(4, d) => {
                    way.info = Some(self.unpack_info(d)?);
                }
                PbfTag::Data(8, d) => {
                    way.refs = read_delta_packed_int(&d);
                }
                PbfTag::Data(9, d) => {
                    present = read_packed_int(&d);
                }
                PbfTag::Data(10, d) => {
                    lons = read_delta_packed_int(&d);
                }
                PbfTag::Data(11, d) => {
                    lats = read_delta_packed_int(&d);
                }
                _ => {}
            }
        }

        if kk.len() != vv.len() {
            return Err(Error::new(
                ErrorKind::Other,
                format!("tags don't match: {} // {}", kk.len(), vv.len()),
            ));
        }
        for i in 0..kk.len() {
            way.tags.push(Tag::new(
                String::from(self.strings.get(kk[i])?),
                String::from(self.strings.get(vv[i])?),
            ));
        }

        if lons.len() != lats.len() {
            return Err(Error::new(
                ErrorKind::Other,
                format!("locations don't match: {} // {}", lons.len(), lats.len()),
            ));
        }
        let mut locs = Vec::with_capacity(present.len());
        let mut pos = 0;
        for p in &present {
            if *p != 0 {
                if pos >= lons.len() {
                    return Err(Error::new(ErrorKind::Other, "too few locations"));
                }
                locs.push(Some(LonLat::new(lons[pos] as i32, lats[pos] as i32)));
                pos += 1;
            } else {
                locs.push(None);
            }
        }

        Ok((way, locs))
    }

    fn unpack_info(&self, data: &[u8]) -> Result<Info> {
        let mut res = Info::new();
        for t in IterTags::new(data) {
            match t {
                PbfTag::Value(1, v) => res.version = v as i64,
                PbfTag::Value(2, v) => res.timestamp = v as i64,
                PbfTag::Value(3, v) => res.changeset = v as i64,
                PbfTag::Value(4, v) => res.user_id = v as i64,
                PbfTag::Value(5, v) => res.user = String::from(self.strings.get(v)?),
                _ => {}
            }
        }
        Ok(res)
    }
}

impl std::fmt::Display for MemberBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MemberBuffer[{} ways, {} bytes]",
            self.offsets.len(),
            self.data.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_way(id: i64) -> (Way, Vec<Option<LonLat>>) {
        let mut w = Way::new(id);
        w.tags
            .push(Tag::new(String::from("natural"), String::from("water")));
        w.refs = vec![101, 102, 103, 101];
        let mut info = Info::new();
        info.version = 3;
        info.timestamp = 1577836800;
        info.user = String::from("mapper");
        w.info = Some(info);
        let locs = vec![
            Some(LonLat::new(5000, 5000)),
            None,
            Some(LonLat::new(5200, 5100)),
            Some(LonLat::new(5000, 5000)),
        ];
        (w, locs)
    }

    #[test]
    fn test_add_and_read_way() {
        let mut mb = MemberBuffer::new();
        let (w, locs) = demo_way(42);
        let o = mb.add_way(&w, &locs);
        assert_eq!(o, 0);
        assert!(mb.contains(ElementType::Way, 42));
        assert!(!mb.contains(ElementType::Way, 43));

        let (w2, locs2) = mb.read_way(o).unwrap();
        assert_eq!(w2, w);
        assert_eq!(locs2, locs);
    }

    #[test]
    fn test_add_way_at_most_once() {
        let mut mb = MemberBuffer::new();
        let (w, locs) = demo_way(42);
        let o1 = mb.add_way(&w, &locs);
        let sz = mb.committed();
        let o2 = mb.add_way(&w, &locs);
        assert_eq!(o1, o2);
        assert_eq!(mb.committed(), sz);
        assert_eq!(mb.num_members(), 1);
    }

    #[test]
    fn test_offsets_stable() {
        let mut mb = MemberBuffer::new();
        let (w1, locs1) = demo_way(1);
        let o1 = mb.add_way(&w1, &locs1);
        let (mut w2, locs2) = demo_way(2);
        w2.tags
            .push(Tag::new(String::from("landuse"), String::from("forest")));
        let o2 = mb.add_way(&w2, &locs2);
        assert!(o2 > o1);

        assert_eq!(mb.get_offset(ElementType::Way, 1), Some(o1));
        let (r1, _) = mb.read_way(o1).unwrap();
        assert_eq!(r1.id, 1);
        let (r2, _) = mb.way_by_id(2).unwrap();
        assert_eq!(r2.tags.len(), 2);
    }
}
