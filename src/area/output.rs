use crate::area::rings::{AreaGeometry, PolygonPart, Ring, RingPart};
use crate::area::{OtherData, Timings};
use crate::callback::CallFinish;
use crate::elements::{Info, Tag};
use crate::utils::ThreadTimer;

use simple_protocolbuffers::{
    pack_data, pack_delta_int, pack_delta_int_ref, pack_value, read_delta_packed_int, un_zig_zag,
    zig_zag, IterTags, PbfTag,
};

use std::fs::File;
use std::io::{Error, ErrorKind, Result, Write};

pub const INITIAL_OUTPUT_BUFFER_SIZE: usize = 1024 * 1024;
pub const MAX_BUFFER_SIZE_FOR_FLUSH: usize = 100 * 1024;

/// Append-only arena of packed area records. Filled by the assembler,
/// handed off whole to a consumer on flush; never mutated after handoff.
pub struct AreaBuffer {
    data: Vec<u8>,
    count: usize,
}

impl AreaBuffer {
    pub fn new() -> AreaBuffer {
        AreaBuffer::with_capacity(INITIAL_OUTPUT_BUFFER_SIZE)
    }

    pub fn with_capacity(cap: usize) -> AreaBuffer {
        AreaBuffer {
            data: Vec::with_capacity(cap),
            count: 0,
        }
    }

    pub fn committed(&self) -> usize {
        self.data.len()
    }

    pub fn num_areas(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn push_area(&mut self, area: &AreaGeometry) -> Result<()> {
        let rec = pack_area_geometry(area)?;
        pack_data(&mut self.data, 1, &rec);
        self.count += 1;
        Ok(())
    }

    pub fn read_areas(&self) -> Result<Vec<AreaGeometry>> {
        let mut res = Vec::with_capacity(self.count);
        for t in IterTags::new(&self.data) {
            match t {
                PbfTag::Data(1, d) => {
                    res.push(unpack_area_geometry(d)?);
                }
                _ => {
                    return Err(Error::new(ErrorKind::Other, "unexpected tag in area buffer"));
                }
            }
        }
        Ok(res)
    }
}

impl std::fmt::Display for AreaBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AreaBuffer[{} areas, {} bytes]", self.count, self.data.len())
    }
}

fn pack_ring(r: &Ring) -> Result<Vec<u8>> {
    let refs = r.refs();
    let lls = r.lonlats()?;

    let mut res = Vec::with_capacity(10 + 15 * refs.len());
    pack_data(&mut res, 1, &pack_delta_int_ref(refs.iter()));
    pack_data(&mut res, 2, &pack_delta_int(lls.iter().map(|l| l.lon as i64)));
    pack_data(&mut res, 3, &pack_delta_int(lls.iter().map(|l| l.lat as i64)));
    pack_value(&mut res, 4, zig_zag((r.area * 100.0).round() as i64));
    Ok(res)
}

fn unpack_ring(data: &[u8]) -> Result<Ring> {
    let mut refs = Vec::new();
    let mut lons = Vec::new();
    let mut lats = Vec::new();
    let mut area = 0.0;

    for t in IterTags::new(data) {
        match t {
            PbfTag::Data(1, d) => {
                refs = read_delta_packed_int(&d);
            }
            PbfTag::Data(2, d) => {
                lons = read_delta_packed_int(&d);
            }
            PbfTag::Data(3, d) => {
                lats = read_delta_packed_int(&d);
            }
            PbfTag::Value(4, a) => {
                area = un_zig_zag(a) as f64 / 100.0;
            }
            _ => {}
        }
    }
    if lons.len() != lats.len() {
        return Err(Error::new(ErrorKind::Other, "ring lons / lats don't match"));
    }

    let lonlats = lons
        .iter()
        .zip(lats.iter())
        .map(|(o, a)| crate::area::position::LonLat::new(*o as i32, *a as i32))
        .collect();

    let mut ring = Ring::new();
    ring.parts.push(RingPart::new(0, false, refs, lonlats));
    ring.area = area;
    Ok(ring)
}

fn pack_polygon_part(p: &PolygonPart) -> Result<Vec<u8>> {
    let mut res = Vec::new();
    pack_data(&mut res, 1, &pack_ring(&p.exterior)?);
    for ii in &p.interiors {
        pack_data(&mut res, 2, &pack_ring(ii)?);
    }
    pack_value(&mut res, 3, zig_zag((p.area * 100.0).round() as i64));
    Ok(res)
}

fn unpack_polygon_part(data: &[u8]) -> Result<PolygonPart> {
    let mut exterior = None;
    let mut interiors = Vec::new();
    let mut area = 0.0;

    for t in IterTags::new(data) {
        match t {
            PbfTag::Data(1, d) => {
                exterior = Some(unpack_ring(d)?);
            }
            PbfTag::Data(2, d) => {
                interiors.push(unpack_ring(d)?);
            }
            PbfTag::Value(3, a) => {
                area = un_zig_zag(a) as f64 / 100.0;
            }
            _ => {}
        }
    }
    match exterior {
        None => Err(Error::new(ErrorKind::Other, "polygon part without exterior")),
        Some(ext) => Ok(PolygonPart {
            exterior: ext,
            interiors: interiors,
            area: area,
        }),
    }
}

fn pack_info(info: &Info) -> Vec<u8> {
    let mut res = Vec::with_capacity(30 + info.user.len());
    pack_value(&mut res, 1, info.version as u64);
    pack_value(&mut res, 2, info.timestamp as u64);
    pack_value(&mut res, 3, info.changeset as u64);
    pack_value(&mut res, 4, info.user_id as u64);
    pack_data(&mut res, 5, info.user.as_bytes());
    res
}

fn unpack_info(data: &[u8]) -> Result<Info> {
    let mut res = Info::new();
    for t in IterTags::new(data) {
        match t {
            PbfTag::Value(1, v) => res.version = v as i64,
            PbfTag::Value(2, v) => res.timestamp = v as i64,
            PbfTag::Value(3, v) => res.changeset = v as i64,
            PbfTag::Value(4, v) => res.user_id = v as i64,
            PbfTag::Data(5, d) => {
                res.user = String::from_utf8(d.to_vec())
                    .map_err(|_| Error::new(ErrorKind::Other, "bad user string"))?;
            }
            _ => {}
        }
    }
    Ok(res)
}

pub fn pack_area_geometry(a: &AreaGeometry) -> Result<Vec<u8>> {
    let mut res = Vec::with_capacity(60 + 20 * a.tags.len());

    pack_value(&mut res, 1, a.id as u64);
    for t in &a.tags {
        let mut tt = Vec::with_capacity(10 + t.key.len() + t.val.len());
        pack_data(&mut tt, 1, t.key.as_bytes());
        pack_data(&mut tt, 2, t.val.as_bytes());
        pack_data(&mut res, 2, &tt);
    }
    match &a.info {
        Some(info) => {
            pack_data(&mut res, 4, &pack_info(info));
        }
        None => {}
    }
    pack_value(&mut res, 15, zig_zag((a.area * 100.0).round() as i64));
    pack_value(&mut res, 16, if a.from_way { 1 } else { 0 });
    for p in &a.parts {
        pack_data(&mut res, 20, &pack_polygon_part(p)?);
    }
    Ok(res)
}

pub fn unpack_area_geometry(data: &[u8]) -> Result<AreaGeometry> {
    let mut res = AreaGeometry {
        id: 0,
        from_way: false,
        info: None,
        tags: Vec::new(),
        parts: Vec::new(),
        area: 0.0,
    };

    for t in IterTags::new(data) {
        match t {
            PbfTag::Value(1, i) => {
                res.id = i as i64;
            }
            PbfTag::Data(2, d) => {
                let mut key = String::new();
                let mut val = String::new();
                for x in IterTags::new(d) {
                    match x {
                        PbfTag::Data(1, k) => {
                            key = String::from_utf8(k.to_vec())
                                .map_err(|_| Error::new(ErrorKind::Other, "bad tag key"))?;
                        }
                        PbfTag::Data(2, v) => {
                            val = String::from_utf8(v.to_vec())
                                .map_err(|_| Error::new(ErrorKind::Other, "bad tag val"))?;
                        }
                        _ => {}
                    }
                }
                res.tags.push(Tag::new(key, val));
            }
            PbfTag::Data(4, d) => {
                res.info = Some(unpack_info(d)?);
            }
            PbfTag::Value(15, a) => {
                res.area = un_zig_zag(a) as f64 / 100.0;
            }
            PbfTag::Value(16, w) => {
                res.from_way = w != 0;
            }
            PbfTag::Data(20, d) => {
                res.parts.push(unpack_polygon_part(d)?);
            }
            _ => {}
        }
    }
    Ok(res)
}

/// Consumer which unpacks every flushed buffer and keeps the areas in
/// memory; returned through Timings at finish.
pub struct CollectAreas {
    areas: Vec<AreaGeometry>,
    nb: usize,
    nf: usize,
    errs: Vec<String>,
}

impl CollectAreas {
    pub fn new() -> CollectAreas {
        CollectAreas {
            areas: Vec::new(),
            nb: 0,
            nf: 0,
            errs: Vec::new(),
        }
    }
}

impl CallFinish for CollectAreas {
    type CallType = AreaBuffer;
    type ReturnType = Timings;

    fn call(&mut self, buf: AreaBuffer) {
        self.nb += buf.committed();
        self.nf += 1;
        match buf.read_areas() {
            Ok(aa) => {
                self.areas.extend(aa);
            }
            Err(e) => {
                self.errs.push(e.to_string());
            }
        }
    }

    fn finish(&mut self) -> Result<Timings> {
        let mut tms = Timings::new();
        tms.add_other(
            "CollectAreas",
            OtherData::Messages(vec![format!("{} buffers, {} bytes", self.nf, self.nb)]),
        );
        if !self.errs.is_empty() {
            tms.add_other(
                "CollectAreas",
                OtherData::Messages(std::mem::take(&mut self.errs)),
            );
        }
        tms.add_other(
            "CollectAreas",
            OtherData::Areas(std::mem::take(&mut self.areas)),
        );
        Ok(tms)
    }
}

/// Writes the raw packed records of every flushed buffer to a gzipped
/// file. Wrap in callback::Callback to keep the compression off the
/// collector thread.
pub struct WriteGzipAreas {
    out: Option<flate2::write::GzEncoder<File>>,
    nb: usize,
    tm: f64,
}

impl WriteGzipAreas {
    pub fn new(fname: &str) -> Result<WriteGzipAreas> {
        let f = File::create(fname)?;
        let out = flate2::write::GzEncoder::new(f, flate2::Compression::default());
        Ok(WriteGzipAreas {
            out: Some(out),
            nb: 0,
            tm: 0.0,
        })
    }
}

impl CallFinish for WriteGzipAreas {
    type CallType = AreaBuffer;
    type ReturnType = Timings;

    fn call(&mut self, buf: AreaBuffer) {
        let tx = ThreadTimer::new();
        self.nb += buf.committed();
        match self.out.as_mut() {
            Some(o) => {
                o.write_all(buf.as_slice()).expect("!");
            }
            None => {}
        }
        self.tm += tx.since();
    }

    fn finish(&mut self) -> Result<Timings> {
        match self.out.take() {
            Some(o) => {
                o.finish()?;
            }
            None => {}
        }
        let mut tms = Timings::new();
        tms.add("WriteGzipAreas", self.tm);
        tms.add_other(
            "WriteGzipAreas",
            OtherData::Messages(vec![format!("{} bytes written", self.nb)]),
        );
        Ok(tms)
    }
}
