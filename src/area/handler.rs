use crate::area::assembler::{AreaAssembler, AssemblerConfig, RingAssembler};
use crate::area::collector::{CollectorHandler, RelationCollector};
use crate::area::locations::Locations;
use crate::area::output::{AreaBuffer, MAX_BUFFER_SIZE_FOR_FLUSH};
use crate::area::position::LonLat;
use crate::area::stats::AreaStats;
use crate::area::{CallFinishAreaBuffer, Timings};
use crate::elements::{find_tag_value, Element, ElementType, Member, Relation, Way};
use crate::message;
use crate::utils::{Checktime, LogTimes};

use std::io::Result;

/// Orchestrates what happens around the two-phase join: which relations
/// and members are interesting, what to do with ways nobody references,
/// when to hand completed relations to the assembler, and when to flush
/// the output buffer downstream.
pub struct AreaHandler {
    assembler: Box<dyn AreaAssembler>,
    output: AreaBuffer,
    consumer: Option<CallFinishAreaBuffer>,
    stats: AreaStats,
    errs: Vec<(Element, String)>,
}

impl AreaHandler {
    pub fn new(assembler: Box<dyn AreaAssembler>) -> AreaHandler {
        AreaHandler {
            assembler: assembler,
            output: AreaBuffer::new(),
            consumer: None,
            stats: AreaStats::new(),
            errs: Vec::new(),
        }
    }

    pub fn with_config(config: AssemblerConfig) -> AreaHandler {
        AreaHandler::new(Box::new(RingAssembler::new(config)))
    }

    pub fn set_consumer(&mut self, consumer: CallFinishAreaBuffer) {
        self.consumer = Some(consumer);
    }

    pub fn stats(&self) -> AreaStats {
        self.stats
    }

    pub fn take_errors(&mut self) -> Vec<(Element, String)> {
        std::mem::take(&mut self.errs)
    }

    /// Hand the current buffer to the consumer and start a fresh one.
    /// Without a registered consumer this is a no-op and the buffer keeps
    /// growing; drain it with read() instead.
    pub fn flush(&mut self) {
        match self.consumer.as_mut() {
            None => {}
            Some(out) => {
                let buf = std::mem::replace(&mut self.output, AreaBuffer::new());
                out.call(buf);
            }
        }
    }

    /// Swap out and return the current buffer.
    pub fn read(&mut self) -> AreaBuffer {
        std::mem::replace(&mut self.output, AreaBuffer::new())
    }

    fn possibly_flush(&mut self) {
        if self.output.committed() > MAX_BUFFER_SIZE_FOR_FLUSH {
            self.flush();
        }
    }

    /// Final flush plus consumer shutdown; returns the consumer's
    /// timings when one was registered.
    pub fn finish(&mut self) -> Result<Option<Timings>> {
        self.flush();
        match self.consumer.take() {
            None => Ok(None),
            Some(mut out) => Ok(Some(out.finish()?)),
        }
    }
}

impl CollectorHandler for AreaHandler {
    fn keep_relation(&self, rel: &Relation) -> bool {
        // ignore relations without a type tag
        match find_tag_value(&rel.tags, "type") {
            None => false,
            Some(t) => t == "multipolygon" || t == "boundary",
        }
    }

    fn keep_member(&self, _rel: &Relation, mem: &Member) -> bool {
        mem.mem_type == ElementType::Way
    }

    fn way_not_in_any_relation(&mut self, way: Way, locs: Vec<Option<LonLat>>) {
        // need at least 4 nodes to enclose an area
        if way.refs.len() <= 3 || locs.len() != way.refs.len() {
            return;
        }
        match (&locs[0], &locs[locs.len() - 1]) {
            (Some(f), Some(t)) => {
                if f != t {
                    return;
                }
            }
            _ => {
                self.stats.skipped_unresolved += 1;
                return;
            }
        }
        match self.assembler.assemble_way(&way, &locs, &mut self.output) {
            Ok(st) => {
                self.stats += st;
                self.possibly_flush();
            }
            Err(e) => {
                self.stats.invalid_geometries += 1;
                self.errs.push((Element::Way(way), e.to_string()));
            }
        }
    }

    fn complete_relation(&mut self, rel: Relation, ways: Vec<(Way, Vec<Option<LonLat>>)>) {
        match self
            .assembler
            .assemble_relation(&rel, &ways, &mut self.output)
        {
            Ok(st) => {
                self.stats += st;
                self.possibly_flush();
            }
            Err(e) => {
                self.stats.invalid_geometries += 1;
                self.errs.push((Element::Relation(rel), e.to_string()));
            }
        }
    }

    fn relation_without_members(&mut self, _rel: &Relation) {
        self.stats.no_way_members += 1;
    }

    fn incomplete_relation(&mut self, _rel: &Relation) {
        self.stats.incomplete_relations += 1;
    }
}

/// Two-pass driver over element streams: skim relations first, then feed
/// nodes and ways. Collects node locations on the way pass. Drains the
/// output buffer at the end; for callback-style consumption use
/// process_areas_with_consumer.
pub fn process_areas<I1, I2>(
    config: AssemblerConfig,
    relation_pass: I1,
    object_pass: I2,
) -> Result<(AreaBuffer, AreaStats, Vec<(Element, String)>)>
where
    I1: IntoIterator<Item = Element>,
    I2: IntoIterator<Item = Element>,
{
    let mut coll = RelationCollector::new(AreaHandler::with_config(config));
    let (nr, nn, nw) = run_passes(&mut coll, relation_pass, object_pass);

    let stats = coll.handler.stats();
    let errs = coll.handler.take_errors();
    let res = coll.handler.read();
    message!(
        "process_areas: {} relations, {} nodes, {} ways: {}",
        nr,
        nn,
        nw,
        stats
    );
    Ok((res, stats, errs))
}

pub fn process_areas_with_consumer<I1, I2>(
    config: AssemblerConfig,
    relation_pass: I1,
    object_pass: I2,
    consumer: CallFinishAreaBuffer,
) -> Result<(Timings, AreaStats, Vec<(Element, String)>)>
where
    I1: IntoIterator<Item = Element>,
    I2: IntoIterator<Item = Element>,
{
    let mut handler = AreaHandler::with_config(config);
    handler.set_consumer(consumer);
    let mut coll = RelationCollector::new(handler);
    run_passes(&mut coll, relation_pass, object_pass);

    let stats = coll.handler.stats();
    let errs = coll.handler.take_errors();
    let tms = match coll.handler.finish()? {
        Some(t) => t,
        None => Timings::new(),
    };
    Ok((tms, stats, errs))
}

fn run_passes<I1, I2>(
    coll: &mut RelationCollector<AreaHandler>,
    relation_pass: I1,
    object_pass: I2,
) -> (usize, usize, usize)
where
    I1: IntoIterator<Item = Element>,
    I2: IntoIterator<Item = Element>,
{
    let mut tx = LogTimes::new();
    let mut nr = 0;
    for e in relation_pass {
        match e {
            Element::Relation(r) => {
                coll.add_relation(r);
                nr += 1;
            }
            _ => {}
        }
    }
    tx.add("scan relations");

    let mut locs = Locations::new();
    let mut ct = Checktime::new();
    let mut nn = 0;
    let mut nw = 0;
    for e in object_pass {
        match e {
            Element::Node(n) => {
                locs.add_node(&n);
                nn += 1;
            }
            Element::Way(w) => {
                let ll = locs.way_locs(&w.refs);
                coll.add_way(w, ll);
                nw += 1;
            }
            Element::Relation(_) => {}
        }
        match ct.checktime() {
            None => {}
            Some(t) => {
                message!("{:5.1}s: {} nodes, {} ways", t, nn, nw);
            }
        }
    }
    coll.finish();
    tx.add("scan ways");
    message!("{}", tx);
    (nr, nn, nw)
}
