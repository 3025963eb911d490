use crate::area::members::MemberBuffer;
use crate::area::position::LonLat;
use crate::elements::{ElementType, Member, Relation, Way};

use std::collections::{BTreeMap, BTreeSet};

/// The seams a two-phase relation/member join calls into: which relations
/// and members to track, and what to do once a relation's members have
/// all arrived, or a way turns out not to belong to any relation.
pub trait CollectorHandler {
    fn keep_relation(&self, rel: &Relation) -> bool;
    fn keep_member(&self, rel: &Relation, mem: &Member) -> bool;

    fn way_not_in_any_relation(&mut self, way: Way, locs: Vec<Option<LonLat>>);
    fn complete_relation(&mut self, rel: Relation, ways: Vec<(Way, Vec<Option<LonLat>>)>);

    /// Relation which passed the filter but has no qualifying members;
    /// it will never be completed.
    fn relation_without_members(&mut self, _rel: &Relation) {}

    /// Relation still waiting on members when input ran out; it is
    /// discarded without assembly.
    fn incomplete_relation(&mut self, _rel: &Relation) {}
}

/// Two-phase id-keyed join between relations and their way members.
///
/// Phase one scans relations and registers which way ids each one is
/// waiting for. Phase two scans ways: a way some relation is waiting for
/// is copied once into the member buffer and crossed off every waiting
/// relation; a relation whose last outstanding member arrives is resolved
/// against the buffer and completed on the spot. Ways nobody registered
/// fall through to the handler's standalone path.
///
/// Ids must be unique per element kind; the collector relies on this and
/// does not check it.
pub struct RelationCollector<H: CollectorHandler> {
    pub handler: H,

    members: MemberBuffer,
    pending_relations: BTreeMap<i64, (Relation, BTreeSet<i64>)>,
    pending_ways: BTreeMap<i64, BTreeSet<i64>>,
}

impl<H: CollectorHandler> RelationCollector<H> {
    pub fn new(handler: H) -> RelationCollector<H> {
        RelationCollector {
            handler: handler,
            members: MemberBuffer::new(),
            pending_relations: BTreeMap::new(),
            pending_ways: BTreeMap::new(),
        }
    }

    pub fn member_buffer(&self) -> &MemberBuffer {
        &self.members
    }

    pub fn num_pending_relations(&self) -> usize {
        self.pending_relations.len()
    }

    pub fn num_pending_ways(&self) -> usize {
        self.pending_ways.len()
    }

    pub fn add_relation(&mut self, r: Relation) {
        if !self.handler.keep_relation(&r) {
            return;
        }

        let mut outstanding = BTreeSet::new();
        for m in &r.members {
            if !self.handler.keep_member(&r, m) {
                continue;
            }
            if m.mem_ref == 0 {
                // placeholder reference
                continue;
            }
            if self.members.contains(m.mem_type.clone(), m.mem_ref) {
                continue;
            }
            if outstanding.insert(m.mem_ref) {
                self.pending_ways
                    .entry(m.mem_ref)
                    .or_insert_with(BTreeSet::new)
                    .insert(r.id);
            }
        }

        if outstanding.is_empty() {
            if self.members_all_buffered(&r) {
                // every member already arrived through an earlier relation
                let ways = self.resolve_members(&r);
                self.handler.complete_relation(r, ways);
            } else {
                self.handler.relation_without_members(&r);
            }
            return;
        }

        self.pending_relations.insert(r.id, (r, outstanding));
    }

    pub fn add_way(&mut self, w: Way, locs: Vec<Option<LonLat>>) {
        match self.pending_ways.remove(&w.id) {
            None => {
                self.handler.way_not_in_any_relation(w, locs);
            }
            Some(waiting) => {
                self.members.add_way(&w, &locs);

                let mut finished = Vec::new();
                for r in waiting {
                    match self.pending_relations.get_mut(&r) {
                        None => {}
                        Some((_, outstanding)) => {
                            outstanding.remove(&w.id);
                            if outstanding.is_empty() {
                                finished.push(r);
                            }
                        }
                    }
                }

                for r in finished {
                    match self.pending_relations.remove(&r) {
                        None => {}
                        Some((rel, _)) => {
                            let ways = self.resolve_members(&rel);
                            self.handler.complete_relation(rel, ways);
                        }
                    }
                }
            }
        }
    }

    fn members_all_buffered(&self, rel: &Relation) -> bool {
        let mut any = false;
        for m in &rel.members {
            if !self.handler.keep_member(rel, m) || m.mem_ref == 0 {
                continue;
            }
            if !self.members.contains(m.mem_type.clone(), m.mem_ref) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Ordered member list resolved against the buffer; placeholder ids
    /// are skipped.
    fn resolve_members(&self, rel: &Relation) -> Vec<(Way, Vec<Option<LonLat>>)> {
        let mut res = Vec::with_capacity(rel.members.len());
        for m in &rel.members {
            if m.mem_type != ElementType::Way || m.mem_ref == 0 {
                continue;
            }
            match self.members.get_offset(m.mem_type.clone(), m.mem_ref) {
                None => {}
                Some(o) => match self.members.read_way(o) {
                    Ok(w) => {
                        res.push(w);
                    }
                    Err(_) => {}
                },
            }
        }
        res
    }

    pub fn read_relations<I: IntoIterator<Item = Relation>>(&mut self, rels: I) {
        for r in rels {
            self.add_relation(r);
        }
    }

    pub fn read_ways<I: IntoIterator<Item = (Way, Vec<Option<LonLat>>)>>(&mut self, ways: I) {
        for (w, ll) in ways {
            self.add_way(w, ll);
        }
    }

    /// End of input: relations still waiting on members are reported and
    /// dropped. Buffers stay drainable.
    pub fn finish(&mut self) {
        for (_, (rel, _)) in std::mem::take(&mut self.pending_relations) {
            self.handler.incomplete_relation(&rel);
        }
        self.pending_ways.clear();
    }
}
