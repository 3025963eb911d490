use crate::elements::{Info, Node, Relation, Tag, Way};

use std::cmp::Ordering;

#[derive(Debug, serde::Serialize)]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

impl WithType for Element {
    fn get_type(&self) -> ElementType {
        match self {
            Element::Node(_) => ElementType::Node,
            Element::Way(_) => ElementType::Way,
            Element::Relation(_) => ElementType::Relation,
        }
    }
}

impl WithId for Element {
    fn get_id(&self) -> i64 {
        match self {
            Element::Node(n) => n.id,
            Element::Way(w) => w.id,
            Element::Relation(r) => r.id,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.get_type() == other.get_type() && self.get_id() == other.get_id()
    }
}
impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.get_type().cmp(&other.get_type()) {
            Ordering::Equal => Some(self.get_id().cmp(&other.get_id())),
            x => Some(x),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Ord, PartialOrd, serde::Serialize)]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

pub trait WithType {
    fn get_type(&self) -> ElementType;
}

pub trait WithId {
    fn get_id(&self) -> i64;
}

pub trait WithInfo {
    fn get_info<'a>(&'a self) -> &'a Option<Info>;
}

pub trait WithTags {
    fn get_tags<'a>(&'a self) -> &'a [Tag];
}

pub trait WithTimestamp {
    fn get_timestamp(&self) -> i64;
    fn get_timestamp_string(&self) -> String {
        crate::utils::timestamp_string(self.get_timestamp())
    }
}

impl<T> WithTimestamp for T
where
    T: WithInfo,
{
    fn get_timestamp(&self) -> i64 {
        match self.get_info() {
            Some(info) => info.timestamp,
            None => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ordering() {
        let n = Element::Node(Node::new(5));
        let w = Element::Way(Way::new(3));
        assert!(n < w);
        assert_eq!(n.get_id(), 5);
        assert_eq!(w.get_type(), ElementType::Way);
    }

    #[test]
    fn test_timestamp_via_info() {
        let mut w = Way::new(1);
        assert_eq!(w.get_timestamp(), -1);

        let mut info = Info::new();
        info.timestamp = 1577836800;
        w.info = Some(info);
        assert_eq!(w.get_timestamp_string(), "2020-01-01T00:00:00");
    }
}
