use crate::elements::info::Info;
use crate::elements::tags::Tag;
use crate::elements::traits::*;

#[derive(Debug, Eq, PartialEq, Clone, serde::Serialize)]
pub struct Node {
    pub id: i64,
    pub info: Option<Info>,
    pub tags: Vec<Tag>,

    pub lon: i32,
    pub lat: i32,
}

impl Node {
    pub fn new(id: i64) -> Node {
        Node {
            id: id,
            info: None,
            tags: Vec::new(),
            lon: 0,
            lat: 0,
        }
    }
}

impl WithType for Node {
    fn get_type(&self) -> ElementType {
        ElementType::Node
    }
}

impl WithId for Node {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl WithInfo for Node {
    fn get_info<'a>(&'a self) -> &'a Option<Info> {
        &self.info
    }
}

impl WithTags for Node {
    fn get_tags<'a>(&'a self) -> &'a [Tag] {
        &self.tags
    }
}
