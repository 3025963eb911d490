use crate::elements::info::Info;
use crate::elements::tags::Tag;
use crate::elements::traits::*;

#[derive(Debug, Eq, PartialEq, Clone, serde::Serialize)]
pub struct Way {
    pub id: i64,
    pub info: Option<Info>,
    pub tags: Vec<Tag>,
    pub refs: Vec<i64>,
}

impl Way {
    pub fn new(id: i64) -> Way {
        Way {
            id: id,
            info: None,
            tags: Vec::new(),
            refs: Vec::new(),
        }
    }
}

impl WithType for Way {
    fn get_type(&self) -> ElementType {
        ElementType::Way
    }
}

impl WithId for Way {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl WithInfo for Way {
    fn get_info<'a>(&'a self) -> &'a Option<Info> {
        &self.info
    }
}

impl WithTags for Way {
    fn get_tags<'a>(&'a self) -> &'a [Tag] {
        &self.tags
    }
}
