use crate::elements::info::Info;
use crate::elements::tags::Tag;
use crate::elements::traits::*;

#[derive(Debug, Eq, PartialEq, Clone, serde::Serialize)]
pub struct Relation {
    pub id: i64,
    pub info: Option<Info>,
    pub tags: Vec<Tag>,
    pub members: Vec<Member>,
}

#[derive(Debug, Eq, PartialEq, Clone, serde::Serialize)]
pub struct Member {
    pub role: String,
    pub mem_type: ElementType,
    pub mem_ref: i64,
}

impl Member {
    pub fn new(role: String, mem_type: ElementType, mem_ref: i64) -> Member {
        Member {
            role,
            mem_type,
            mem_ref,
        }
    }
}

impl Relation {
    pub fn new(id: i64) -> Relation {
        Relation {
            id: id,
            info: None,
            tags: Vec::new(),
            members: Vec::new(),
        }
    }
}

impl WithType for Relation {
    fn get_type(&self) -> ElementType {
        ElementType::Relation
    }
}

impl WithId for Relation {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl WithInfo for Relation {
    fn get_info<'a>(&'a self) -> &'a Option<Info> {
        &self.info
    }
}

impl WithTags for Relation {
    fn get_tags<'a>(&'a self) -> &'a [Tag] {
        &self.tags
    }
}
