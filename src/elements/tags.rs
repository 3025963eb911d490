#[derive(Debug, Eq, PartialEq, Clone, serde::Serialize)]
pub struct Tag {
    pub key: String,
    pub val: String,
}

impl Tag {
    pub fn new(key: String, val: String) -> Tag {
        Tag { key, val }
    }
}

pub fn find_tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    for t in tags {
        if t.key == key {
            return Some(&t.val);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_value() {
        let tags = vec![
            Tag::new(String::from("type"), String::from("multipolygon")),
            Tag::new(String::from("landuse"), String::from("forest")),
        ];
        assert_eq!(find_tag_value(&tags, "type"), Some("multipolygon"));
        assert_eq!(find_tag_value(&tags, "natural"), None);
    }
}
