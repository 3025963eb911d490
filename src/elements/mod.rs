pub mod info;
pub mod node;
pub mod relation;
pub mod tags;
pub mod traits;
pub mod way;

pub use info::Info;
pub use node::Node;
pub use relation::{Member, Relation};
pub use tags::{find_tag_value, Tag};
pub use traits::*;
pub use way::Way;
