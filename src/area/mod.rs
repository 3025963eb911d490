mod assembler;
mod collector;
mod handler;
mod locations;
mod members;
mod output;
mod position;
mod rings;
mod stats;

use crate::elements::Element;

pub use crate::area::assembler::{AreaAssembler, AssemblerConfig, RingAssembler};
pub use crate::area::collector::{CollectorHandler, RelationCollector};
pub use crate::area::handler::{process_areas, process_areas_with_consumer, AreaHandler};
pub use crate::area::locations::Locations;
pub use crate::area::members::MemberBuffer;
pub use crate::area::output::{
    AreaBuffer, CollectAreas, WriteGzipAreas, INITIAL_OUTPUT_BUFFER_SIZE,
    MAX_BUFFER_SIZE_FOR_FLUSH,
};
pub use crate::area::position::{
    calc_ring_area, coordinate_as_float, coordinate_as_integer, point_in_poly, polygon_contains,
    LonLat, XY,
};
pub use crate::area::rings::{
    collect_rings, AreaGeometry, PolygonPart, Ring, RingPart,
};
pub use crate::area::stats::AreaStats;

pub enum OtherData {
    Messages(Vec<String>),
    Errors(Vec<(Element, String)>),
    Areas(Vec<AreaGeometry>),
}

pub type Timings = crate::utils::Timings<OtherData>;

pub type CallFinishAreaBuffer =
    Box<dyn crate::callback::CallFinish<CallType = AreaBuffer, ReturnType = Timings>>;

pub type AreaCollector = RelationCollector<AreaHandler>;

