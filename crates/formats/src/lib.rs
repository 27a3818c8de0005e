pub mod position;
pub mod topology;

pub use geojson::{Feature, FeatureCollection, Geometry, Value as GeometryValue};
pub use position::*;
pub use topology::*;
