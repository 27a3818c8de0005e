pub mod bounds;
pub mod math;

// Foundation crate: spherical geometry and projections, no I/O.
pub use bounds::*;
