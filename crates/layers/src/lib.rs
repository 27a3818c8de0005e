pub mod cells;
pub mod layer;
pub mod path;
pub mod symbology;

pub use cells::*;
pub use layer::*;
pub use path::*;
pub use symbology::*;
