//! The `<h3-map>` element: a world map highlighting H3 cells.
//!
//! This crate holds the element's state machine and templates and is free of
//! any host API. Browser and command-line hosts drive it through [`H3Map`].

pub mod attributes;
pub mod config;
pub mod derive;
pub mod element;
pub mod error;
pub mod events;
pub mod loader;
pub mod render;
pub mod sequencer;
pub mod viewport;

pub use attributes::Area;
pub use config::{ReloadPolicy, WidgetConfig};
pub use derive::DerivedGeometry;
pub use element::H3Map;
pub use error::{AttributeError, ErrorClass, FetchError, LoadError};
pub use events::LifecycleEvent;
pub use loader::{GeometryFetcher, WorldGeometry, WorldSource, load_world_geometry};
pub use sequencer::{Phase, Task};
pub use viewport::Viewport;
