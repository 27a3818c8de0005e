use crate::sequencer::{Phase, Task};
use crate::viewport::Viewport;

/// Lifecycle events recorded on the element's event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    AttributeAccepted { name: &'static str },
    AttributeRejected { name: &'static str, message: String },
    TaskScheduled(Task),
    ViewportMeasured(Viewport),
    /// `features` is `None` when the collection is absent from the topology.
    GeometryResolved { coll: String, features: Option<usize> },
    GeometryFailed { message: String },
    /// A load finished for a source that is no longer configured.
    StaleGeometryDiscarded { src: String },
    PhaseChanged(Phase),
}
