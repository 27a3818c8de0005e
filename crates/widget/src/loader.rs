//! World geometry retrieval and conversion.

use std::future::Future;

use formats::{FeatureCollection, Topology};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{FetchError, LoadError};

/// Where the background geometry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSource {
    pub src: String,
    pub coll: String,
}

impl WorldSource {
    pub fn new(src: impl Into<String>, coll: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            coll: coll.into(),
        }
    }
}

/// Retrieves a JSON document. Implementations report non-success responses as
/// [`FetchError::Status`] and never retry.
pub trait GeometryFetcher {
    fn fetch_json(&self, src: &str) -> impl Future<Output = Result<Value, FetchError>>;
}

/// Resolution state of the background geometry.
#[derive(Debug, Default)]
pub enum WorldGeometry {
    #[default]
    Unloaded,
    Loaded(FeatureCollection),
    /// The topology has no collection of the requested name.
    Absent,
    Failed(LoadError),
}

impl WorldGeometry {
    pub fn from_result(result: Result<Option<FeatureCollection>, LoadError>) -> Self {
        match result {
            Ok(Some(fc)) => WorldGeometry::Loaded(fc),
            Ok(None) => WorldGeometry::Absent,
            Err(err) => WorldGeometry::Failed(err),
        }
    }

    /// Loaded or absent; both let the map render.
    pub fn is_resolved(&self) -> bool {
        matches!(self, WorldGeometry::Loaded(_) | WorldGeometry::Absent)
    }

    pub fn features(&self) -> Option<&FeatureCollection> {
        match self {
            WorldGeometry::Loaded(fc) => Some(fc),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            WorldGeometry::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Fetches `source.src` and converts its `source.coll` object.
///
/// `Ok(None)` means the document is a valid topology without that collection.
pub async fn load_world_geometry<F>(
    fetcher: &F,
    source: &WorldSource,
) -> Result<Option<FeatureCollection>, LoadError>
where
    F: GeometryFetcher + ?Sized,
{
    debug!(src = %source.src, coll = %source.coll, "fetching world geometry");
    let document = fetcher.fetch_json(&source.src).await?;
    let topology = Topology::from_value(&document)?;
    if !topology.has_object(&source.coll) {
        info!(
            coll = %source.coll,
            available = ?topology.object_names().collect::<Vec<_>>(),
            "world geometry collection not found"
        );
        return Ok(None);
    }
    let collection = topology.feature_collection(&source.coll)?;
    if let Some(fc) = &collection {
        info!(coll = %source.coll, features = fc.features.len(), "world geometry loaded");
    }
    Ok(collection)
}


#[cfg(test)]
mod tests {
    use super::testing::{MemoryFetcher, land_topology};
    use super::{WorldGeometry, WorldSource, load_world_geometry};
    use crate::error::{FetchError, LoadError};
    use formats::GeometryValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_named_collection() {
        let fetcher = MemoryFetcher::default().with("land.json", land_topology());
        let source = WorldSource::new("land.json", "land");
        let fc = pollster::block_on(load_world_geometry(&fetcher, &source))
            .expect("loads")
            .expect("present");
        assert_eq!(fc.features.len(), 1);
        let geometry = fc.features[0].geometry.as_ref().expect("geometry");
        let GeometryValue::Polygon(rings) = &geometry.value else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn missing_collection_is_absent_not_an_error() {
        let fetcher = MemoryFetcher::default().with("land.json", land_topology());
        let source = WorldSource::new("land.json", "countries");
        let result = pollster::block_on(load_world_geometry(&fetcher, &source));
        let state = WorldGeometry::from_result(result);
        assert!(matches!(state, WorldGeometry::Absent));
        assert!(state.is_resolved());
    }

    #[test]
    fn status_failures_are_propagated() {
        let fetcher = MemoryFetcher::default();
        let source = WorldSource::new("missing.json", "land");
        let result = pollster::block_on(load_world_geometry(&fetcher, &source));
        match result {
            Err(LoadError::Fetch(FetchError::Status { status, .. })) => assert_eq!(status, 404),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_topology_documents_fail() {
        let fetcher = MemoryFetcher::default()
            .with("fc.json", serde_json::json!({"type": "FeatureCollection", "features": []}));
        let source = WorldSource::new("fc.json", "land");
        let state = WorldGeometry::from_result(pollster::block_on(load_world_geometry(
            &fetcher, &source,
        )));
        assert!(!state.is_resolved());
        assert!(matches!(state.error(), Some(LoadError::Topology(_))));
    }
}
