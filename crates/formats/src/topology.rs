//! TopoJSON topology documents.
//!
//! Parsing and arc stitching are done by the `topojson` crate; this module
//! adds the lookup rules the map needs: a missing object is `None`, not an
//! error.

use geojson::FeatureCollection;
use serde_json::Value;
use thiserror::Error;
use topojson::TopoJson;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error(transparent)]
    Parse(#[from] topojson::Error),
    #[error("expected a TopoJSON Topology")]
    NotATopology,
    #[error("cannot convert object {object:?}: {source}")]
    Convert {
        object: String,
        #[source]
        source: topojson::Error,
    },
}

#[derive(Debug)]
pub struct Topology {
    inner: topojson::Topology,
}

impl Topology {
    pub fn from_json_str(payload: &str) -> Result<Self, TopologyError> {
        match payload.parse::<TopoJson>()? {
            TopoJson::Topology(inner) => Ok(Self { inner }),
            _ => Err(TopologyError::NotATopology),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, TopologyError> {
        Self::from_json_str(&value.to_string())
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.inner.objects.iter().map(|object| object.name.as_str())
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.object_names().any(|object| object == name)
    }

    /// Converts the named object to a feature collection; `Ok(None)` when the
    /// topology has no such object.
    pub fn feature_collection(&self, name: &str) -> Result<Option<FeatureCollection>, TopologyError> {
        if !self.has_object(name) {
            return Ok(None);
        }
        topojson::to_geojson(&self.inner, name)
            .map(Some)
            .map_err(|source| TopologyError::Convert {
                object: name.to_string(),
                source,
            })
    }
}
