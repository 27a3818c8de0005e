use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROJECTION: &str = "geoOrthographic";
pub const DEFAULT_WORLD_GEOMETRY_SRC: &str =
    "https://cdn.jsdelivr.net/npm/world-atlas@2/land-110m.json";
pub const DEFAULT_WORLD_GEOMETRY_COLL: &str = "land";
pub const DEFAULT_RELOAD_POLICY: &str = "once";

/// Markup default of every observed attribute, applied when an attribute is
/// removed.
pub static DEFAULT_ATTRIBUTES: [(&str, &str); 5] = [
    (crate::attributes::PROJECTION, DEFAULT_PROJECTION),
    (crate::attributes::AREAS, "[]"),
    (crate::attributes::WORLD_GEOMETRY_SRC, DEFAULT_WORLD_GEOMETRY_SRC),
    (crate::attributes::WORLD_GEOMETRY_COLL, DEFAULT_WORLD_GEOMETRY_COLL),
    (crate::attributes::RELOAD_POLICY, DEFAULT_RELOAD_POLICY),
];

pub fn default_attribute(name: &str) -> Option<&'static str> {
    DEFAULT_ATTRIBUTES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

/// What happens when the world geometry source changes after the first load.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Geometry is fetched once per element; later source changes are kept
    /// but not fetched.
    #[default]
    Once,
    /// A source change schedules a fresh load after the next paint.
    OnSourceChange,
}

impl ReloadPolicy {
    pub fn from_attribute(text: &str) -> Option<Self> {
        match text {
            "once" => Some(ReloadPolicy::Once),
            "on-source-change" => Some(ReloadPolicy::OnSourceChange),
            _ => None,
        }
    }

    pub fn as_attribute(self) -> &'static str {
        match self {
            ReloadPolicy::Once => "once",
            ReloadPolicy::OnSourceChange => "on-source-change",
        }
    }
}

/// Element configuration in its serialized form.
///
/// Values are kept as text so a configuration file is checked by the same
/// validation as markup attributes (see [`crate::H3Map::from_config`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WidgetConfig {
    pub projection: String,
    pub areas: Vec<String>,
    pub world_geometry_src: String,
    pub world_geometry_coll: String,
    pub reload_policy: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            projection: DEFAULT_PROJECTION.to_string(),
            areas: Vec::new(),
            world_geometry_src: DEFAULT_WORLD_GEOMETRY_SRC.to_string(),
            world_geometry_coll: DEFAULT_WORLD_GEOMETRY_COLL.to_string(),
            reload_policy: DEFAULT_RELOAD_POLICY.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl WidgetConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ReloadPolicy, WidgetConfig, default_attribute};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_markup_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(default_attribute("projection"), Some(config.projection.as_str()));
        assert_eq!(
            default_attribute("world-geometry-src"),
            Some(config.world_geometry_src.as_str())
        );
        assert_eq!(default_attribute("world-geometry-coll"), Some("land"));
        assert_eq!(default_attribute("areas"), Some("[]"));
        assert_eq!(default_attribute("reload-policy"), Some("once"));
        assert_eq!(default_attribute("class"), None);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let config = WidgetConfig::from_json_str(
            r#"{"projection": "geoMercator", "areas": ["8928308280fffff"]}"#,
        )
        .expect("parse");
        assert_eq!(config.projection, "geoMercator");
        assert_eq!(config.areas, vec!["8928308280fffff".to_string()]);
        assert_eq!(config.world_geometry_coll, "land");
        assert_eq!(config.reload_policy, "once");
    }

    #[test]
    fn kebab_case_keys_round_trip() {
        let config = WidgetConfig {
            world_geometry_coll: "countries".into(),
            reload_policy: ReloadPolicy::OnSourceChange.as_attribute().into(),
            ..WidgetConfig::default()
        };
        let text = config.to_json_string_pretty().expect("serialize");
        assert!(text.contains("\"world-geometry-coll\": \"countries\""));
        assert_eq!(WidgetConfig::from_json_str(&text).expect("parse"), config);
    }
}
