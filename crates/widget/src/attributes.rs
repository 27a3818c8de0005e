//! Validation of externally supplied attribute values.
//!
//! Every function here is pure: it either returns the typed value that may
//! become effective state, or the error the host should raise.

use std::fmt;

use foundation::math::ProjectionKind;
use h3o::CellIndex;
use layers::parse_cell;
use serde_json::Value;

use crate::config::ReloadPolicy;
use crate::error::AttributeError;

pub const PROJECTION: &str = "projection";
pub const AREAS: &str = "areas";
pub const WORLD_GEOMETRY_SRC: &str = "world-geometry-src";
pub const WORLD_GEOMETRY_COLL: &str = "world-geometry-coll";
pub const RELOAD_POLICY: &str = "reload-policy";

/// Attribute names the element reacts to; anything else is ignored.
pub static OBSERVED_ATTRIBUTES: [&str; 5] = [
    PROJECTION,
    AREAS,
    WORLD_GEOMETRY_SRC,
    WORLD_GEOMETRY_COLL,
    RELOAD_POLICY,
];

/// A validated `areas` entry: the identifier exactly as assigned and the cell
/// it names. Displays as the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub id: String,
    pub cell: CellIndex,
}

impl Area {
    fn parse(index: usize, id: &str) -> Result<Self, AttributeError> {
        let cell = parse_cell(id).map_err(|_| AttributeError::InvalidCell {
            index,
            value: id.to_string(),
        })?;
        Ok(Self {
            id: id.to_string(),
            cell,
        })
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

pub fn validate_projection(id: &str) -> Result<ProjectionKind, AttributeError> {
    ProjectionKind::from_id(id).ok_or_else(|| AttributeError::UnknownProjection(id.to_string()))
}

pub fn validate_reload_policy(text: &str) -> Result<ReloadPolicy, AttributeError> {
    ReloadPolicy::from_attribute(text)
        .ok_or_else(|| AttributeError::UnknownReloadPolicy(text.to_string()))
}

/// Validates each identifier, reporting the first one that fails.
pub fn validate_areas<S: AsRef<str>>(ids: &[S]) -> Result<Vec<Area>, AttributeError> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| Area::parse(index, id.as_ref()))
        .collect()
}

/// Validates a JSON value that should be an array of identifier strings.
///
/// Non-string elements are reported as invalid cells, with the element's JSON
/// text as the offending value.
pub fn validate_areas_value(value: &Value) -> Result<Vec<Area>, AttributeError> {
    let items = value.as_array().ok_or(AttributeError::NotASequence)?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.as_str() {
            Some(id) => Area::parse(index, id),
            None => Err(AttributeError::InvalidCell {
                index,
                value: item.to_string(),
            }),
        })
        .collect()
}

/// Validates the JSON text form used by the `areas` markup attribute.
pub fn validate_areas_json(text: &str) -> Result<Vec<Area>, AttributeError> {
    let value: Value = serde_json::from_str(text).map_err(|_| AttributeError::NotASequence)?;
    validate_areas_value(&value)
}

#[cfg(test)]
mod tests {
    use super::{validate_areas, validate_areas_json, validate_projection, validate_reload_policy};
    use crate::config::ReloadPolicy;
    use crate::error::AttributeError;
    use foundation::math::{PROJECTIONS, ProjectionKind};
    use pretty_assertions::assert_eq;

    const A: &str = "8928308280fffff";
    const B: &str = "8009fffffffffff";

    #[test]
    fn every_supported_projection_validates() {
        for (id, kind) in PROJECTIONS {
            assert_eq!(validate_projection(id), Ok(kind));
        }
    }

    #[test]
    fn projection_lookup_is_exact() {
        for bad in ["", "orthographic", "geoorthographic", " geoOrthographic", "geoTransverseMercator"] {
            assert_eq!(
                validate_projection(bad),
                Err(AttributeError::UnknownProjection(bad.to_string()))
            );
        }
        assert_eq!(validate_projection("geoMercator"), Ok(ProjectionKind::Mercator));
    }

    #[test]
    fn areas_keep_input_order_and_duplicates() {
        let cells = validate_areas(&[A, B, A]).expect("valid");
        let ids: Vec<String> = cells.iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec![A, B, A]);
    }

    #[test]
    fn areas_keep_identifiers_as_written() {
        let upper = A.to_uppercase();
        let areas = validate_areas(&[upper.as_str()]).expect("valid");
        assert_eq!(areas[0].id, upper);
        assert_eq!(areas[0].to_string(), upper);
        assert_eq!(areas[0].cell.to_string(), A);
    }

    #[test]
    fn first_invalid_area_is_reported() {
        assert_eq!(
            validate_areas(&[A, "nope", "also-bad"]),
            Err(AttributeError::InvalidCell {
                index: 1,
                value: "nope".to_string()
            })
        );
    }

    #[test]
    fn json_areas_must_be_an_array_of_strings() {
        assert_eq!(validate_areas_json("[]"), Ok(vec![]));
        assert_eq!(validate_areas_json("not json"), Err(AttributeError::NotASequence));
        assert_eq!(
            validate_areas_json(&format!("\"{A}\"")),
            Err(AttributeError::NotASequence)
        );
        assert_eq!(
            validate_areas_json(&format!("[\"{A}\", 42]")),
            Err(AttributeError::InvalidCell {
                index: 1,
                value: "42".to_string()
            })
        );
        assert_eq!(validate_areas_json(&format!("[\"{B}\"]")).map(|c| c.len()), Ok(1));
    }

    #[test]
    fn reload_policies() {
        assert_eq!(validate_reload_policy("once"), Ok(ReloadPolicy::Once));
        assert_eq!(
            validate_reload_policy("on-source-change"),
            Ok(ReloadPolicy::OnSourceChange)
        );
        assert_eq!(
            validate_reload_policy("always").map_err(|e| e.class()),
            Err(crate::error::ErrorClass::Range)
        );
    }
}
