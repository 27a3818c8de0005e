//! Shapes derived from element state at render time.
//!
//! Nothing here is cached: every function is a pure function of the unique
//! areas, the measured viewport and the projection.

use foundation::math::{
    GeoBounds, LonLat, Projection, ProjectionKind, SphereRotation, small_circle,
    spherical_bounds, spherical_centroid,
};
use h3o::CellIndex;
use layers::{CellPolygon, cell_polygons};

use crate::viewport::Viewport;

/// Divisor applied to the larger span of the area bounds to get the
/// bounding circle radius.
pub const BOUNDING_CIRCLE_DIVISOR: f64 = 1.9;
/// Sampling step of the bounding circle ring, in degrees.
pub const CIRCLE_STEP_DEG: f64 = 6.0;

/// Everything the map presentation draws, for one render pass.
#[derive(Debug, Clone)]
pub struct DerivedGeometry {
    pub view_box: [f64; 2],
    pub projection: Projection,
    pub areas: Vec<CellPolygon>,
    pub centroid: Option<LonLat>,
    pub bounds: Option<GeoBounds>,
    pub bounding_circle: Option<Vec<LonLat>>,
}

impl DerivedGeometry {
    pub fn compute(kind: ProjectionKind, unique_areas: &[CellIndex], viewport: Viewport) -> Self {
        let areas = cell_polygons(unique_areas);
        let centroid = centroid(&areas);
        let bounds = bounds(&areas);
        let bounding_circle = bounding_circle(centroid, bounds);
        let view_box = viewport.view_box();
        Self {
            view_box,
            projection: fitted_projection(kind, view_box, centroid),
            areas,
            centroid,
            bounds,
            bounding_circle,
        }
    }

    pub fn pentagon_count(&self) -> usize {
        self.areas.iter().filter(|a| a.pentagon).count()
    }
}

pub fn centroid(areas: &[CellPolygon]) -> Option<LonLat> {
    spherical_centroid(areas.iter().map(|a| a.ring.as_slice()))
}

pub fn bounds(areas: &[CellPolygon]) -> Option<GeoBounds> {
    spherical_bounds(areas.iter().map(|a| a.ring.as_slice()))
}

/// `max(lat span, lon span) / 1.9` degrees.
pub fn bounding_circle_radius(bounds: &GeoBounds) -> f64 {
    bounds.lat_span().abs().max(bounds.lon_span().abs()) / BOUNDING_CIRCLE_DIVISOR
}

/// A loose circle around the areas, centred on their centroid.
pub fn bounding_circle(centroid: Option<LonLat>, bounds: Option<GeoBounds>) -> Option<Vec<LonLat>> {
    let (center, bounds) = (centroid?, bounds?);
    Some(small_circle(
        center,
        bounding_circle_radius(&bounds),
        CIRCLE_STEP_DEG,
    ))
}

/// Fits the whole sphere into the view box, then turns the centroid to the
/// center of the map.
pub fn fitted_projection(
    kind: ProjectionKind,
    view_box: [f64; 2],
    centroid: Option<LonLat>,
) -> Projection {
    let projection = Projection::new(kind).fit_size(view_box[0], view_box[1]);
    match centroid {
        Some(center) => projection.rotate(SphereRotation::centering(center)),
        None => projection,
    }
}

#[cfg(test)]
mod tests {
    use super::{DerivedGeometry, bounding_circle, bounding_circle_radius, bounds, centroid};
    use crate::viewport::Viewport;
    use foundation::math::{GeoBounds, LonLat, ProjectionKind, angular_distance_deg};
    use layers::{cell_polygons, parse_cell};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn zero_areas_derive_nothing_without_failing() {
        let vp = Viewport::new(800.0, 400.0).expect("usable");
        let derived = DerivedGeometry::compute(ProjectionKind::Orthographic, &[], vp);
        assert!(derived.centroid.is_none());
        assert!(derived.bounds.is_none());
        assert!(derived.bounding_circle.is_none());
        assert_eq!(derived.pentagon_count(), 0);
        assert!(derived.projection.rotation.is_identity());
        assert_eq!(derived.view_box, [2000.0, 1000.0]);
    }

    #[test]
    fn single_cell_centroid_is_inside_its_boundary() {
        let cell = parse_cell("8928308280fffff").expect("valid");
        let areas = cell_polygons(&[cell]);
        let c = centroid(&areas).expect("centroid");
        let center = h3o::LatLng::from(cell);
        assert!(angular_distance_deg(c, LonLat::new(center.lng(), center.lat())) < 0.01);
        let b = bounds(&areas).expect("bounds");
        assert!(b.west < c.lon_deg && c.lon_deg < b.east);
        assert!(b.south < c.lat_deg && c.lat_deg < b.north);
    }

    #[test]
    fn radius_uses_the_larger_span() {
        let b = GeoBounds {
            west: 10.0,
            south: -5.0,
            east: 48.0,
            north: 5.0,
        };
        assert_close(bounding_circle_radius(&b), 20.0, 1e-12);

        let across = GeoBounds {
            west: 170.0,
            south: 0.0,
            east: -170.0,
            north: 1.9,
        };
        assert_close(bounding_circle_radius(&across), 20.0 / 1.9, 1e-9);
    }

    #[test]
    fn bounding_circle_is_centred_on_the_centroid() {
        let center = LonLat::new(30.0, 40.0);
        let b = GeoBounds {
            west: 20.0,
            south: 35.0,
            east: 40.0,
            north: 45.0,
        };
        let ring = bounding_circle(Some(center), Some(b)).expect("circle");
        assert_eq!(ring.len(), 61);
        for p in &ring {
            assert_close(angular_distance_deg(center, *p), 20.0 / 1.9, 1e-6);
        }
        assert!(bounding_circle(None, Some(b)).is_none());
    }

    #[test]
    fn projection_is_rotated_to_the_centroid() {
        let cells = [
            parse_cell("8928308280fffff").expect("valid"),
            parse_cell("8928308280bffff").expect("valid"),
        ];
        let vp = Viewport::new(500.0, 500.0).expect("usable");
        let derived = DerivedGeometry::compute(ProjectionKind::Orthographic, &cells, vp);
        let c = derived.centroid.expect("centroid");
        let p = derived.projection.project(c).expect("visible");
        assert_close(p.x, 500.0, 1e-6);
        assert_close(p.y, 500.0, 1e-6);
        assert_eq!(derived.areas.len(), 2);
    }
}
