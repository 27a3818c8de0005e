//! Named cartographic projections.
//!
//! A [`Projection`] is a raw projection (sphere -> unitless plane, y up) plus
//! a rotation applied before it and a scale/translate applied after it
//! (plane -> view-box units, y down). The supported set is a fixed table.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::clip;
use super::geodesy::small_circle;
use super::{LonLat, SphereRotation, Vec2};
use crate::bounds::Aabb2;

/// Latitude limit used by the Mercator projection (degrees).
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.05112878;

/// Sampling step for clip boundaries and outlines (degrees).
const OUTLINE_STEP_DEG: f64 = 2.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    AzimuthalEqualArea,
    AzimuthalEquidistant,
    EqualEarth,
    Equirectangular,
    Gnomonic,
    Mercator,
    NaturalEarth1,
    Orthographic,
    Stereographic,
}

/// Every supported projection, keyed by its public identifier.
pub static PROJECTIONS: [(&str, ProjectionKind); 9] = [
    ("geoAzimuthalEqualArea", ProjectionKind::AzimuthalEqualArea),
    ("geoAzimuthalEquidistant", ProjectionKind::AzimuthalEquidistant),
    ("geoEqualEarth", ProjectionKind::EqualEarth),
    ("geoEquirectangular", ProjectionKind::Equirectangular),
    ("geoGnomonic", ProjectionKind::Gnomonic),
    ("geoMercator", ProjectionKind::Mercator),
    ("geoNaturalEarth1", ProjectionKind::NaturalEarth1),
    ("geoOrthographic", ProjectionKind::Orthographic),
    ("geoStereographic", ProjectionKind::Stereographic),
];

/// How geometry is cut before it reaches the raw projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Clip {
    /// Cut along the meridian opposite the projection center.
    Antimeridian,
    /// Keep only what lies within `radius_deg` of the projection center.
    Circle { radius_deg: f64 },
}

impl ProjectionKind {
    pub fn from_id(id: &str) -> Option<Self> {
        PROJECTIONS
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, kind)| *kind)
    }

    pub fn id(self) -> &'static str {
        PROJECTIONS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("geoOrthographic")
    }

    pub fn clip(self) -> Clip {
        match self {
            ProjectionKind::Orthographic => Clip::Circle { radius_deg: 90.0 },
            ProjectionKind::Stereographic => Clip::Circle { radius_deg: 142.0 },
            ProjectionKind::Gnomonic => Clip::Circle { radius_deg: 60.0 },
            ProjectionKind::AzimuthalEqualArea | ProjectionKind::AzimuthalEquidistant => {
                Clip::Circle {
                    radius_deg: 180.0 - 1e-3,
                }
            }
            ProjectionKind::EqualEarth
            | ProjectionKind::Equirectangular
            | ProjectionKind::Mercator
            | ProjectionKind::NaturalEarth1 => Clip::Antimeridian,
        }
    }

    /// Raw projection of `(lambda, phi)` in radians. `None` where the formula
    /// has no finite value (e.g. the antipode of an azimuthal projection).
    pub fn raw(self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let out = match self {
            ProjectionKind::Equirectangular => (lambda, phi),
            ProjectionKind::Mercator => {
                let max = MERCATOR_MAX_LAT_DEG.to_radians();
                let phi = phi.clamp(-max, max);
                (lambda, (FRAC_PI_4 + phi / 2.0).tan().ln())
            }
            ProjectionKind::Orthographic => azimuthal(lambda, phi, |_| Some(1.0))?,
            ProjectionKind::Stereographic => azimuthal(lambda, phi, |cos_c| {
                let d = 1.0 + cos_c;
                (d > 1e-12).then(|| 1.0 / d)
            })?,
            ProjectionKind::Gnomonic => {
                azimuthal(lambda, phi, |cos_c| (cos_c > 1e-12).then(|| 1.0 / cos_c))?
            }
            ProjectionKind::AzimuthalEqualArea => azimuthal(lambda, phi, |cos_c| {
                let d = 1.0 + cos_c;
                (d > 1e-12).then(|| (2.0 / d).sqrt())
            })?,
            ProjectionKind::AzimuthalEquidistant => azimuthal(lambda, phi, |cos_c| {
                let c = cos_c.clamp(-1.0, 1.0).acos();
                let s = c.sin();
                if c < 1e-12 {
                    Some(1.0)
                } else if s < 1e-12 {
                    None
                } else {
                    Some(c / s)
                }
            })?,
            ProjectionKind::EqualEarth => equal_earth(lambda, phi),
            ProjectionKind::NaturalEarth1 => natural_earth1(lambda, phi),
        };
        (out.0.is_finite() && out.1.is_finite()).then_some(out)
    }

    /// The clip boundary, in raw projected coordinates.
    pub fn raw_outline(self) -> Vec<(f64, f64)> {
        match self.clip() {
            Clip::Circle { radius_deg } => {
                small_circle(LonLat::new(0.0, 0.0), radius_deg, OUTLINE_STEP_DEG)
                    .into_iter()
                    .filter_map(|p| self.raw(p.lon_deg.to_radians(), p.lat_deg.to_radians()))
                    .collect()
            }
            Clip::Antimeridian => {
                let steps = (180.0 / OUTLINE_STEP_DEG) as usize;
                let mut edge: Vec<(f64, f64)> = Vec::with_capacity(4 * steps + 1);
                // West edge going north, north edge going east, east edge going
                // south, south edge going west.
                for i in 0..steps {
                    edge.push((-PI, -FRAC_PI_2 + PI * i as f64 / steps as f64));
                }
                for i in 0..steps {
                    edge.push((-PI + 2.0 * PI * i as f64 / steps as f64, FRAC_PI_2));
                }
                for i in 0..steps {
                    edge.push((PI, FRAC_PI_2 - PI * i as f64 / steps as f64));
                }
                for i in 0..steps {
                    edge.push((PI - 2.0 * PI * i as f64 / steps as f64, -FRAC_PI_2));
                }
                edge.push((-PI, -FRAC_PI_2));
                edge.into_iter()
                    .filter_map(|(l, p)| self.raw(l, p))
                    .collect()
            }
        }
    }
}

fn azimuthal(lambda: f64, phi: f64, scale: impl Fn(f64) -> Option<f64>) -> Option<(f64, f64)> {
    let (sin_l, cos_l) = lambda.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    let k = scale(cos_l * cos_p)?;
    Some((k * cos_p * sin_l, k * sin_p))
}

fn equal_earth(lambda: f64, phi: f64) -> (f64, f64) {
    const A1: f64 = 1.340264;
    const A2: f64 = -0.081106;
    const A3: f64 = 0.000893;
    const A4: f64 = 0.003796;
    let m = 3f64.sqrt() / 2.0;

    let l = (m * phi.sin()).asin();
    let l2 = l * l;
    let l6 = l2 * l2 * l2;
    (
        lambda * l.cos() / (m * (A1 + 3.0 * A2 * l2 + l6 * (7.0 * A3 + 9.0 * A4 * l2))),
        l * (A1 + A2 * l2 + l6 * (A3 + A4 * l2)),
    )
}

fn natural_earth1(lambda: f64, phi: f64) -> (f64, f64) {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    (
        lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
        phi * (1.007226 + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
    )
}

/// A configured projection: rotation, raw projection, then scale/translate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub kind: ProjectionKind,
    pub rotation: SphereRotation,
    pub scale: f64,
    pub translate: Vec2,
}

impl Projection {
    pub fn new(kind: ProjectionKind) -> Self {
        Self {
            kind,
            rotation: SphereRotation::IDENTITY,
            scale: 150.0,
            translate: Vec2::new(480.0, 250.0),
        }
    }

    /// Scales and centers the projection so the whole sphere fills
    /// `[0, width] x [0, height]` without distortion.
    pub fn fit_size(mut self, width: f64, height: f64) -> Self {
        let Some(extent) = raw_extent(&self.kind.raw_outline()) else {
            return self;
        };
        let dx = extent.max[0] - extent.min[0];
        let dy = extent.max[1] - extent.min[1];
        if dx <= 0.0 || dy <= 0.0 {
            return self;
        }
        let k = (width / dx).min(height / dy);
        self.scale = k;
        self.translate = Vec2::new(
            width / 2.0 - k * (extent.min[0] + extent.max[0]) / 2.0,
            height / 2.0 + k * (extent.min[1] + extent.max[1]) / 2.0,
        );
        self
    }

    pub fn rotate(mut self, rotation: SphereRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Projects a single position without clipping.
    pub fn project(&self, p: LonLat) -> Option<Vec2> {
        self.project_rotated(self.rotation.apply(p))
    }

    fn project_rotated(&self, p: LonLat) -> Option<Vec2> {
        let (x, y) = self
            .kind
            .raw(p.lon_deg.to_radians(), p.lat_deg.to_radians())?;
        Some(Vec2::new(
            self.translate.x + self.scale * x,
            self.translate.y - self.scale * y,
        ))
    }

    /// Whether `p` survives clipping.
    pub fn is_visible(&self, p: LonLat) -> bool {
        match self.kind.clip() {
            Clip::Antimeridian => true,
            Clip::Circle { radius_deg } => {
                clip::within_cap(self.rotation.apply(p), radius_deg)
            }
        }
    }

    /// The clip boundary in view-box coordinates, closed.
    pub fn outline(&self) -> Vec<Vec2> {
        self.kind
            .raw_outline()
            .into_iter()
            .map(|(x, y)| {
                Vec2::new(
                    self.translate.x + self.scale * x,
                    self.translate.y - self.scale * y,
                )
            })
            .collect()
    }

    /// Rotates, clips and projects a polygon given as rings. Each returned
    /// ring is closed; a single input ring may produce several output rings
    /// when it is cut along the antimeridian.
    pub fn project_polygon(&self, rings: &[Vec<LonLat>]) -> Vec<Vec<Vec2>> {
        let mut out = Vec::new();
        for ring in rings {
            let rotated: Vec<LonLat> = ring.iter().map(|p| self.rotation.apply(*p)).collect();
            let pieces = match self.kind.clip() {
                Clip::Circle { radius_deg } => {
                    clip::clip_ring_to_cap(&rotated, radius_deg).into_iter().collect()
                }
                Clip::Antimeridian => clip::clip_ring_antimeridian(&rotated),
            };
            for piece in pieces {
                let projected: Vec<Vec2> = piece
                    .iter()
                    .filter_map(|p| self.project_rotated(*p))
                    .collect();
                if projected.len() >= 3 {
                    out.push(projected);
                }
            }
        }
        out
    }

    /// Rotates, clips and projects a line string into visible runs.
    pub fn project_line(&self, line: &[LonLat]) -> Vec<Vec<Vec2>> {
        let rotated: Vec<LonLat> = line.iter().map(|p| self.rotation.apply(*p)).collect();
        let runs = match self.kind.clip() {
            Clip::Circle { radius_deg } => clip::clip_line_to_cap(&rotated, radius_deg),
            Clip::Antimeridian => clip::clip_line_antimeridian(&rotated),
        };
        runs.into_iter()
            .map(|run| {
                run.iter()
                    .filter_map(|p| self.project_rotated(*p))
                    .collect::<Vec<_>>()
            })
            .filter(|run| run.len() >= 2)
            .collect()
    }
}

fn raw_extent(points: &[(f64, f64)]) -> Option<Aabb2> {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for &(x, y) in points {
        min[0] = min[0].min(x);
        min[1] = min[1].min(y);
        max[0] = max[0].max(x);
        max[1] = max[1].max(y);
    }
    (min[0].is_finite() && max[0].is_finite()).then(|| Aabb2::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::{PROJECTIONS, Projection, ProjectionKind};
    use crate::math::{LonLat, SphereRotation};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn ids_round_trip_through_table() {
        for (id, kind) in PROJECTIONS.iter() {
            assert_eq!(ProjectionKind::from_id(id), Some(*kind));
            assert_eq!(kind.id(), *id);
        }
        assert_eq!(ProjectionKind::from_id("geoorthographic"), None);
        assert_eq!(ProjectionKind::from_id("mercator"), None);
    }

    #[test]
    fn orthographic_fits_disk_into_height() {
        let p = Projection::new(ProjectionKind::Orthographic).fit_size(2000.0, 1000.0);
        assert_close(p.scale, 500.0, 1e-6);
        let c = p.project(LonLat::new(0.0, 0.0)).expect("center");
        assert_close(c.x, 1000.0, 1e-6);
        assert_close(c.y, 500.0, 1e-6);
    }

    #[test]
    fn equirectangular_fits_full_world() {
        let p = Projection::new(ProjectionKind::Equirectangular).fit_size(2000.0, 1000.0);
        let nw = p.project(LonLat::new(-180.0, 90.0)).expect("nw");
        let se = p.project(LonLat::new(180.0, -90.0)).expect("se");
        assert_close(nw.x, 0.0, 1e-6);
        assert_close(nw.y, 0.0, 1e-6);
        assert_close(se.x, 2000.0, 1e-6);
        assert_close(se.y, 1000.0, 1e-6);
    }

    #[test]
    fn mercator_world_is_square() {
        let p = Projection::new(ProjectionKind::Mercator).fit_size(1000.0, 1000.0);
        let top = p.project(LonLat::new(0.0, 89.0)).expect("clamped");
        assert_close(top.y, 0.0, 1e-3);
        let east = p.project(LonLat::new(180.0, 0.0)).expect("east");
        assert_close(east.x, 1000.0, 1e-6);
    }

    #[test]
    fn every_projection_fits_inside_its_view_box() {
        for (_, kind) in PROJECTIONS.iter() {
            let p = Projection::new(*kind).fit_size(1600.0, 1000.0);
            for v in p.outline() {
                assert!(v.x > -1e-6 && v.x < 1600.0 + 1e-6, "{kind:?} x {}", v.x);
                assert!(v.y > -1e-6 && v.y < 1000.0 + 1e-6, "{kind:?} y {}", v.y);
            }
        }
    }

    #[test]
    fn rotation_centers_target() {
        let target = LonLat::new(-60.0, 30.0);
        let p = Projection::new(ProjectionKind::Orthographic)
            .fit_size(1000.0, 1000.0)
            .rotate(SphereRotation::centering(target));
        let c = p.project(target).expect("visible");
        assert_close(c.x, 500.0, 1e-6);
        assert_close(c.y, 500.0, 1e-6);
        assert!(p.is_visible(target));
        assert!(!p.is_visible(LonLat::new(120.0, -30.0)));
    }

    #[test]
    fn antipode_has_no_azimuthal_equidistant_image() {
        assert!(ProjectionKind::AzimuthalEquidistant.raw(std::f64::consts::PI, 0.0).is_none());
        assert!(ProjectionKind::Gnomonic.raw(std::f64::consts::FRAC_PI_2, 0.0).is_none());
    }

    #[test]
    fn hemisphere_polygon_clips_to_single_ring() {
        let p = Projection::new(ProjectionKind::Orthographic).fit_size(1000.0, 1000.0);
        // Straddles the horizon at lon 90.
        let ring = vec![
            LonLat::new(80.0, -10.0),
            LonLat::new(80.0, 10.0),
            LonLat::new(100.0, 10.0),
            LonLat::new(100.0, -10.0),
            LonLat::new(80.0, -10.0),
        ];
        let rings = p.project_polygon(&[ring]);
        assert_eq!(rings.len(), 1);
        for v in &rings[0] {
            assert!(v.x <= 1000.0 + 1e-6);
        }
    }

    #[test]
    fn antimeridian_polygon_splits_in_two() {
        let p = Projection::new(ProjectionKind::Equirectangular).fit_size(2000.0, 1000.0);
        let ring = vec![
            LonLat::new(170.0, -10.0),
            LonLat::new(170.0, 10.0),
            LonLat::new(-170.0, 10.0),
            LonLat::new(-170.0, -10.0),
            LonLat::new(170.0, -10.0),
        ];
        let rings = p.project_polygon(&[ring]);
        assert_eq!(rings.len(), 2);
    }
}
