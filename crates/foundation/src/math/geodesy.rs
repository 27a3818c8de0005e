//! Spherical primitives over longitude/latitude rings.
//!
//! Everything here treats the earth as the unit sphere: good enough for
//! placing shapes on a small-scale world map, and it keeps centroid and
//! bounds results independent of the projection used to draw them.

use super::Vec3;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub const fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn to_unit(self) -> Vec3 {
        let (sin_lat, cos_lat) = self.lat_deg.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.lon_deg.to_radians().sin_cos();
        Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Inverse of [`LonLat::to_unit`]. The input does not need to be normalized.
    pub fn from_unit(v: Vec3) -> Self {
        let n = v.normalize();
        Self::new(
            n.y.atan2(n.x).to_degrees(),
            n.z.clamp(-1.0, 1.0).asin().to_degrees(),
        )
    }
}

/// Wraps a longitude into `[-180, 180)`.
pub fn wrap_lon_deg(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Angular distance between two positions, in degrees.
pub fn angular_distance_deg(a: LonLat, b: LonLat) -> f64 {
    let (ua, ub) = (a.to_unit(), b.to_unit());
    ua.cross(ub).norm().atan2(ua.dot(ub)).to_degrees()
}

/// Longitude/latitude bounding box.
///
/// When the box crosses the antimeridian `west > east`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Longitude extent measured eastward from `west` to `east`.
    pub fn lon_span(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.east + 360.0 - self.west
        } else {
            self.east - self.west
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }
}

/// Area-weighted centroid of a set of rings on the sphere.
///
/// Each ring is fanned into chord triangles; the weighted sum of triangle
/// centroids is projected back onto the sphere. Returns `None` when there is
/// nothing to average (no rings, or all rings degenerate to a zero vector).
pub fn spherical_centroid<'a, I>(rings: I) -> Option<LonLat>
where
    I: IntoIterator<Item = &'a [LonLat]>,
{
    let mut weighted = Vec3::ZERO;
    let mut vertex_sum = Vec3::ZERO;
    let mut total_weight = 0.0;

    for ring in rings {
        let pts: Vec<Vec3> = open_ring(ring).iter().map(|p| p.to_unit()).collect();
        for p in &pts {
            vertex_sum += *p;
        }
        if pts.len() < 3 {
            continue;
        }
        let origin = pts[0];
        for pair in pts[1..].windows(2) {
            let (b, c) = (pair[0], pair[1]);
            let w = 0.5 * (b - origin).cross(c - origin).norm();
            weighted += (origin + b + c).scale(w / 3.0);
            total_weight += w;
        }
    }

    let sum = if total_weight > 1e-15 { weighted } else { vertex_sum };
    if sum.norm() < 1e-12 {
        return None;
    }
    Some(LonLat::from_unit(sum))
}

/// Longitude/latitude bounds of a set of rings, antimeridian aware.
///
/// Edges are treated as great-circle arcs, so an edge that bulges toward a
/// pole extends the latitude range past its endpoints. A ring that winds
/// around a pole extends the box to that pole and spans all longitudes.
pub fn spherical_bounds<'a, I>(rings: I) -> Option<GeoBounds>
where
    I: IntoIterator<Item = &'a [LonLat]>,
{
    let mut lons: Vec<f64> = Vec::new();
    let mut south = f64::INFINITY;
    let mut north = f64::NEG_INFINITY;
    let mut full_lon = false;

    for ring in rings {
        let pts = open_ring(ring);
        if pts.is_empty() {
            continue;
        }
        for (i, p) in pts.iter().enumerate() {
            lons.push(wrap_lon_deg(p.lon_deg));
            south = south.min(p.lat_deg);
            north = north.max(p.lat_deg);

            let q = pts[(i + 1) % pts.len()];
            if let Some((lo, hi)) = arc_lat_extrema(*p, q) {
                south = south.min(lo);
                north = north.max(hi);
            }
        }

        if pts.len() >= 3 {
            let winding = lon_winding_deg(pts);
            if winding.abs() > 180.0 {
                full_lon = true;
                let mean_lat = pts.iter().map(|p| p.lat_deg).sum::<f64>() / pts.len() as f64;
                if mean_lat >= 0.0 {
                    north = 90.0;
                } else {
                    south = -90.0;
                }
            }
        }
    }

    if lons.is_empty() {
        return None;
    }
    if full_lon {
        return Some(GeoBounds { west: -180.0, south, east: 180.0, north });
    }

    lons.sort_by(f64::total_cmp);
    lons.dedup();

    // The box is the complement of the widest empty longitude gap.
    let mut widest_gap = lons[0] + 360.0 - lons[lons.len() - 1];
    let mut west = lons[0];
    let mut east = lons[lons.len() - 1];
    for pair in lons.windows(2) {
        let gap = pair[1] - pair[0];
        if gap > widest_gap {
            widest_gap = gap;
            west = pair[1];
            east = pair[0];
        }
    }

    Some(GeoBounds { west, south, east, north })
}

/// Closed small circle around `center`, sampled every `step_deg` degrees.
///
/// Vertices run clockwise as seen from outside the sphere (north, east,
/// south, west), matching the winding used for every other polygon drawn.
pub fn small_circle(center: LonLat, radius_deg: f64, step_deg: f64) -> Vec<LonLat> {
    let c = center.to_unit();
    let up = Vec3::new(0.0, 0.0, 1.0);
    let east = {
        let e = up.cross(c);
        if e.norm() < 1e-12 { Vec3::new(0.0, 1.0, 0.0) } else { e.normalize() }
    };
    let north = c.cross(east);

    let (sin_r, cos_r) = radius_deg.to_radians().sin_cos();
    let steps = (360.0 / step_deg.max(1e-3)).ceil() as usize;

    let mut ring = Vec::with_capacity(steps + 1);
    for i in 0..steps {
        let t = (i as f64 * 360.0 / steps as f64).to_radians();
        let dir = north.scale(t.cos()) + east.scale(t.sin());
        ring.push(LonLat::from_unit(c.scale(cos_r) + dir.scale(sin_r)));
    }
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// Drops a trailing vertex that repeats the first one.
pub fn open_ring(ring: &[LonLat]) -> &[LonLat] {
    match (ring.first(), ring.last()) {
        (Some(a), Some(b)) if ring.len() > 1 && a == b => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Net longitude travelled around a ring, in degrees. Close to ±360 when the
/// ring encloses a pole, close to 0 otherwise.
pub fn lon_winding_deg(ring: &[LonLat]) -> f64 {
    let pts = open_ring(ring);
    let mut total = 0.0;
    for (i, p) in pts.iter().enumerate() {
        let q = pts[(i + 1) % pts.len()];
        total += wrap_lon_deg(q.lon_deg - p.lon_deg);
    }
    total
}

/// Latitude extrema reached strictly inside the great-circle arc `a -> b`.
fn arc_lat_extrema(a: LonLat, b: LonLat) -> Option<(f64, f64)> {
    let (ua, ub) = (a.to_unit(), b.to_unit());
    let n = ua.cross(ub);
    if n.norm() < 1e-12 {
        return None;
    }
    let n = n.normalize();
    let z = Vec3::new(0.0, 0.0, 1.0);
    let top = (z - n.scale(z.dot(n))).normalize();
    if top.norm() < 1e-12 {
        return None;
    }

    let within = |p: Vec3| ua.cross(p).dot(n) > 0.0 && p.cross(ub).dot(n) > 0.0;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    if within(top) {
        hi = LonLat::from_unit(top).lat_deg;
    }
    let bottom = top.scale(-1.0);
    if within(bottom) {
        lo = LonLat::from_unit(bottom).lat_deg;
    }
    if lo.is_finite() || hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}
