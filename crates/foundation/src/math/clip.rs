//! Clipping of rotated geometry before projection.
//!
//! Inputs are positions that have already been rotated into the projection's
//! frame, so the projection center is always `(0, 0)` and the cut meridian is
//! always `±180`.

use super::geodesy::{open_ring, wrap_lon_deg};
use super::{LonLat, Vec3};

/// Sampling step along a clip boundary (degrees).
const ARC_STEP_DEG: f64 = 2.0;

pub fn within_cap(p: LonLat, radius_deg: f64) -> bool {
    p.to_unit().x >= radius_deg.to_radians().cos()
}

enum CapVertex {
    Inside(Vec3),
    Exit(Vec3),
    Entry(Vec3),
}

/// Clips a ring to the spherical cap of `radius_deg` around the center.
///
/// Sutherland–Hodgman against the cap's plane; where the ring leaves the cap
/// and re-enters it, the gap is filled with points along the cap boundary.
/// Returns `None` when no vertex is visible.
pub fn clip_ring_to_cap(ring: &[LonLat], radius_deg: f64) -> Option<Vec<LonLat>> {
    let pts: Vec<Vec3> = open_ring(ring).iter().map(|p| p.to_unit()).collect();
    if pts.len() < 3 {
        return None;
    }
    let (sin_r, cos_r) = radius_deg.to_radians().sin_cos();
    let inside: Vec<bool> = pts.iter().map(|p| p.x >= cos_r).collect();

    if inside.iter().all(|v| *v) {
        return Some(closed(open_ring(ring).to_vec()));
    }
    if !inside.iter().any(|v| *v) {
        return None;
    }

    let n = pts.len();
    let mut verts: Vec<CapVertex> = Vec::with_capacity(n + 4);
    for i in 0..n {
        let j = (i + n - 1) % n;
        if inside[j] != inside[i] {
            let q = cap_crossing(pts[j], pts[i], cos_r, sin_r);
            verts.push(if inside[j] {
                CapVertex::Exit(q)
            } else {
                CapVertex::Entry(q)
            });
        }
        if inside[i] {
            verts.push(CapVertex::Inside(pts[i]));
        }
    }

    let mut out = Vec::with_capacity(verts.len() * 2);
    for (i, v) in verts.iter().enumerate() {
        match v {
            CapVertex::Inside(p) | CapVertex::Entry(p) => out.push(LonLat::from_unit(*p)),
            CapVertex::Exit(p) => {
                out.push(LonLat::from_unit(*p));
                if let CapVertex::Entry(q) = &verts[(i + 1) % verts.len()] {
                    out.extend(
                        cap_arc(*p, *q, cos_r, sin_r)
                            .into_iter()
                            .map(LonLat::from_unit),
                    );
                }
            }
        }
    }
    Some(closed(out))
}

/// Splits a line into the runs that lie inside the cap.
pub fn clip_line_to_cap(line: &[LonLat], radius_deg: f64) -> Vec<Vec<LonLat>> {
    let (sin_r, cos_r) = radius_deg.to_radians().sin_cos();
    let mut runs = Vec::new();
    let mut current: Vec<LonLat> = Vec::new();
    let mut prev: Option<(Vec3, bool)> = None;

    for p in line {
        let u = p.to_unit();
        let is_in = u.x >= cos_r;
        if let Some((pu, p_in)) = prev {
            if p_in != is_in {
                let q = LonLat::from_unit(cap_crossing(pu, u, cos_r, sin_r));
                current.push(q);
                if p_in {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
        if is_in {
            current.push(*p);
        }
        prev = Some((u, is_in));
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|r| r.len() >= 2);
    runs
}

/// Point where the chord `a -> b` crosses the cap plane, pushed out onto the
/// boundary circle.
fn cap_crossing(a: Vec3, b: Vec3, cos_r: f64, sin_r: f64) -> Vec3 {
    let denom = b.x - a.x;
    let t = if denom.abs() > 1e-15 {
        ((cos_r - a.x) / denom).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let q = a + (b - a).scale(t);
    let yz = (q.y * q.y + q.z * q.z).sqrt();
    if yz < 1e-15 {
        return Vec3::new(cos_r, sin_r, 0.0);
    }
    Vec3::new(cos_r, sin_r * q.y / yz, sin_r * q.z / yz)
}

/// Intermediate boundary points walking the short way from `a` to `b`.
fn cap_arc(a: Vec3, b: Vec3, cos_r: f64, sin_r: f64) -> Vec<Vec3> {
    let ta = a.z.atan2(a.y);
    let tb = b.z.atan2(b.y);
    let delta = wrap_lon_deg((tb - ta).to_degrees()).to_radians();
    let steps = (delta.abs().to_degrees() / ARC_STEP_DEG).ceil() as usize;
    (1..steps)
        .map(|k| {
            let t = ta + delta * k as f64 / steps as f64;
            Vec3::new(cos_r, sin_r * t.cos(), sin_r * t.sin())
        })
        .collect()
}

/// Cuts a ring along the antimeridian.
///
/// The ring is unwrapped so longitudes are continuous, then clipped against
/// each 360° strip it touches and shifted back. A ring that winds around a
/// pole is first closed along that pole.
pub fn clip_ring_antimeridian(ring: &[LonLat]) -> Vec<Vec<LonLat>> {
    let pts = open_ring(ring);
    if pts.len() < 3 {
        return Vec::new();
    }

    let mut unwrapped: Vec<(f64, f64)> = Vec::with_capacity(pts.len() + 3);
    unwrapped.push((pts[0].lon_deg, pts[0].lat_deg));
    for pair in pts.windows(2) {
        let (prev_lon, _) = unwrapped[unwrapped.len() - 1];
        let lon = prev_lon + wrap_lon_deg(pair[1].lon_deg - pair[0].lon_deg);
        unwrapped.push((lon, pair[1].lat_deg));
    }

    let first = pts[0];
    let last_lon = unwrapped[unwrapped.len() - 1].0;
    let last_raw = pts[pts.len() - 1].lon_deg;
    let winding = last_lon + wrap_lon_deg(first.lon_deg - last_raw) - first.lon_deg;
    if winding.abs() > 180.0 {
        let mean_lat = pts.iter().map(|p| p.lat_deg).sum::<f64>() / pts.len() as f64;
        let pole = if mean_lat >= 0.0 { 90.0 } else { -90.0 };
        let end = first.lon_deg + winding;
        unwrapped.push((end, first.lat_deg));
        unwrapped.push((end, pole));
        unwrapped.push((first.lon_deg, pole));
    }

    let min_lon = unwrapped.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_lon = unwrapped.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if min_lon >= -180.0 && max_lon <= 180.0 {
        return vec![closed(
            unwrapped.into_iter().map(|(x, y)| LonLat::new(x, y)).collect(),
        )];
    }

    let k_min = ((min_lon + 180.0) / 360.0).floor() as i64;
    let k_max = ((max_lon - 1e-9 + 180.0) / 360.0).floor() as i64;
    let mut out = Vec::new();
    for k in k_min..=k_max {
        let shift = 360.0 * k as f64;
        let mut poly: Vec<(f64, f64)> = unwrapped.iter().map(|&(x, y)| (x - shift, y)).collect();
        poly = clip_against_meridian(poly, |lon| lon <= 180.0, 180.0);
        poly = clip_against_meridian(poly, |lon| lon >= -180.0, -180.0);
        if poly.len() >= 3 {
            out.push(closed(poly.into_iter().map(|(x, y)| LonLat::new(x, y)).collect()));
        }
    }
    out
}

/// Splits a line wherever it jumps across the antimeridian.
pub fn clip_line_antimeridian(line: &[LonLat]) -> Vec<Vec<LonLat>> {
    let mut runs = Vec::new();
    let mut current: Vec<LonLat> = Vec::new();
    for p in line {
        if let Some(prev) = current.last().copied() {
            if (p.lon_deg - prev.lon_deg).abs() > 180.0 {
                let next = prev.lon_deg + wrap_lon_deg(p.lon_deg - prev.lon_deg);
                let bound = if next > 180.0 { 180.0 } else { -180.0 };
                let denom = next - prev.lon_deg;
                let t = if denom.abs() > 1e-12 {
                    (bound - prev.lon_deg) / denom
                } else {
                    0.0
                };
                let lat = prev.lat_deg + (p.lat_deg - prev.lat_deg) * t;
                current.push(LonLat::new(bound, lat));
                runs.push(std::mem::take(&mut current));
                current.push(LonLat::new(-bound, lat));
            }
        }
        current.push(*p);
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|r| r.len() >= 2);
    runs
}

/// Sutherland–Hodgman against a single meridian.
fn clip_against_meridian(
    poly: Vec<(f64, f64)>,
    keep_if: impl Fn(f64) -> bool,
    bound_lon: f64,
) -> Vec<(f64, f64)> {
    let Some(&last) = poly.last() else {
        return poly;
    };
    let mut out = Vec::with_capacity(poly.len() + 2);
    let mut prev = last;
    let mut prev_in = keep_if(prev.0);
    for &cur in &poly {
        let cur_in = keep_if(cur.0);
        if prev_in != cur_in {
            let (lon0, lat0) = prev;
            let (lon1, lat1) = cur;
            let denom = lon1 - lon0;
            if denom.abs() > 1e-12 {
                let t = (bound_lon - lon0) / denom;
                out.push((bound_lon, lat0 + (lat1 - lat0) * t));
            } else {
                out.push((bound_lon, cur.1));
            }
        }
        if cur_in {
            out.push(cur);
        }
        prev = cur;
        prev_in = cur_in;
    }
    out
}

fn closed(mut ring: Vec<LonLat>) -> Vec<LonLat> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::{
        clip_line_antimeridian, clip_line_to_cap, clip_ring_antimeridian, clip_ring_to_cap,
        within_cap,
    };
    use crate::math::LonLat;
    use crate::math::geodesy::angular_distance_deg;

    fn rect(w: f64, s: f64, e: f64, n: f64) -> Vec<LonLat> {
        vec![
            LonLat::new(w, s),
            LonLat::new(w, n),
            LonLat::new(e, n),
            LonLat::new(e, s),
            LonLat::new(w, s),
        ]
    }

    #[test]
    fn ring_fully_inside_cap_is_untouched() {
        let ring = rect(-5.0, -5.0, 5.0, 5.0);
        assert_eq!(clip_ring_to_cap(&ring, 90.0), Some(ring));
    }

    #[test]
    fn ring_fully_outside_cap_disappears() {
        let ring = rect(150.0, -5.0, 160.0, 5.0);
        assert_eq!(clip_ring_to_cap(&ring, 90.0), None);
    }

    #[test]
    fn straddling_ring_stays_within_cap() {
        let ring = rect(70.0, -30.0, 120.0, 30.0);
        let clipped = clip_ring_to_cap(&ring, 90.0).expect("partially visible");
        let origin = LonLat::new(0.0, 0.0);
        for p in &clipped {
            assert!(angular_distance_deg(origin, *p) <= 90.0 + 1e-9);
        }
        assert_eq!(clipped.first(), clipped.last());
        // The boundary between the exit and the entry got filled in.
        assert!(clipped.len() > 6);
    }

    #[test]
    fn cap_membership() {
        assert!(within_cap(LonLat::new(89.0, 0.0), 90.0));
        assert!(!within_cap(LonLat::new(91.0, 0.0), 90.0));
        assert!(within_cap(LonLat::new(0.0, 59.0), 60.0));
    }

    #[test]
    fn line_leaving_cap_is_cut_at_boundary() {
        let line = vec![LonLat::new(0.0, 0.0), LonLat::new(60.0, 0.0), LonLat::new(120.0, 0.0)];
        let runs = clip_line_to_cap(&line, 90.0);
        assert_eq!(runs.len(), 1);
        let end = runs[0].last().copied().expect("end");
        assert!((end.lon_deg - 90.0).abs() < 1e-6);
    }

    #[test]
    fn ring_inside_world_is_single_piece() {
        let ring = rect(-10.0, -10.0, 10.0, 10.0);
        assert_eq!(clip_ring_antimeridian(&ring), vec![ring]);
    }

    #[test]
    fn ring_across_antimeridian_is_split() {
        let ring = rect(170.0, -10.0, -170.0, 10.0);
        let pieces = clip_ring_antimeridian(&ring);
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            for p in piece {
                assert!(p.lon_deg >= -180.0 && p.lon_deg <= 180.0);
            }
        }
    }

    #[test]
    fn polar_ring_is_closed_along_pole() {
        let ring: Vec<LonLat> = (0..12)
            .map(|i| LonLat::new(-165.0 + 30.0 * i as f64, 70.0))
            .collect();
        let pieces = clip_ring_antimeridian(&ring);
        assert!(!pieces.is_empty());
        assert!(pieces.iter().flatten().any(|p| p.lat_deg == 90.0));
    }

    #[test]
    fn line_across_antimeridian_is_split() {
        let line = vec![LonLat::new(170.0, 0.0), LonLat::new(-170.0, 10.0)];
        let runs = clip_line_antimeridian(&line);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].last().map(|p| p.lon_deg), Some(180.0));
        assert_eq!(runs[1].first().map(|p| p.lon_deg), Some(-180.0));
        assert!((runs[0][1].lat_deg - 5.0).abs() < 1e-9);
    }
}
