//! SVG path data from geographic geometry.

use formats::{Feature, Geometry, GeometryValue, lon_lat, lon_lats, polygon_lon_lats};
use foundation::math::{LonLat, Projection, Vec2};

/// Radius, in view-box units, of the circle drawn for point geometries.
pub const POINT_RADIUS: f64 = 4.5;

/// Turns geometry into SVG `d` attributes through a projection.
///
/// Coordinates are rounded to two decimals. Geometry that is clipped away
/// entirely yields `None`.
#[derive(Debug, Copy, Clone)]
pub struct PathGenerator<'a> {
    projection: &'a Projection,
}

impl<'a> PathGenerator<'a> {
    pub fn new(projection: &'a Projection) -> Self {
        Self { projection }
    }

    pub fn projection(&self) -> &Projection {
        self.projection
    }

    /// The clip boundary of the projection, i.e. the whole sphere.
    pub fn sphere(&self) -> String {
        let mut d = String::new();
        push_ring(&mut d, &self.projection.outline());
        d
    }

    pub fn polygon(&self, rings: &[Vec<LonLat>]) -> Option<String> {
        let mut d = String::new();
        for ring in self.projection.project_polygon(rings) {
            push_ring(&mut d, &ring);
        }
        non_empty(d)
    }

    pub fn line(&self, line: &[LonLat]) -> Option<String> {
        let mut d = String::new();
        for run in self.projection.project_line(line) {
            push_run(&mut d, &run);
        }
        non_empty(d)
    }

    pub fn point(&self, p: LonLat) -> Option<String> {
        if !self.projection.is_visible(p) {
            return None;
        }
        let mut d = String::new();
        push_point(&mut d, self.projection.project(p)?);
        Some(d)
    }

    pub fn geometry(&self, geometry: &Geometry) -> Option<String> {
        self.value(&geometry.value)
    }

    fn value(&self, value: &GeometryValue) -> Option<String> {
        match value {
            GeometryValue::Point(p) => self.point(lon_lat(p)?),
            GeometryValue::MultiPoint(points) => non_empty(
                points
                    .iter()
                    .filter_map(|p| lon_lat(p).and_then(|p| self.point(p)))
                    .collect(),
            ),
            GeometryValue::LineString(line) => self.line(&lon_lats(line)),
            GeometryValue::MultiLineString(lines) => non_empty(
                lines
                    .iter()
                    .filter_map(|l| self.line(&lon_lats(l)))
                    .collect(),
            ),
            GeometryValue::Polygon(rings) => self.polygon(&polygon_lon_lats(rings)),
            GeometryValue::MultiPolygon(polygons) => non_empty(
                polygons
                    .iter()
                    .filter_map(|p| self.polygon(&polygon_lon_lats(p)))
                    .collect(),
            ),
            GeometryValue::GeometryCollection(members) => {
                non_empty(members.iter().filter_map(|g| self.geometry(g)).collect())
            }
        }
    }

    pub fn feature(&self, feature: &Feature) -> Option<String> {
        feature.geometry.as_ref().and_then(|g| self.geometry(g))
    }
}

fn non_empty(d: String) -> Option<String> {
    (!d.is_empty()).then_some(d)
}

fn push_ring(d: &mut String, ring: &[Vec2]) {
    // Rings come closed; `Z` replaces the repeated vertex.
    let open = match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    };
    if open.len() < 3 {
        return;
    }
    push_run(d, open);
    d.push('Z');
}

fn push_run(d: &mut String, run: &[Vec2]) {
    for (i, p) in run.iter().enumerate() {
        d.push(if i == 0 { 'M' } else { 'L' });
        push_xy(d, *p);
    }
}

fn push_point(d: &mut String, p: Vec2) {
    let r = fmt_num(POINT_RADIUS);
    let dia = fmt_num(2.0 * POINT_RADIUS);
    d.push('M');
    push_xy(d, p);
    d.push_str(&format!(
        "m0,{r}a{r},{r} 0 1,1 0,-{dia}a{r},{r} 0 1,1 0,{dia}z"
    ));
}

fn push_xy(d: &mut String, p: Vec2) {
    d.push_str(&fmt_num(p.x));
    d.push(',');
    d.push_str(&fmt_num(p.y));
}

/// Formats with at most two decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    let r = (v * 100.0).round() / 100.0;
    // Avoid "-0".
    let r = if r == 0.0 { 0.0 } else { r };
    format!("{r}")
}
