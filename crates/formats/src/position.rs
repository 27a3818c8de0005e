//! GeoJSON positions as sphere points.

use foundation::math::LonLat;
use geojson::Position;

/// `[lon, lat, ...]` as a point; positions with fewer than two ordinates
/// have none.
pub fn lon_lat(position: &Position) -> Option<LonLat> {
    match position.as_slice() {
        [lon, lat, ..] => Some(LonLat::new(*lon, *lat)),
        _ => None,
    }
}

/// A ring or line string, dropping malformed positions.
pub fn lon_lats(positions: &[Position]) -> Vec<LonLat> {
    positions.iter().filter_map(lon_lat).collect()
}

/// Polygon rings, outer ring first.
pub fn polygon_lon_lats(rings: &[Vec<Position>]) -> Vec<Vec<LonLat>> {
    rings.iter().map(|ring| lon_lats(ring)).collect()
}

#[cfg(test)]
mod tests {
    use super::{lon_lat, lon_lats};
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    #[test]
    fn elevation_is_ignored_and_short_positions_dropped() {
        assert_eq!(lon_lat(&vec![12.5, -3.0, 100.0]), Some(LonLat::new(12.5, -3.0)));
        assert_eq!(lon_lat(&vec![12.5]), None);
        assert_eq!(
            lon_lats(&[vec![1.0, 2.0], vec![], vec![3.0, 4.0]]),
            vec![LonLat::new(1.0, 2.0), LonLat::new(3.0, 4.0)]
        );
    }
}
