//! H3 cell layer: identifier parsing, boundary rings and the base grid.

use std::collections::HashSet;
use std::sync::LazyLock;

use foundation::math::LonLat;
use h3o::CellIndex;
use tracing::debug;

/// A cell boundary as a drawable polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPolygon {
    pub cell: CellIndex,
    pub pentagon: bool,
    /// Closed ring, clockwise (the reverse of the H3 boundary order).
    pub ring: Vec<LonLat>,
}

impl CellPolygon {
    pub fn new(cell: CellIndex) -> Self {
        Self {
            cell,
            pentagon: cell.is_pentagon(),
            ring: cell_ring(cell),
        }
    }

    pub fn id(&self) -> String {
        self.cell.to_string()
    }
}

/// Parses an H3 cell identifier in its hexadecimal string form.
pub fn parse_cell(text: &str) -> Result<CellIndex, h3o::error::InvalidCellIndex> {
    text.parse::<CellIndex>()
}

/// Boundary of `cell` reversed and closed.
pub fn cell_ring(cell: CellIndex) -> Vec<LonLat> {
    let boundary = cell.boundary();
    let mut ring: Vec<LonLat> = boundary
        .iter()
        .rev()
        .map(|ll| LonLat::new(ll.lng(), ll.lat()))
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// Drops repeated cells, keeping the first occurrence of each.
pub fn unique_cells(cells: &[CellIndex]) -> Vec<CellIndex> {
    let mut seen = HashSet::with_capacity(cells.len());
    cells.iter().copied().filter(|c| seen.insert(*c)).collect()
}

pub fn cell_polygons(cells: &[CellIndex]) -> Vec<CellPolygon> {
    cells.iter().copied().map(CellPolygon::new).collect()
}

static BASE_GRID: LazyLock<Vec<CellPolygon>> = LazyLock::new(|| {
    let grid: Vec<CellPolygon> = CellIndex::base_cells().map(CellPolygon::new).collect();
    debug!(cells = grid.len(), "built resolution 0 grid");
    grid
});

/// All 122 resolution 0 cells.
pub fn base_grid() -> &'static [CellPolygon] {
    &BASE_GRID
}

#[cfg(test)]
mod tests {
    use super::{base_grid, cell_ring, parse_cell, unique_cells};
    use pretty_assertions::assert_eq;

    const SF: &str = "8928308280fffff";
    const PENTAGON: &str = "8009fffffffffff";

    #[test]
    fn parses_valid_and_rejects_malformed_ids() {
        let cell = parse_cell(SF).expect("valid");
        assert_eq!(cell.to_string(), SF);
        assert_eq!(u8::from(cell.resolution()), 9);
        assert!(parse_cell("not-a-cell").is_err());
        assert!(parse_cell("").is_err());
        assert!(parse_cell("ffffffffffffffff").is_err());
    }

    #[test]
    fn ring_is_closed_and_reversed() {
        let cell = parse_cell(SF).expect("valid");
        let ring = cell_ring(cell);
        let boundary = cell.boundary();
        assert_eq!(ring.len(), boundary.len() + 1);
        assert_eq!(ring.first(), ring.last());
        let last = boundary.iter().last().expect("vertices");
        assert_eq!(ring[0].lon_deg, last.lng());
        assert_eq!(ring[0].lat_deg, last.lat());
    }

    #[test]
    fn pentagons_are_flagged() {
        let pentagon = parse_cell(PENTAGON).expect("valid");
        assert!(pentagon.is_pentagon());
        let polygon = super::CellPolygon::new(pentagon);
        assert!(polygon.pentagon);
        assert_eq!(polygon.ring.len(), 6);
    }

    #[test]
    fn dedupe_keeps_first_seen_order() {
        let a = parse_cell(SF).expect("valid");
        let b = parse_cell(PENTAGON).expect("valid");
        assert_eq!(unique_cells(&[a, b, a]), vec![a, b]);
        assert_eq!(unique_cells(&[]), vec![]);
    }

    #[test]
    fn base_grid_has_all_resolution_zero_cells() {
        let grid = base_grid();
        assert_eq!(grid.len(), 122);
        assert_eq!(grid.iter().filter(|c| c.pentagon).count(), 12);
    }
}
