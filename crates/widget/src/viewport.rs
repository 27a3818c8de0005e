/// Height of the SVG coordinate space; the width follows the aspect ratio.
pub const VIEW_BOX_HEIGHT: f64 = 1000.0;

/// Pixel size of the render surface as reported by the host layout.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// `None` for sizes that cannot produce an aspect ratio (zero, negative or
    /// not finite); the element then keeps waiting for a usable measurement.
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        (usable(width) && usable(height)).then_some(Self { width, height })
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// `[1000 * width / height, 1000]`.
    pub fn view_box(&self) -> [f64; 2] {
        [VIEW_BOX_HEIGHT * self.aspect(), VIEW_BOX_HEIGHT]
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn view_box_keeps_height_at_1000() {
        let vp = Viewport::new(800.0, 400.0).expect("usable");
        assert_eq!(vp.view_box(), [2000.0, 1000.0]);
        let vp = Viewport::new(300.0, 600.0).expect("usable");
        assert_eq!(vp.view_box(), [500.0, 1000.0]);
    }

    #[test]
    fn unusable_sizes_are_rejected() {
        assert_eq!(Viewport::new(0.0, 400.0), None);
        assert_eq!(Viewport::new(800.0, 0.0), None);
        assert_eq!(Viewport::new(f64::NAN, 10.0), None);
        assert_eq!(Viewport::new(-5.0, 10.0), None);
    }
}
