use crate::layer::LayerKind;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub visible: bool,
    /// `None` renders with `fill: none`.
    pub fill: Option<[f32; 4]>,
    pub stroke: Option<[f32; 4]>,
    pub stroke_width: f32,
}

impl LayerStyle {
    pub const fn new(
        visible: bool,
        fill: Option<[f32; 4]>,
        stroke: Option<[f32; 4]>,
        stroke_width: f32,
    ) -> Self {
        Self {
            visible,
            fill,
            stroke,
            stroke_width,
        }
    }

    pub fn to_css_declarations(&self) -> String {
        if !self.visible {
            return "display:none".to_string();
        }
        let fill = self.fill.map(rgba_css).unwrap_or_else(|| "none".to_string());
        let stroke = self.stroke.map(rgba_css).unwrap_or_else(|| "none".to_string());
        format!(
            "fill:{fill};stroke:{stroke};stroke-width:{}",
            self.stroke_width
        )
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            visible: true,
            fill: None,
            stroke: Some([0.0, 0.0, 0.0, 1.0]),
            stroke_width: 1.0,
        }
    }
}

/// Styles for every map layer plus the pentagon highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbology {
    pub outline: LayerStyle,
    pub base_grid: LayerStyle,
    pub world: LayerStyle,
    pub areas: LayerStyle,
    pub pentagons: LayerStyle,
    pub bounding_circle: LayerStyle,
}

impl Default for Symbology {
    fn default() -> Self {
        Self {
            outline: LayerStyle::new(true, Some([0.94, 0.97, 1.0, 1.0]), Some([0.2, 0.25, 0.33, 1.0]), 1.5),
            base_grid: LayerStyle::new(true, None, Some([0.58, 0.64, 0.72, 0.6]), 0.5),
            world: LayerStyle::new(true, Some([0.80, 0.84, 0.80, 1.0]), Some([0.45, 0.5, 0.45, 1.0]), 0.5),
            areas: LayerStyle::new(true, Some([0.93, 0.27, 0.27, 0.7]), Some([0.6, 0.1, 0.1, 1.0]), 1.0),
            pentagons: LayerStyle::new(true, Some([0.96, 0.62, 0.04, 0.8]), Some([0.6, 0.35, 0.0, 1.0]), 1.0),
            bounding_circle: LayerStyle::new(true, None, Some([0.15, 0.39, 0.92, 1.0]), 2.0),
        }
    }
}

impl Symbology {
    pub fn style(&self, kind: LayerKind) -> &LayerStyle {
        match kind {
            LayerKind::Outline => &self.outline,
            LayerKind::BaseGrid => &self.base_grid,
            LayerKind::World => &self.world,
            LayerKind::Areas => &self.areas,
            LayerKind::BoundingCircle => &self.bounding_circle,
        }
    }

    /// A stylesheet scoped to `scope` (a CSS selector for the map root).
    pub fn to_css(&self, scope: &str) -> String {
        let mut css = String::new();
        for kind in LayerKind::ALL {
            css.push_str(&format!(
                "{scope} .{} path{{{}}}\n",
                kind.class_name(),
                self.style(kind).to_css_declarations()
            ));
        }
        css.push_str(&format!(
            "{scope} .areas path.pentagon{{{}}}\n",
            self.pentagons.to_css_declarations()
        ));
        css
    }
}

pub fn rgba_css(c: [f32; 4]) -> String {
    let r = (c[0].clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (c[1].clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (c[2].clamp(0.0, 1.0) * 255.0).round() as u32;
    let a = c[3].clamp(0.0, 1.0);
    format!("rgba({r},{g},{b},{a})")
}
