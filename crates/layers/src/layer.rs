/// The drawable groups of the map, in paint order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Outline,
    BaseGrid,
    World,
    Areas,
    BoundingCircle,
}

impl LayerKind {
    pub const ALL: [LayerKind; 5] = [
        LayerKind::Outline,
        LayerKind::BaseGrid,
        LayerKind::World,
        LayerKind::Areas,
        LayerKind::BoundingCircle,
    ];

    /// Class name of the SVG group holding this layer.
    pub fn class_name(self) -> &'static str {
        match self {
            LayerKind::Outline => "outline",
            LayerKind::BaseGrid => "base-grid",
            LayerKind::World => "world",
            LayerKind::Areas => "areas",
            LayerKind::BoundingCircle => "bounding-circle",
        }
    }
}
