/// Render frame metadata.
///
/// One frame is one render pass of the element. The index orders lifecycle
/// events relative to the renders that caused them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
}

impl Frame {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}
