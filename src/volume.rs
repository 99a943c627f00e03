//! Stack of `n×n` planes, one per analysed width.
use crate::image::ImageF64;

#[derive(Clone, Debug, PartialEq)]
pub struct WidthVolume {
    pub width0: usize,
    pub planes: Vec<ImageF64>,
}

impl WidthVolume {
    pub fn new(width0: usize, planes: Vec<ImageF64>) -> Self {
        Self { width0, planes }
    }

    /// Width analysed by plane `level`.
    pub fn width_of(&self, level: usize) -> usize {
        self.width0 + level
    }

    /// Plane for `width`, if it was analysed.
    pub fn plane(&self, width: usize) -> Option<&ImageF64> {
        width
            .checked_sub(self.width0)
            .and_then(|level| self.planes.get(level))
    }
}
