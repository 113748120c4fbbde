use serde::{Deserialize, Serialize};

use crate::layout_engine::LayoutError;

/// An axis-aligned rectangle in integer terminal cells.
///
/// Rectangles handed to collaborators are always at least one cell in each
/// dimension; `new` rejects anything smaller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl LayoutRect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Result<Self, LayoutError> {
        if width < 1 || height < 1 {
            return Err(LayoutError::InvalidRect { width, height });
        }
        Ok(Self { x, y, width, height })
    }

    pub fn area(self) -> u32 { u32::from(self.width) * u32::from(self.height) }

    pub fn max_x(self) -> u16 { self.x + self.width }

    pub fn max_y(self) -> u16 { self.y + self.height }

    pub fn contains(self, other: LayoutRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }
}
