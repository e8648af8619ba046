use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Four corners locating a decoded code within a frame, in the order
/// top-left, top-right, bottom-right, bottom-left.
///
/// Used for visual feedback only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BoundingQuad {
    pub corners: [Point; 4],
}

impl BoundingQuad {
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned box enclosing the quad as `(x, y, width, height)`.
    pub fn bounding_box(&self) -> (i32, i32, i32, i32) {
        let min_x = self.corners.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = self.corners.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = self.corners.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = self.corners.iter().map(|p| p.y).max().unwrap_or(0);
        (min_x, min_y, max_x - min_x, max_y - min_y)
    }
}
