/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Geometric center of a `width` x `height` pixel grid.
    ///
    /// Pixel centers sit on integer coordinates, so the center of a
    /// 5-pixel row is 2.0.
    pub fn grid_center(width: usize, height: usize) -> Self {
        Self {
            x: (width as f64 - 1.0) / 2.0,
            y: (height as f64 - 1.0) / 2.0,
        }
    }
}
