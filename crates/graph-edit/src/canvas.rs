
/// Distance kept between node centres and the canvas border.
pub const DEFAULT_PADDING: f32 = 20.0;

/// A position in surface-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Measured pixel size of the render surface plus the placement padding.
///
/// Re-measured every frame, so a resize is picked up by the next placement
/// or drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self::new(800.0, 600.0, DEFAULT_PADDING)
    }
}

impl CanvasBounds {
    pub fn new(width: f32, height: f32, padding: f32) -> Self {
        Self {
            width,
            height,
            padding: padding.max(0.0),
        }
    }

    /// Clamp both axes into `[padding, dimension - padding]`.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            clamp_axis(p.x, self.width, self.padding),
            clamp_axis(p.y, self.height, self.padding),
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height).max(0.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.clamp(p) == p
    }
}

// A canvas narrower than twice the padding collapses onto `padding`.
fn clamp_axis(value: f32, dimension: f32, padding: f32) -> f32 {
    let upper = (dimension - padding).max(padding);
    value.clamp(padding, upper)
}
