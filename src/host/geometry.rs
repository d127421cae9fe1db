use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn left(self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn top(self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn area(self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Overlap of two rectangles, including degenerate (edge-touching)
    /// overlaps. `None` when they are disjoint.
    #[must_use]
    pub fn intersection(self, other: Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Visible area of the document and its vertical scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl ViewportMetrics {
    #[must_use]
    pub const fn new(width: f64, height: f64, scroll_y: f64) -> Self {
        Self {
            width,
            height,
            scroll_y,
        }
    }

    /// The viewport in its own coordinate space.
    #[must_use]
    pub fn client_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}
