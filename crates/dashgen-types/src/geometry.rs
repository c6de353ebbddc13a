use serde::{Deserialize, Serialize};
use std::fmt;

/// Widget placement in device pixel space.
///
/// `x`/`y` are the top-left corner; `width`/`height` are expected to be
/// positive. The compiler does not validate this, the editor does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center_x(&self) -> i32 {
        self.x + (self.width / 2) as i32
    }

    pub fn center_y(&self) -> i32 {
        self.y + (self.height / 2) as i32
    }

    /// Shrink by `px` on every side, never below zero size.
    pub fn inset(self, px: u32) -> Geometry {
        let shrink = px.saturating_mul(2);
        Geometry::new(
            self.x + px as i32,
            self.y + px as i32,
            self.width.saturating_sub(shrink),
            self.height.saturating_sub(shrink),
        )
    }

    /// Split horizontally into `n` equal columns. The last column absorbs
    /// the remainder so the union is exactly `self`.
    pub fn columns(self, n: u32) -> Vec<Geometry> {
        if n == 0 {
            return Vec::new();
        }
        let base = self.width / n;
        (0..n)
            .map(|i| {
                let width = if i + 1 == n {
                    self.width - base * (n - 1)
                } else {
                    base
                };
                Geometry::new(self.x + (base * i) as i32, self.y, width, self.height)
            })
            .collect()
    }

    /// Bounding box covering both rectangles.
    pub fn union(self, other: Geometry) -> Geometry {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Geometry::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}
