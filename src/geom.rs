// SPDX-License-Identifier: Apache-2.0

/// Axis-aligned rectangle in integer database units (DBU).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl Rect {
    pub fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Rect {
        Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Returns the width of the rectangle.
    pub fn dx(&self) -> i64 {
        self.x_max - self.x_min
    }

    /// Returns the height of the rectangle.
    pub fn dy(&self) -> i64 {
        self.y_max - self.y_min
    }

    /// Returns the midpoint, truncated toward zero like all DBU math.
    pub fn center(&self) -> (i64, i64) {
        (
            (self.x_min + self.x_max) / 2,
            (self.y_min + self.y_max) / 2,
        )
    }

    /// Returns a copy of this rectangle moved so that its center is at
    /// `(x, y)`, preserving width and height.
    pub fn centered_at(&self, x: i64, y: i64) -> Rect {
        let x_min = x - self.dx() / 2;
        let y_min = y - self.dy() / 2;
        Rect {
            x_min,
            y_min,
            x_max: x_min + self.dx(),
            y_max: y_min + self.dy(),
        }
    }
}
