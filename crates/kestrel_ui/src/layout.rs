//! Screen-space geometry for widgets.

/// A rectangle in screen coordinates (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns true if the point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Cuts a strip of `fraction` of the width off the left edge.
    ///
    /// Returns `(strip, remainder)`.
    #[must_use]
    pub fn split_left(&self, fraction: f32) -> (Self, Self) {
        let width = self.width * fraction;
        (
            Self::new(self.x, self.y, width, self.height),
            Self::new(self.x + width, self.y, self.width - width, self.height),
        )
    }

    /// Cuts a strip of `fraction` of the width off the right edge.
    ///
    /// Returns `(strip, remainder)`.
    #[must_use]
    pub fn split_right(&self, fraction: f32) -> (Self, Self) {
        let width = self.width * fraction;
        (
            Self::new(self.right() - width, self.y, width, self.height),
            Self::new(self.x, self.y, self.width - width, self.height),
        )
    }

    /// Cuts a strip of `fraction` of the height off the top edge.
    ///
    /// Returns `(strip, remainder)`.
    #[must_use]
    pub fn split_top(&self, fraction: f32) -> (Self, Self) {
        let height = self.height * fraction;
        (
            Self::new(self.x, self.y, self.width, height),
            Self::new(self.x, self.y + height, self.width, self.height - height),
        )
    }

    /// Cuts a strip of `fraction` of the height off the bottom edge.
    ///
    /// Returns `(strip, remainder)`.
    #[must_use]
    pub fn split_bottom(&self, fraction: f32) -> (Self, Self) {
        let height = self.height * fraction;
        (
            Self::new(self.x, self.bottom() - height, self.width, height),
            Self::new(self.x, self.y, self.width, self.height - height),
        )
    }

    /// Divides the rectangle into `count` equal cells along `direction`.
    #[must_use]
    pub fn divide(&self, count: usize, direction: Direction) -> Vec<Self> {
        if count == 0 {
            return Vec::new();
        }

        #[allow(clippy::cast_precision_loss)]
        let n = count as f32;
        (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let i = i as f32;
                match direction {
                    Direction::Horizontal => {
                        let width = self.width / n;
                        Self::new(self.x + width * i, self.y, width, self.height)
                    }
                    Direction::Vertical => {
                        let height = self.height / n;
                        Self::new(self.x, self.y + height * i, self.width, height)
                    }
                }
            })
            .collect()
    }
}

/// Layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

/// Screen rectangle occupied by a widget entity.
///
/// Written by layout-owning systems (e.g. docking) and read for hit tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds(pub Rect);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);

        assert!(rect.contains(50.0, 30.0));
        assert!(!rect.contains(5.0, 30.0));
        assert!(!rect.contains(50.0, 80.0));
        // Right and bottom edges are exclusive.
        assert!(!rect.contains(110.0, 30.0));
        assert_eq!(rect.center(), (60.0, 45.0));
    }

    #[test]
    fn test_splits() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);

        let (left, rest) = rect.split_left(0.25);
        assert_eq!(left, Rect::new(0.0, 0.0, 50.0, 100.0));
        assert_eq!(rest, Rect::new(50.0, 0.0, 150.0, 100.0));

        let (right, rest) = rect.split_right(0.25);
        assert_eq!(right, Rect::new(150.0, 0.0, 50.0, 100.0));
        assert_eq!(rest.width, 150.0);

        let (top, rest) = rect.split_top(0.5);
        assert_eq!(top, Rect::new(0.0, 0.0, 200.0, 50.0));
        assert_eq!(rest.y, 50.0);

        let (bottom, _) = rect.split_bottom(0.5);
        assert_eq!(bottom, Rect::new(0.0, 50.0, 200.0, 50.0));
    }

    #[test]
    fn test_divide() {
        let rect = Rect::new(0.0, 0.0, 90.0, 60.0);

        let columns = rect.divide(3, Direction::Horizontal);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1], Rect::new(30.0, 0.0, 30.0, 60.0));

        let rows = rect.divide(2, Direction::Vertical);
        assert_eq!(rows[1], Rect::new(0.0, 30.0, 90.0, 30.0));

        assert!(rect.divide(0, Direction::Vertical).is_empty());
    }
}
