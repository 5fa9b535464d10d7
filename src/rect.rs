//! Types for rectangles.

use float_cmp::approx_eq;

use crate::float_eq::ApproxEqUnits;

// Use our own min() and max() that are acceptable for floating point

fn min(x: f64, y: f64) -> f64 {
    if x <= y {
        x
    } else {
        y
    }
}

fn max(x: f64, y: f64) -> f64 {
    if x >= y {
        x
    } else {
        y
    }
}

/// An axis-aligned rectangle stored as its two extreme corners.
///
/// `x0 <= x1` and `y0 <= y1` hold for every rectangle built through
/// [`Rect::from_points`] or [`Rect::union`]; width and height are never negative.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    #[inline]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    pub fn from_size(w: f64, h: f64) -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            x1: w,
            y1: h,
        }
    }

    /// Builds a rectangle from an origin and a size, normalizing negative sizes.
    pub fn from_origin_size(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::from_points(&[(x, y), (x + w, y + h)]).unwrap_or_default()
    }

    /// Smallest rectangle that contains all the points, or `None` if there are none.
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (&(x, y), rest) = points.split_first()?;

        Some(rest.iter().fold(Rect::new(x, y, x, y), |r, &(x, y)| {
            r.union(&Rect::new(x, y, x, y))
        }))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn size(&self) -> (f64, f64) {
        (self.width(), self.height())
    }

    #[inline]
    pub fn translate(&self, by: (f64, f64)) -> Self {
        Self {
            x0: self.x0 + by.0,
            y0: self.y0 + by.1,
            x1: self.x1 + by.0,
            y1: self.y1 + by.1,
        }
    }

    #[inline]
    pub fn union(&self, rect: &Self) -> Self {
        Self {
            x0: min(self.x0, rect.x0),
            y0: min(self.y0, rect.y0),
            x1: max(self.x1, rect.x1),
            y1: max(self.y1, rect.y1),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width().approx_eq_units(0.0) || self.height().approx_eq_units(0.0)
    }

    /// The four corners, clockwise from the origin.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x0, self.y0),
            (self.x1, self.y0),
            (self.x1, self.y1),
            (self.x0, self.y1),
        ]
    }

    pub fn approx_eq(&self, other: &Self) -> bool {
        approx_eq!(f64, self.x0, other.x0, epsilon = 0.0001)
            && approx_eq!(f64, self.y0, other.y0, epsilon = 0.0001)
            && approx_eq!(f64, self.x1, other.x1, epsilon = 0.0001)
            && approx_eq!(f64, self.y1, other.y1, epsilon = 0.0001)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_negative_size() {
        let r = Rect::from_origin_size(10.0, 10.0, -5.0, -20.0);
        assert_eq!(r, Rect::new(5.0, -10.0, 10.0, 10.0));
        assert_eq!(r.size(), (5.0, 20.0));
    }

    #[test]
    fn from_points_takes_extremes() {
        assert_eq!(Rect::from_points(&[]), None);
        assert_eq!(
            Rect::from_points(&[(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0)]),
            Some(Rect::new(-2.0, -1.0, 4.0, 5.0))
        );
    }

    #[test]
    fn union_and_translate() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(2.0, -1.0, 3.0, 0.5);
        assert_eq!(a.union(&b), Rect::new(0.0, -1.0, 3.0, 1.0));
        assert_eq!(a.translate((1.0, 2.0)), Rect::new(1.0, 2.0, 2.0, 3.0));
    }

    #[test]
    fn empty_rect() {
        assert!(Rect::new(1.0, 1.0, 1.0, 5.0).is_empty());
        assert!(!Rect::from_size(1.0, 1.0).is_empty());
    }
}
