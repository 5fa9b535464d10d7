//! Untransformed bounding boxes of elements.
//!
//! These are used to size reusable objects and to map `objectBoundingBox` gradients
//! onto shapes.  They are conservative: a path's box is the box of its control polygon,
//! not the tight box of its curves, and a transformed box is the axis-aligned box of the
//! four transformed corners.

use crate::path_builder::Path;
use crate::rect::Rect;
use crate::transform::Transform;

/// An axis-aligned box; `width` and `height` are never negative.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Creates a box from an origin and a size; negative sizes are normalized.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> BoundingBox {
        BoundingBox::from_rect(&Rect::from_origin_size(x, y, width, height))
    }

    pub fn from_rect(r: &Rect) -> BoundingBox {
        let r = Rect::new(r.x0.min(r.x1), r.y0.min(r.y1), r.x0.max(r.x1), r.y0.max(r.y1));

        BoundingBox {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::from_rect(&self.to_rect().union(&other.to_rect()))
    }

    /// Maps the four corners through `transform` and returns the box around them.
    pub fn transform(&self, transform: &Transform) -> BoundingBox {
        BoundingBox::from_rect(&transform.transform_rect(&self.to_rect()))
    }

    pub fn is_empty(&self) -> bool {
        self.to_rect().is_empty()
    }

    /// The transform that maps the unit square onto this box, as used by
    /// `objectBoundingBox` units.
    ///
    /// Returns `None` for an empty box, since its content could not be seen anyway.
    pub fn unit_square_transform(&self) -> Option<Transform> {
        if self.is_empty() {
            None
        } else {
            Some(Transform::new_unchecked(
                self.width,
                0.0,
                0.0,
                self.height,
                self.x,
                self.y,
            ))
        }
    }
}

/// Combines two optional boxes.
pub fn union_opt(a: Option<BoundingBox>, b: Option<BoundingBox>) -> Option<BoundingBox> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Box of a `<rect>`; corner rounding does not change it.
pub fn rect_bbox(x: f64, y: f64, width: f64, height: f64) -> BoundingBox {
    BoundingBox::new(x, y, width, height)
}

/// Box of a `<circle>` or `<ellipse>`.
pub fn ellipse_bbox(cx: f64, cy: f64, rx: f64, ry: f64) -> BoundingBox {
    BoundingBox::from_rect(&Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
}

pub fn line_bbox(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
    BoundingBox::from_rect(&Rect::new(x1, y1, x2, y2))
}

/// Box of a path's control polygon: every endpoint and every control point.
pub fn path_bbox(path: &Path) -> Option<BoundingBox> {
    path.control_polygon_extents()
        .map(|r| BoundingBox::from_rect(&r))
}
