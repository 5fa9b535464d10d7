//! Basic SVG shapes: the `path`, `polygon`, `polyline`, `line`,
//! `rect`, `circle`, `ellipse` elements.
//!
//! Rectangles, circles, ellipses and lines become the emitter's primitives directly;
//! everything else becomes a path.

use cssparser::{Parser, Token};
use std::ops::Deref;

use crate::bbox::{ellipse_bbox, line_bbox, path_bbox, rect_bbox, BoundingBox};
use crate::drawing_ctx::{DrawingCtx, Frame};
use crate::emitter::{DrawingEmitter, Paint, PaintMode};
use crate::error::*;
use crate::length::*;
use crate::marker;
use crate::node::{ElementKind, Node, NodeBorrow};
use crate::parsers::{optional_comma, Parse};
use crate::path_builder::{CubicBezierCurve, Path, PathBuilder, PathSegment};
use crate::path_parser;
use crate::rect::Rect;
use crate::xml::Attributes;

/// Geometry of a shape, in its own user space.
pub enum Shape {
    Rect {
        rect: Rect,
        rx: f64,
        ry: f64,
    },

    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },

    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },

    /// A path, polyline or polygon.  `errors` are the problems found in the path data;
    /// the segments that could be recovered are still in `path`.
    Path {
        path: Path,
        errors: Vec<path_parser::ParseError>,
    },
}

impl Shape {
    /// Builds the geometry of a shape element from its attributes.
    ///
    /// Returns an error for missing or out-of-range sizes, in which case the element is
    /// not drawn.
    pub fn from_element(
        kind: ElementKind,
        attrs: &Attributes,
        params: &NormalizeParams,
    ) -> Result<Shape, Diagnostic> {
        let attr = Lengths {
            element: element_name(kind),
            attrs,
            params,
        };

        match kind {
            ElementKind::Rect => {
                let x = attr.optional::<Horizontal>("x")?.unwrap_or(0.0);
                let y = attr.optional::<Vertical>("y")?.unwrap_or(0.0);
                let w = attr.positive::<Horizontal>("width")?;
                let h = attr.positive::<Vertical>("height")?;

                // Negative radii are ignored, and a missing one takes the other's value
                let rx = attr.optional::<Horizontal>("rx")?.filter(|r| *r >= 0.0);
                let ry = attr.optional::<Vertical>("ry")?.filter(|r| *r >= 0.0);

                let (rx, ry) = match (rx, ry) {
                    (None, None) => (0.0, 0.0),
                    (Some(rx), None) => (rx, rx),
                    (None, Some(ry)) => (ry, ry),
                    (Some(rx), Some(ry)) => (rx, ry),
                };

                Ok(Shape::Rect {
                    rect: Rect::from_origin_size(x, y, w, h),
                    rx: rx.min(w / 2.0),
                    ry: ry.min(h / 2.0),
                })
            }

            ElementKind::Circle => {
                let cx = attr.optional::<Horizontal>("cx")?.unwrap_or(0.0);
                let cy = attr.optional::<Vertical>("cy")?.unwrap_or(0.0);
                let r = attr.positive::<Both>("r")?;

                Ok(Shape::Ellipse {
                    cx,
                    cy,
                    rx: r,
                    ry: r,
                })
            }

            ElementKind::Ellipse => {
                let cx = attr.optional::<Horizontal>("cx")?.unwrap_or(0.0);
                let cy = attr.optional::<Vertical>("cy")?.unwrap_or(0.0);

                let (rx, ry) = match (
                    attr.optional::<Horizontal>("rx")?,
                    attr.optional::<Vertical>("ry")?,
                ) {
                    (Some(rx), Some(ry)) => (rx, ry),
                    (Some(rx), None) => (rx, rx),
                    (None, Some(ry)) => (ry, ry),
                    (None, None) => return Err(Diagnostic::invalid_attribute("ellipse", "rx")),
                };

                if rx <= 0.0 {
                    return Err(Diagnostic::invalid_attribute("ellipse", "rx"));
                }

                if ry <= 0.0 {
                    return Err(Diagnostic::invalid_attribute("ellipse", "ry"));
                }

                Ok(Shape::Ellipse { cx, cy, rx, ry })
            }

            ElementKind::Line => Ok(Shape::Line {
                x1: attr.optional::<Horizontal>("x1")?.unwrap_or(0.0),
                y1: attr.optional::<Vertical>("y1")?.unwrap_or(0.0),
                x2: attr.optional::<Horizontal>("x2")?.unwrap_or(0.0),
                y2: attr.optional::<Vertical>("y2")?.unwrap_or(0.0),
            }),

            ElementKind::Polyline | ElementKind::Polygon => {
                let points = match attrs.parse::<Points>("points") {
                    Some(Ok(points)) => points,
                    _ => return Err(Diagnostic::invalid_attribute(attr.element, "points")),
                };

                Ok(Shape::Path {
                    path: make_poly(&points, kind == ElementKind::Polygon),
                    errors: Vec::new(),
                })
            }

            ElementKind::Path => {
                let mut builder = PathBuilder::default();

                let errors = match attrs.get_attribute("d") {
                    Some(d) => builder.parse(d).err().unwrap_or_default(),
                    None => Vec::new(),
                };

                Ok(Shape::Path {
                    path: builder.into_path(),
                    errors,
                })
            }

            _ => Err(Diagnostic::unsupported(&format!(
                "drawing <{}> as a shape",
                attr.element
            ))),
        }
    }

    /// The untransformed bounding box; for paths this is the box of the control
    /// polygon.  `None` for an empty path.
    pub fn bbox(&self) -> Option<BoundingBox> {
        match *self {
            Shape::Rect { ref rect, .. } => {
                Some(rect_bbox(rect.x0, rect.y0, rect.width(), rect.height()))
            }
            Shape::Ellipse { cx, cy, rx, ry } => Some(ellipse_bbox(cx, cy, rx, ry)),
            Shape::Line { x1, y1, x2, y2 } => Some(line_bbox(x1, y1, x2, y2)),
            Shape::Path { ref path, .. } => path_bbox(path),
        }
    }

    /// The path where markers are placed, for the shapes that take markers.
    fn marker_path(&self) -> Option<Path> {
        match *self {
            Shape::Line { x1, y1, x2, y2 } => {
                let mut builder = PathBuilder::default();
                builder.move_to(x1, y1);
                builder.line_to(x2, y2);
                Some(builder.into_path())
            }

            Shape::Path { ref path, .. } => Some(path.clone()),

            _ => None,
        }
    }
}

fn element_name(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Rect => "rect",
        ElementKind::Circle => "circle",
        ElementKind::Ellipse => "ellipse",
        ElementKind::Line => "line",
        ElementKind::Polyline => "polyline",
        ElementKind::Polygon => "polygon",
        ElementKind::Path => "path",
        _ => "unknown",
    }
}

/// Helper to resolve the length attributes of one element.
struct Lengths<'a> {
    element: &'static str,
    attrs: &'a Attributes,
    params: &'a NormalizeParams,
}

impl Lengths<'_> {
    /// A length that may be missing; an unparsable value is an error.
    fn optional<N: Normalize>(&self, name: &str) -> Result<Option<f64>, Diagnostic> {
        match self.attrs.parse::<Length<N>>(name) {
            None => Ok(None),
            Some(Ok(l)) => Ok(Some(l.to_user(self.params))),
            Some(Err(_)) => Err(Diagnostic::invalid_attribute(self.element, name)),
        }
    }

    /// A length that must be present and positive.
    fn positive<N: Normalize>(&self, name: &str) -> Result<f64, Diagnostic> {
        match self.optional::<N>(name)? {
            Some(v) if v > 0.0 => Ok(v),
            _ => Err(Diagnostic::invalid_attribute(self.element, name)),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Points(Vec<(f64, f64)>);

impl Deref for Points {
    type Target = [(f64, f64)];

    fn deref(&self) -> &[(f64, f64)] {
        &self.0
    }
}

// Parse a list-of-points as for polyline and polygon elements
// https://www.w3.org/TR/SVG/shapes.html#PointsBNF
impl Parse for Points {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Points, ParseError<'i>> {
        let mut v = Vec::new();

        loop {
            let x = f64::parse(parser)?;
            optional_comma(parser);
            let y = f64::parse(parser)?;

            v.push((x, y));

            if parser.is_exhausted() {
                break;
            }

            match parser.next_including_whitespace() {
                Ok(&Token::WhiteSpace(_)) => (),
                _ => optional_comma(parser),
            }
        }

        Ok(Points(v))
    }
}

fn make_poly(points: &Points, closed: bool) -> Path {
    let mut builder = PathBuilder::default();

    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            builder.move_to(x, y);
        } else {
            builder.line_to(x, y);
        }
    }

    if closed && !points.is_empty() {
        builder.close_path();
    }

    builder.into_path()
}

fn path_error_diagnostic(kind: ElementKind, error: &path_parser::ParseError) -> Diagnostic {
    if error.is_unsupported() {
        Diagnostic::unsupported("elliptical arc")
    } else {
        Diagnostic::MalformedPathData {
            element: element_name(kind).to_string(),
            message: error.to_string(),
        }
    }
}

/// Draws a shape element, and then its markers.
pub fn draw_shape(dc: &mut DrawingCtx<'_>, node: &Node, frame: &Frame) {
    let kind = node.borrow_element().kind();
    let shape = match Shape::from_element(kind, node.borrow_element().attributes(), &frame.params)
    {
        Ok(shape) => shape,
        Err(diagnostic) => {
            dc.session().report(diagnostic);
            return;
        }
    };

    if let Shape::Path { ref errors, .. } = shape {
        for e in errors {
            dc.session().report(path_error_diagnostic(kind, e));
        }
    }

    if frame.values.is_visible() {
        paint_shape(dc, &shape, frame);
    }

    if let Some(path) = shape.marker_path() {
        marker::draw_markers(dc, &path, frame);
    }
}

fn paint_shape(dc: &mut DrawingCtx<'_>, shape: &Shape, frame: &Frame) {
    if let Shape::Path { ref path, .. } = *shape {
        if path.is_empty() {
            return;
        }
    }

    let values = &frame.values;
    let params = &frame.params;
    let bbox = shape.bbox();

    // Lines have no interior
    let fill = match *shape {
        Shape::Line { .. } => None,
        _ => values.fill.resolve(
            dc,
            frame,
            values.color,
            values.fill_opacity,
            bbox.as_ref(),
        ),
    };

    let line_width = values.stroke_width(params);

    let stroke = if line_width > 0.0 {
        values.stroke.resolve(
            dc,
            frame,
            values.color,
            values.stroke_opacity,
            bbox.as_ref(),
        )
    } else {
        None
    };

    let Some(mode) = PaintMode::from_fill_stroke(fill.is_some(), stroke.is_some()) else {
        return;
    };

    dc.set_transform(&frame.transform);

    let emitter = dc.emitter();

    if let Some(ref paint) = fill {
        emitter.set_fill(paint);
    }

    if let Some(ref paint) = stroke {
        set_stroke(&mut *emitter, paint, frame, line_width);
    }

    match *shape {
        Shape::Rect { ref rect, rx, ry } => emitter.draw_rounded_rect(rect, rx, ry, mode),

        Shape::Ellipse { cx, cy, rx, ry } => emitter.draw_ellipse(cx, cy, rx, ry, mode),

        Shape::Line { x1, y1, x2, y2 } => emitter.draw_line(x1, y1, x2, y2),

        Shape::Path { ref path, .. } => {
            emit_path(&mut *emitter, path);
            emitter.paint_path(mode, values.fill_rule);
        }
    }
}

fn set_stroke(emitter: &mut dyn DrawingEmitter, paint: &Paint, frame: &Frame, line_width: f64) {
    let values = &frame.values;

    emitter.set_stroke(paint);
    emitter.set_line_width(line_width);
    emitter.set_line_cap(values.stroke_linecap);
    emitter.set_line_join(values.stroke_linejoin);
    emitter.set_miter_limit(values.stroke_miterlimit);

    let dashes = values.dashes(&frame.params);
    if !dashes.is_empty() {
        emitter.set_dash(&dashes, values.dash_offset(&frame.params));
    }
}

fn emit_path(emitter: &mut dyn DrawingEmitter, path: &Path) {
    emitter.begin_path();

    for segment in path.iter() {
        match segment {
            PathSegment::MoveTo(x, y) => emitter.move_to(x, y),
            PathSegment::LineTo(x, y) => emitter.line_to(x, y),
            PathSegment::CubicTo(CubicBezierCurve { pt1, pt2, to }) => {
                emitter.curve_to(pt1.0, pt1.1, pt2.0, pt2.1, to.0, to.1)
            }
            PathSegment::ClosePath => emitter.close_path(),
        }
    }
}
