//! The `marker` element, and geometry computations for markers.
//!
//! Markers are compiled into reusable objects like any other definition, and placed at
//! the vertices of paths, lines, polylines and polygons with the `marker-start`,
//! `marker-mid` and `marker-end` properties.

use std::f64::consts::PI;
use std::ops::Deref;

use cssparser::Parser;

use crate::angle::Angle;
use crate::aspect_ratio::AspectRatio;
use crate::bbox::BoundingBox;
use crate::drawing_ctx::{DrawingCtx, Frame};
use crate::error::*;
use crate::float_eq::ApproxEqUnits;
use crate::iri::{NodeId, IRI};
use crate::length::*;
use crate::node::{ElementKind, NodeBorrow};
use crate::parsers::Parse;
use crate::path_builder::{CubicBezierCurve, Path, PathSegment, SubPath};
use crate::rect::Rect;
use crate::session::Session;
use crate::transform::Transform;
use crate::viewbox::ViewBox;
use crate::xml::Attributes;

// markerUnits attribute: https://www.w3.org/TR/SVG/painting.html#MarkerElement
#[derive(Debug, Default, Copy, Clone, PartialEq)]
enum MarkerUnits {
    UserSpaceOnUse,
    #[default]
    StrokeWidth,
}

impl Parse for MarkerUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<MarkerUnits, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "userSpaceOnUse" => MarkerUnits::UserSpaceOnUse,
            "strokeWidth" => MarkerUnits::StrokeWidth,
        )?)
    }
}

// orient attribute: https://www.w3.org/TR/SVG/painting.html#MarkerElement
#[derive(Debug, Default, Copy, Clone, PartialEq)]
enum MarkerOrient {
    #[default]
    Auto,
    AutoStartReverse,
    Angle(Angle),
}

impl Parse for MarkerOrient {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<MarkerOrient, ParseError<'i>> {
        if parser
            .try_parse(|p| p.expect_ident_matching("auto"))
            .is_ok()
        {
            return Ok(MarkerOrient::Auto);
        }

        if parser
            .try_parse(|p| p.expect_ident_matching("auto-start-reverse"))
            .is_ok()
        {
            Ok(MarkerOrient::AutoStartReverse)
        } else {
            Angle::parse(parser).map(MarkerOrient::Angle)
        }
    }
}

pub struct Marker {
    units: MarkerUnits,
    ref_x: Length<Horizontal>,
    ref_y: Length<Vertical>,
    width: Length<Horizontal>,
    height: Length<Vertical>,
    orient: MarkerOrient,
    aspect: AspectRatio,
    vbox: Option<ViewBox>,
}

impl Marker {
    pub fn from_attributes(attrs: &Attributes, session: &Session) -> Marker {
        Marker {
            units: attrs.parse_valid("markerUnits", session).unwrap_or_default(),
            ref_x: attrs.parse_valid("refX", session).unwrap_or_default(),
            ref_y: attrs.parse_valid("refY", session).unwrap_or_default(),
            // SVG default of 3 for both
            width: attrs
                .parse_valid("markerWidth", session)
                .unwrap_or(Length::new(3.0, LengthUnit::Px)),
            height: attrs
                .parse_valid("markerHeight", session)
                .unwrap_or(Length::new(3.0, LengthUnit::Px)),
            orient: attrs.parse_valid("orient", session).unwrap_or_default(),
            aspect: attrs
                .parse_valid("preserveAspectRatio", session)
                .unwrap_or_default(),
            vbox: attrs.parse_valid("viewBox", session),
        }
    }

    /// Space of the marker's content.
    ///
    /// Returns the transform from the content to the marker's placement at a vertex,
    /// the box of the content area, and the parameters to resolve lengths in the
    /// content.  Returns `None` when the marker is disabled by a zero size or an
    /// empty viewBox.
    pub fn content_space(
        &self,
        params: &NormalizeParams,
    ) -> Option<(Transform, BoundingBox, NormalizeParams)> {
        let marker_width = self.width.to_user(params);
        let marker_height = self.height.to_user(params);

        // markerWidth or markerHeight set to 0 disables rendering of the element
        // https://www.w3.org/TR/SVG/painting.html#MarkerWidthAttribute
        if marker_width <= 0.0 || marker_height <= 0.0 {
            return None;
        }

        let viewport = Rect::from_size(marker_width, marker_height);
        let vbox_transform = self
            .aspect
            .viewport_to_viewbox_transform(self.vbox, &viewport)?;

        let bounds = self.vbox.map_or(viewport, |vbox| *vbox);
        let content_params = params.with_viewport(bounds.width(), bounds.height());

        // The reference point, in content coordinates, lands on the vertex
        let (ref_x, ref_y) = vbox_transform.transform_point(
            self.ref_x.to_user(&content_params),
            self.ref_y.to_user(&content_params),
        );

        let transform = vbox_transform.post_transform(&Transform::new_translate(-ref_x, -ref_y));

        Some((transform, BoundingBox::from_rect(&bounds), content_params))
    }

    /// Transform from the marker's placement space to the painted element's space.
    fn placement(&self, vertex: &Vertex, line_width: f64, world: &Transform) -> Transform {
        let rotation = match self.orient {
            MarkerOrient::Auto => vertex.angle,
            MarkerOrient::AutoStartReverse if vertex.kind == MarkerType::Start => {
                Angle::new(vertex.angle.radians() + PI)
            }
            MarkerOrient::AutoStartReverse => vertex.angle,
            MarkerOrient::Angle(a) => a,
        };

        let transform = world
            .pre_translate(vertex.x, vertex.y)
            .pre_rotate(rotation);

        match self.units {
            MarkerUnits::StrokeWidth => transform.pre_scale(line_width, line_width),
            MarkerUnits::UserSpaceOnUse => transform,
        }
    }
}

// Machinery to figure out marker orientations
#[derive(Debug, PartialEq)]
enum Segment {
    Degenerate {
        // A single lone point
        x: f64,
        y: f64,
    },

    LineOrCurve {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
        x4: f64,
        y4: f64,
    },
}

impl Segment {
    fn degenerate(x: f64, y: f64) -> Segment {
        Segment::Degenerate { x, y }
    }

    #[allow(clippy::too_many_arguments)]
    fn curve(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) -> Segment {
        Segment::LineOrCurve {
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
            x4,
            y4,
        }
    }

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::curve(x1, y1, x2, y2, x1, y1, x2, y2)
    }

    fn start(&self) -> (f64, f64) {
        match *self {
            Segment::Degenerate { x, y } => (x, y),
            Segment::LineOrCurve { x1, y1, .. } => (x1, y1),
        }
    }

    fn end(&self) -> (f64, f64) {
        match *self {
            Segment::Degenerate { x, y } => (x, y),
            Segment::LineOrCurve { x4, y4, .. } => (x4, y4),
        }
    }

    // If the segment has directionality, returns two vectors (v1x, v1y, v2x, v2y); otherwise,
    // returns None.  The vectors are the tangents at the beginning and at the end of the segment,
    // respectively.  A segment does not have directionality if it is degenerate (i.e. a single
    // point) or a zero-length segment, i.e. where all four control points are coincident (the first
    // and last control points may coincide, but the others may define a loop - thus nonzero length)
    fn get_directionalities(&self) -> Option<(f64, f64, f64, f64)> {
        match *self {
            Segment::Degenerate { .. } => None,

            Segment::LineOrCurve {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
                x4,
                y4,
            } => {
                let coincide_1_and_2 = points_equal(x1, y1, x2, y2);
                let coincide_1_and_3 = points_equal(x1, y1, x3, y3);
                let coincide_1_and_4 = points_equal(x1, y1, x4, y4);
                let coincide_2_and_3 = points_equal(x2, y2, x3, y3);
                let coincide_2_and_4 = points_equal(x2, y2, x4, y4);
                let coincide_3_and_4 = points_equal(x3, y3, x4, y4);

                if coincide_1_and_2 && coincide_1_and_3 && coincide_1_and_4 {
                    None
                } else if coincide_1_and_2 && coincide_1_and_3 {
                    Some((x4 - x1, y4 - y1, x4 - x3, y4 - y3))
                } else if coincide_1_and_2 && coincide_3_and_4 {
                    Some((x4 - x1, y4 - y1, x4 - x1, y4 - y1))
                } else if coincide_2_and_3 && coincide_2_and_4 {
                    Some((x2 - x1, y2 - y1, x4 - x1, y4 - y1))
                } else if coincide_1_and_2 {
                    Some((x3 - x1, y3 - y1, x4 - x3, y4 - y3))
                } else if coincide_3_and_4 {
                    Some((x2 - x1, y2 - y1, x4 - x2, y4 - y2))
                } else {
                    Some((x2 - x1, y2 - y1, x4 - x3, y4 - y3))
                }
            }
        }
    }
}

fn points_equal(x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    x1.approx_eq_units(x2) && y1.approx_eq_units(y2)
}

/// The segments of a single subpath.
///
/// A subpath with just a MoveTo becomes a single degenerate segment; otherwise every
/// segment is a line or a curve, including the line that closes a closed subpath.
#[derive(Debug, PartialEq)]
struct Segments(Vec<Segment>);

impl Deref for Segments {
    type Target = [Segment];

    fn deref(&self) -> &[Segment] {
        &self.0
    }
}

// This converts a subpath into a vector of curveto-like segments.
//
// We have the following points:
//       P1 = (x1, y1)
//       P2 = (x2, y2)
//       P3 = (x3, y3)
//       P4 = (x4, y4)
//
// The start and end points are P1 and P4, respectively.
// The tangent at the start point is given by the vector (P2 - P1).
// The tangent at the end point is given by the vector (P4 - P3).
// The tangents also work if the segment refers to a lineto (they will
// both just point in the same direction).
impl<'a> From<&SubPath<'a>> for Segments {
    fn from(subpath: &SubPath<'a>) -> Segments {
        let (start_x, start_y) = subpath.origin();
        let (mut cur_x, mut cur_y) = (start_x, start_y);

        let mut segments = Vec::new();

        for segment in subpath.iter_segments() {
            let (last_x, last_y) = (cur_x, cur_y);

            match segment {
                PathSegment::MoveTo(..) => (),

                PathSegment::LineTo(x, y) => {
                    cur_x = x;
                    cur_y = y;

                    segments.push(Segment::line(last_x, last_y, cur_x, cur_y));
                }

                PathSegment::CubicTo(CubicBezierCurve {
                    pt1: (x2, y2),
                    pt2: (x3, y3),
                    to,
                }) => {
                    cur_x = to.0;
                    cur_y = to.1;

                    segments.push(Segment::curve(last_x, last_y, x2, y2, x3, y3, cur_x, cur_y));
                }

                PathSegment::ClosePath => {
                    cur_x = start_x;
                    cur_y = start_y;

                    segments.push(Segment::line(last_x, last_y, cur_x, cur_y));
                }
            }
        }

        if segments.is_empty() {
            segments.push(Segment::degenerate(start_x, start_y));
        }

        Segments(segments)
    }
}

// See SVG 1.1 implementation notes at http://www.w3.org/TR/SVG/implnote.html#PathElementImplementationNotes
// Certain line-capping and line-joining situations and markers
// require that a path segment have directionality at its start and
// end points. Zero-length path segments have no directionality. In
// these cases, the following algorithm is used to establish
// directionality:  to determine the directionality of the start
// point of a zero-length path segment, go backwards in the path
// data within the current subpath until you find a
// segment which has directionality at its end point (e.g., a path
// segment with non-zero length) and use its ending direction;
// otherwise, temporarily consider the start point to lack
// directionality. Similarly, to determine the directionality of the
// end point of a zero-length path segment, go forwards in the path
// data within the current subpath until you find a
// segment which has directionality at its start point (e.g., a path
// segment with non-zero length) and use its starting direction;
// otherwise, temporarily consider the end point to lack
// directionality.
impl Segments {
    fn find_incoming_directionality_backwards(&self, start_index: usize) -> Option<Angle> {
        self[..=start_index]
            .iter()
            .rev()
            .find_map(|segment| segment.get_directionalities())
            .map(|(_, _, v2x, v2y)| Angle::from_vector(v2x, v2y))
    }

    fn find_outgoing_directionality_forwards(&self, start_index: usize) -> Option<Angle> {
        self[start_index..]
            .iter()
            .find_map(|segment| segment.get_directionalities())
            .map(|(v1x, v1y, _, _)| Angle::from_vector(v1x, v1y))
    }
}

// From SVG's marker-start, marker-mid, marker-end properties
#[derive(Debug, Copy, Clone, PartialEq)]
enum MarkerType {
    Start,
    Middle,
    End,
}

/// A place where a marker goes.
#[derive(Debug, PartialEq)]
struct Vertex {
    kind: MarkerType,
    x: f64,
    y: f64,
    angle: Angle,
}

/// Computes the vertices of a path where markers are placed.
///
/// The first vertex of the path gets the start marker.  The last vertex of every
/// subpath gets the end marker, oriented along the subpath's final segment.  All the
/// other vertices get the mid marker, oriented halfway between the incoming and outgoing
/// directions.
fn path_vertices(path: &Path) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    for subpath in path.iter_subpath() {
        let segments = Segments::from(&subpath);
        let first_in_path = vertices.is_empty();

        let start_kind = if first_in_path {
            MarkerType::Start
        } else {
            MarkerType::Middle
        };

        if let [Segment::Degenerate { x, y }] = *segments {
            // A lone point is where the subpath both starts and ends
            let zero = Angle::new(0.0);
            vertices.push(Vertex {
                kind: start_kind,
                x,
                y,
                angle: zero,
            });
            vertices.push(Vertex {
                kind: MarkerType::End,
                x,
                y,
                angle: zero,
            });
            continue;
        }

        for (i, segment) in segments.iter().enumerate() {
            let (x, y) = segment.start();

            let (kind, angle) = if i == 0 {
                let outgoing = segments.find_outgoing_directionality_forwards(0);
                (start_kind, outgoing.unwrap_or(Angle::new(0.0)))
            } else {
                let incoming = segments.find_incoming_directionality_backwards(i - 1);
                let outgoing = segments.find_outgoing_directionality_forwards(i);

                let angle = match (incoming, outgoing) {
                    (Some(incoming), Some(outgoing)) => incoming.bisect(outgoing),
                    (Some(incoming), None) => incoming,
                    (None, Some(outgoing)) => outgoing,
                    (None, None) => Angle::new(0.0),
                };

                (MarkerType::Middle, angle)
            };

            vertices.push(Vertex { kind, x, y, angle });
        }

        let last = segments.len() - 1;
        let (x, y) = segments[last].end();
        let angle = segments
            .find_incoming_directionality_backwards(last)
            .unwrap_or(Angle::new(0.0));

        vertices.push(Vertex {
            kind: MarkerType::End,
            x,
            y,
            angle,
        });
    }

    vertices
}

/// Places the markers of a painted element at the vertices of its path.
pub fn draw_markers(dc: &mut DrawingCtx<'_>, path: &Path, frame: &Frame) {
    let values = &frame.values;

    if let (IRI::None, IRI::None, IRI::None) =
        (&values.marker_start, &values.marker_mid, &values.marker_end)
    {
        return;
    }

    let line_width = values.stroke_width(&frame.params);

    if line_width.approx_eq_units(0.0) {
        return;
    }

    for vertex in path_vertices(path) {
        let iri = match vertex.kind {
            MarkerType::Start => &values.marker_start,
            MarkerType::Middle => &values.marker_mid,
            MarkerType::End => &values.marker_end,
        };

        if let Some(node_id) = iri.get() {
            draw_marker(dc, node_id, &vertex, line_width, frame);
        }
    }
}

fn draw_marker(
    dc: &mut DrawingCtx<'_>,
    node_id: &NodeId,
    vertex: &Vertex,
    line_width: f64,
    frame: &Frame,
) {
    let def = match node_id.internal().and_then(|id| dc.lookup(frame.scope, id)) {
        Some(def) if def.kind() == ElementKind::Marker => def,

        _ => {
            dc.session()
                .report(Diagnostic::unresolved(&node_id.to_string()));
            return;
        }
    };

    let marker = Marker::from_attributes(def.node.borrow_element().attributes(), dc.session());
    let placement = marker.placement(vertex, line_width, &frame.transform);

    dc.place_reference(&def, frame.depth, |_| Some(placement));
}



#[cfg(test)]
mod space_tests {
    use super::*;

    fn marker(attrs: &[(&str, &str)]) -> Marker {
        Marker::from_attributes(&Attributes::from_strs(attrs), &Session::new_for_test_suite())
    }

    fn params() -> NormalizeParams {
        NormalizeParams::new(100.0, 100.0, 12.0, 96.0)
    }

    #[test]
    fn default_marker_space() {
        let (transform, bbox, _) = marker(&[]).content_space(&params()).unwrap();
        assert!(transform.is_identity());
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn reference_point_lands_on_vertex() {
        let (transform, bbox, _) = marker(&[
            ("viewBox", "0 0 10 10"),
            ("markerWidth", "5"),
            ("markerHeight", "5"),
            ("refX", "5"),
            ("refY", "5"),
        ])
        .content_space(&params())
        .unwrap();

        assert_eq!(transform.transform_point(5.0, 5.0), (0.0, 0.0));
        assert_eq!(transform.transform_point(10.0, 10.0), (2.5, 2.5));
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn zero_size_disables_marker() {
        assert!(marker(&[("markerWidth", "0")])
            .content_space(&params())
            .is_none());
    }

    #[test]
    fn placement_rotates_and_scales() {
        let vertex = Vertex {
            kind: MarkerType::Start,
            x: 10.0,
            y: 20.0,
            angle: Angle::from_degrees(90.0),
        };

        let t = marker(&[]).placement(&vertex, 2.0, &Transform::identity());
        let (x, y) = t.transform_point(1.0, 0.0);
        assert!(x.approx_eq_units(10.0));
        assert!(y.approx_eq_units(22.0));

        let t = marker(&[("orient", "0"), ("markerUnits", "userSpaceOnUse")]).placement(
            &vertex,
            2.0,
            &Transform::identity(),
        );
        assert_eq!(t.transform_point(1.0, 0.0), (11.0, 20.0));
    }
}
