//! Text elements: `text` and `tspan`.
//!
//! Glyph layout is not done here.  Text is split into spans of characters with the
//! same properties, a [`TextMeasurer`] provided by the caller measures each span, and
//! the spans are emitted one by one with
//! [`DrawingEmitter::draw_text`](crate::DrawingEmitter::draw_text).

use std::cell::RefCell;

use itertools::Itertools;

use crate::bbox::BoundingBox;
use crate::drawing_ctx::{DrawingCtx, Frame};
use crate::emitter::{FontDescription, TextMeasurer, TextMetrics};
use crate::error::Diagnostic;
use crate::length::*;
use crate::node::{ElementKind, Node, NodeBorrow};
use crate::parsers::Parse;
use crate::properties::{ComputedValues, Display, TextAnchor};
use crate::session::Session;
use crate::xml::Attributes;

/// In text elements, we use `Chars` to store character data.  For example,
/// an element like `<text>Foo Bar</text>` will be a `Text` with a single child,
/// and the child will be a `Chars` with "Foo Bar" for its contents.
///
/// A text or tspan element can contain more than one `Chars` child, for example
/// if there is an XML comment that splits the character contents in two.
///
/// A `Chars` stores the characters verbatim as they come out of the XML parser;
/// whitespace is normalized when the text is laid out.
#[derive(Default)]
pub struct Chars {
    string: RefCell<String>,
}

impl Chars {
    pub fn new(initial_text: &str) -> Chars {
        Chars {
            string: RefCell::new(String::from(initial_text)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.string.borrow().is_empty()
    }

    pub fn append(&self, s: &str) {
        self.string.borrow_mut().push_str(s);
    }

    pub fn get_string(&self) -> String {
        self.string.borrow().clone()
    }

    fn to_span(&self, node: &Node, values: &ComputedValues, dx: f64, dy: f64) -> Span {
        let text = normalize_default(
            node.previous_sibling().is_some(),
            node.next_sibling().is_some(),
            &self.string.borrow(),
        );

        Span {
            values: values.clone(),
            text,
            dx,
            dy,
        }
    }
}

// From https://www.w3.org/TR/SVG/text.html#WhiteSpace
//
// When xml:space="default", the SVG user agent will do the following
// using a copy of the original character data content. First, it will
// remove all newline characters. Then it will convert all tab
// characters into space characters. Then, it will strip off all
// leading and trailing space characters. Then, all contiguous space
// characters will be consolidated.
fn normalize_default(has_element_before: bool, has_element_after: bool, mut s: &str) -> String {
    if !has_element_before {
        s = s.trim_start();
    }

    if !has_element_after {
        s = s.trim_end();
    }

    s.chars()
        .filter(|ch| *ch != '\n')
        .map(|ch| match ch {
            '\t' => ' ',
            c => c,
        })
        .coalesce(|current, next| match (current, next) {
            (' ', ' ') => Ok(' '),
            (_, _) => Err((current, next)),
        })
        .collect::<String>()
}

/// An absolutely-positioned array of `Span`s.
///
/// A "text chunk" starts wherever a text-related element has an absolute position in
/// its `x` or `y` attributes.  A `<text>` element always starts a chunk, at (0, 0) if
/// it does not specify a position.  The `text-anchor` of the element that starts a
/// chunk aligns the whole chunk.
struct Chunk {
    anchor: TextAnchor,
    x: Option<f64>,
    y: Option<f64>,
    spans: Vec<Span>,
}

impl Chunk {
    fn new(values: &ComputedValues, x: Option<f64>, y: Option<f64>) -> Chunk {
        Chunk {
            anchor: values.text_anchor,
            x,
            y,
            spans: Vec::new(),
        }
    }
}

struct Span {
    values: ComputedValues,
    text: String,
    dx: f64,
    dy: f64,
}

struct MeasuredSpan {
    values: ComputedValues,
    text: String,
    font: FontDescription,
    metrics: TextMetrics,
    dx: f64,
    dy: f64,
}

impl MeasuredSpan {
    fn from_span(
        measurer: &dyn TextMeasurer,
        span: &Span,
        session: &Session,
    ) -> Option<MeasuredSpan> {
        let values = &span.values;

        let font = FontDescription {
            family: values.font_family.clone(),
            size: values.font_size,
            weight: values.font_weight,
            style: values.font_style,
        };

        let Some(metrics) = measurer.measure(&font, &span.text) else {
            svgops_log!(
                session,
                "(could not measure \"{}\" in font \"{}\")",
                span.text,
                font.family
            );
            return None;
        };

        Some(MeasuredSpan {
            values: values.clone(),
            text: span.text.clone(),
            font,
            metrics,
            dx: span.dx,
            dy: span.dy,
        })
    }
}

/// Position attributes of a `text` or `tspan`.
///
/// Only the first value of each coordinate list is used.
struct TextPosition {
    x: Option<f64>,
    y: Option<f64>,
    dx: f64,
    dy: f64,
}

impl TextPosition {
    fn from_attributes(attrs: &Attributes, params: &NormalizeParams) -> TextPosition {
        TextPosition {
            x: first_length::<Horizontal>(attrs, "x", params),
            y: first_length::<Vertical>(attrs, "y", params),
            dx: first_length::<Horizontal>(attrs, "dx", params).unwrap_or(0.0),
            dy: first_length::<Vertical>(attrs, "dy", params).unwrap_or(0.0),
        }
    }
}

fn first_length<N: Normalize>(attrs: &Attributes, name: &str, params: &NormalizeParams) -> Option<f64> {
    let value = attrs.get_attribute(name)?;
    let first = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|s| !s.is_empty())?;

    Length::<N>::parse_str(first)
        .ok()
        .map(|l| l.to_user(params))
}

/// Collects the spans under `node`.  Returns false if a `<tspan>` nested deeper than
/// `depth_left` levels had to be skipped.
fn children_to_chunks(
    chunks: &mut Vec<Chunk>,
    node: &Node,
    values: &ComputedValues,
    params: &NormalizeParams,
    session: &Session,
    dx: f64,
    dy: f64,
    depth_left: usize,
) -> bool {
    let mut complete = true;
    let mut dx = dx;
    let mut dy = dy;

    for child in node.children() {
        if child.is_chars() {
            let span = child.borrow_chars().to_span(&child, values, dx, dy);

            if let Some(chunk) = chunks.last_mut() {
                chunk.spans.push(span);
            }
        } else if child.element_kind() == Some(ElementKind::TSpan) {
            if depth_left == 0 {
                complete = false;
                continue;
            }

            let elt = child.borrow_element();
            let child_values = values.cascade(elt.attributes(), params, session);

            if child_values.display != Display::None {
                let pos = TextPosition::from_attributes(
                    elt.attributes(),
                    &params.with_font_size(child_values.font_size),
                );

                if pos.x.is_some() || pos.y.is_some() {
                    chunks.push(Chunk::new(&child_values, pos.x, pos.y));
                }

                complete &= children_to_chunks(
                    chunks,
                    &child,
                    &child_values,
                    params,
                    session,
                    dx + pos.dx,
                    dy + pos.dy,
                    depth_left - 1,
                );
            }
        }

        // After the first span, we don't need to carry over the parent's dx/dy.
        dx = 0.0;
        dy = 0.0;
    }

    complete
}

/// Offset to apply to a chunk's start so that `text-anchor` aligns it.
fn text_anchor_offset(anchor: TextAnchor, advance: f64) -> f64 {
    match anchor {
        TextAnchor::Start => 0.0,
        TextAnchor::Middle => -advance / 2.0,
        TextAnchor::End => -advance,
    }
}

/// Lays out and emits the spans of a `<text>` element.
pub fn draw_text(dc: &mut DrawingCtx<'_>, node: &Node, frame: &Frame) {
    let session = dc.session().clone();

    let Some(measurer) = dc.text_measurer() else {
        session.report(Diagnostic::unsupported("text without a text measurer"));
        return;
    };

    let params = frame.params.with_font_size(frame.values.font_size);
    let pos = TextPosition::from_attributes(node.borrow_element().attributes(), &params);

    let mut chunks = vec![Chunk::new(
        &frame.values,
        Some(pos.x.unwrap_or(0.0)),
        Some(pos.y.unwrap_or(0.0)),
    )];

    let depth_left = dc.max_depth().saturating_sub(frame.depth);
    if !children_to_chunks(
        &mut chunks,
        node,
        &frame.values,
        &frame.params,
        &session,
        pos.dx,
        pos.dy,
        depth_left,
    ) {
        dc.report_too_deep();
    }

    let mut x = 0.0;
    let mut y = 0.0;

    for chunk in &chunks {
        let spans: Vec<MeasuredSpan> = chunk
            .spans
            .iter()
            .filter(|s| !s.text.is_empty())
            .filter_map(|s| MeasuredSpan::from_span(measurer, s, &session))
            .collect();

        let advance: f64 = spans.iter().map(|s| s.dx + s.metrics.advance).sum();

        x = chunk.x.unwrap_or(x) + text_anchor_offset(chunk.anchor, advance);
        y = chunk.y.unwrap_or(y);

        for span in &spans {
            x += span.dx;
            y += span.dy;

            draw_span(dc, span, x, y, frame);

            x += span.metrics.advance;
        }
    }
}

fn draw_span(dc: &mut DrawingCtx<'_>, span: &MeasuredSpan, x: f64, y: f64, frame: &Frame) {
    if !span.values.is_visible() {
        return;
    }

    let bbox = BoundingBox::from_rect(&span.metrics.bbox.translate((x, y)));

    let Some(paint) = span.values.fill.resolve(
        dc,
        frame,
        span.values.color,
        span.values.fill_opacity,
        Some(&bbox),
    ) else {
        return;
    };

    dc.set_transform(&frame.transform);

    let emitter = dc.emitter();
    emitter.set_fill(&paint);
    emitter.draw_text(&span.text, x, y, &span.font, &span.metrics);
}
