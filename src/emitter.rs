//! The interface between the compiler and a document-writing backend.
//!
//! The compiler walks a [`Document`](crate::Document) and calls the methods of a
//! [`DrawingEmitter`] in order.  A backend that writes PDF, PostScript or any other
//! vector format implements this trait; [`RecordingEmitter`](crate::RecordingEmitter)
//! just records the calls.
//!
//! # Coordinate spaces
//!
//! Path coordinates and primitive geometry are in the user space of the element being
//! drawn.  [`DrawingEmitter::set_transform`] sets the absolute transform from that user
//! space to the page, or to the space of the reusable object being compiled.  The
//! transform is part of the graphics state, so it is restored by
//! [`DrawingEmitter::pop_state`].
//!
//! # Reusable objects
//!
//! Content between [`DrawingEmitter::begin_object`] and [`DrawingEmitter::end_object`]
//! goes into a separate drawing payload instead of the page.  Inside it, transforms are
//! relative to the object's own space.  Objects are compiled once and then placed any
//! number of times with [`DrawingEmitter::invoke_object`].

use crate::bbox::BoundingBox;
use crate::color::RGBA;
use crate::gradient::GradientPaint;
use crate::rect::Rect;
use crate::transform::Transform;

/// Which parts of a shape to paint.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaintMode {
    Fill,
    Stroke,
    FillAndStroke,
}

impl PaintMode {
    /// Combines the presence of a fill and a stroke; `None` if there is nothing to paint.
    pub fn from_fill_stroke(fill: bool, stroke: bool) -> Option<PaintMode> {
        match (fill, stroke) {
            (true, true) => Some(PaintMode::FillAndStroke),
            (true, false) => Some(PaintMode::Fill),
            (false, true) => Some(PaintMode::Stroke),
            (false, false) => None,
        }
    }

    pub fn fills(self) -> bool {
        self != PaintMode::Stroke
    }

    pub fn strokes(self) -> bool {
        self != PaintMode::Fill
    }
}

/// The `fill-rule` property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

enum_default!(FillRule, FillRule::NonZero);

/// The `stroke-linecap` property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

enum_default!(LineCap, LineCap::Butt);

/// The `stroke-linejoin` property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

enum_default!(LineJoin, LineJoin::Miter);

/// The `font-style` property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

enum_default!(FontStyle, FontStyle::Normal);

/// Raster formats that backends can embed without re-encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Format for a `type/subtype` media type, if it passes through unchanged.
    pub fn from_mime_type(mime_type: &str) -> Option<ImageFormat> {
        match mime_type {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// A resolved paint for fills or strokes.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// A flat color; fill-opacity or stroke-opacity is already folded into its alpha.
    Color(RGBA),

    /// A gradient previously announced with [`DrawingEmitter::register_gradient`].
    Gradient {
        id: String,

        /// Maps gradient coordinates to the page, or to the current object's space.
        matrix: Transform,

        /// The `fill-opacity` or `stroke-opacity` of the painted element.
        opacity: f64,
    },
}

/// What a [`TextMeasurer`] needs to know about a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescription {
    pub family: String,
    pub size: f64,
    pub weight: u16,
    pub style: FontStyle,
}

/// Measurements for a run of text.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextMetrics {
    /// Ink extents, relative to the start of the baseline.
    pub bbox: Rect,

    /// Horizontal advance of the whole run.
    pub advance: f64,
}

/// Measures text for a given font.
///
/// Returns `None` if the text can't be laid out with that font.
pub trait TextMeasurer {
    fn measure(&self, font: &FontDescription, text: &str) -> Option<TextMetrics>;
}

/// Converts raster images that backends can't embed directly.
///
/// `mime_type` is the declared media type of `data`.  Returns the re-encoded bytes and
/// their format, or `None` if the image can't be converted.
pub trait ImageEncoder {
    fn encode(&self, data: &[u8], mime_type: &str) -> Option<(Vec<u8>, ImageFormat)>;
}

/// Sink for the drawing operations of a compiled document.
pub trait DrawingEmitter {
    /// Starts a new path, discarding any path under construction.
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64);

    fn close_path(&mut self);

    /// Paints the current path with the current fill and stroke.
    fn paint_path(&mut self, mode: PaintMode, fill_rule: FillRule);

    /// A rectangle with corners rounded by an ellipse of radii `rx` and `ry`; both are
    /// zero for square corners.
    fn draw_rounded_rect(&mut self, rect: &Rect, rx: f64, ry: f64, mode: PaintMode);

    fn draw_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, mode: PaintMode);

    /// A stroked line segment.
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    fn push_state(&mut self);

    fn pop_state(&mut self);

    fn set_transform(&mut self, transform: &Transform);

    fn set_fill(&mut self, paint: &Paint);

    fn set_stroke(&mut self, paint: &Paint);

    fn set_line_width(&mut self, width: f64);

    fn set_line_cap(&mut self, cap: LineCap);

    fn set_line_join(&mut self, join: LineJoin);

    fn set_miter_limit(&mut self, limit: f64);

    /// An empty `dashes` means solid lines.
    fn set_dash(&mut self, dashes: &[f64], offset: f64);

    /// Multiplies the opacity of everything drawn until the state is popped.
    fn set_opacity(&mut self, opacity: f64);

    /// Announces a gradient before the first paint that uses it.  Each `id` is
    /// registered at most once per compilation.
    fn register_gradient(&mut self, id: &str, gradient: &GradientPaint);

    /// Starts compiling a reusable object.
    ///
    /// `bbox` is in the object's own coordinates, and `transform` maps those to the
    /// space where the object is invoked.
    fn begin_object(&mut self, id: &str, bbox: &BoundingBox, transform: &Transform);

    fn end_object(&mut self);

    /// Places a compiled object; `transform` is absolute, like the one in
    /// [`DrawingEmitter::set_transform`].
    fn invoke_object(&mut self, id: &str, transform: &Transform);

    /// Draws an image scaled to fill `rect`.
    fn draw_image(&mut self, data: &[u8], format: ImageFormat, rect: &Rect);

    /// Draws a run of text whose baseline starts at `(x, y)`.
    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: &FontDescription,
        metrics: &TextMetrics,
    );
}
