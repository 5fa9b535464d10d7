//! A [`DrawingEmitter`] that records operations for later inspection.

use std::fmt;

use crate::bbox::BoundingBox;
use crate::emitter::*;
use crate::gradient::GradientPaint;
use crate::rect::Rect;
use crate::transform::Transform;

/// One recorded call to a [`DrawingEmitter`] method.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    ClosePath,
    PaintPath(PaintMode, FillRule),
    RoundedRect {
        rect: Rect,
        rx: f64,
        ry: f64,
        mode: PaintMode,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        mode: PaintMode,
    },
    Line(f64, f64, f64, f64),
    PushState,
    PopState,
    SetTransform(Transform),
    SetFill(Paint),
    SetStroke(Paint),
    SetLineWidth(f64),
    SetLineCap(LineCap),
    SetLineJoin(LineJoin),
    SetMiterLimit(f64),
    SetDash(Vec<f64>, f64),
    SetOpacity(f64),
    RegisterGradient(String, GradientPaint),
    BeginObject {
        id: String,
        bbox: BoundingBox,
        transform: Transform,
    },
    EndObject,
    InvokeObject(String, Transform),
    Image {
        len: usize,
        format: ImageFormat,
        rect: Rect,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font: FontDescription,
        advance: f64,
    },
}

impl Op {
    /// Short name of the operation, as used by `svgops-dump --stats`.
    pub fn name(&self) -> &'static str {
        match self {
            Op::BeginPath => "begin_path",
            Op::MoveTo(..) => "move_to",
            Op::LineTo(..) => "line_to",
            Op::CurveTo(..) => "curve_to",
            Op::ClosePath => "close_path",
            Op::PaintPath(..) => "paint_path",
            Op::RoundedRect { .. } => "draw_rounded_rect",
            Op::Ellipse { .. } => "draw_ellipse",
            Op::Line(..) => "draw_line",
            Op::PushState => "push_state",
            Op::PopState => "pop_state",
            Op::SetTransform(_) => "set_transform",
            Op::SetFill(_) => "set_fill",
            Op::SetStroke(_) => "set_stroke",
            Op::SetLineWidth(_) => "set_line_width",
            Op::SetLineCap(_) => "set_line_cap",
            Op::SetLineJoin(_) => "set_line_join",
            Op::SetMiterLimit(_) => "set_miter_limit",
            Op::SetDash(..) => "set_dash",
            Op::SetOpacity(_) => "set_opacity",
            Op::RegisterGradient(..) => "register_gradient",
            Op::BeginObject { .. } => "begin_object",
            Op::EndObject => "end_object",
            Op::InvokeObject(..) => "invoke_object",
            Op::Image { .. } => "draw_image",
            Op::Text { .. } => "draw_text",
        }
    }
}

fn fmt_transform(f: &mut fmt::Formatter<'_>, t: &Transform) -> fmt::Result {
    write!(
        f,
        "[{} {} {} {} {} {}]",
        t.xx, t.yx, t.xy, t.yy, t.x0, t.y0
    )
}

fn fmt_paint(f: &mut fmt::Formatter<'_>, paint: &Paint) -> fmt::Result {
    match paint {
        Paint::Color(c) => write!(
            f,
            "rgba({}, {}, {}, {})",
            c.red, c.green, c.blue, c.alpha
        ),
        Paint::Gradient {
            id,
            matrix,
            opacity,
        } => {
            write!(f, "gradient {id} ")?;
            fmt_transform(f, matrix)?;
            write!(f, " opacity {opacity}")
        }
    }
}

fn fmt_rect(f: &mut fmt::Formatter<'_>, r: &Rect) -> fmt::Result {
    write!(f, "{} {} {} {}", r.x0, r.y0, r.width(), r.height())
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;

        match self {
            Op::BeginPath | Op::ClosePath | Op::PushState | Op::PopState | Op::EndObject => Ok(()),
            Op::MoveTo(x, y) | Op::LineTo(x, y) => write!(f, " {x} {y}"),
            Op::CurveTo(x1, y1, x2, y2, x, y) => write!(f, " {x1} {y1} {x2} {y2} {x} {y}"),
            Op::PaintPath(mode, rule) => write!(f, " {mode:?} {rule:?}"),
            Op::RoundedRect { rect, rx, ry, mode } => {
                write!(f, " ")?;
                fmt_rect(f, rect)?;
                write!(f, " rx {rx} ry {ry} {mode:?}")
            }
            Op::Ellipse {
                cx,
                cy,
                rx,
                ry,
                mode,
            } => write!(f, " {cx} {cy} {rx} {ry} {mode:?}"),
            Op::Line(x1, y1, x2, y2) => write!(f, " {x1} {y1} {x2} {y2}"),
            Op::SetTransform(t) => {
                write!(f, " ")?;
                fmt_transform(f, t)
            }
            Op::SetFill(p) | Op::SetStroke(p) => {
                write!(f, " ")?;
                fmt_paint(f, p)
            }
            Op::SetLineWidth(v) | Op::SetMiterLimit(v) | Op::SetOpacity(v) => write!(f, " {v}"),
            Op::SetLineCap(cap) => write!(f, " {cap:?}"),
            Op::SetLineJoin(join) => write!(f, " {join:?}"),
            Op::SetDash(dashes, offset) => write!(f, " {dashes:?} {offset}"),
            Op::RegisterGradient(id, g) => write!(f, " {id} {g}"),
            Op::BeginObject {
                id,
                bbox,
                transform,
            } => {
                write!(
                    f,
                    " {id} bbox {} {} {} {} ",
                    bbox.x, bbox.y, bbox.width, bbox.height
                )?;
                fmt_transform(f, transform)
            }
            Op::InvokeObject(id, t) => {
                write!(f, " {id} ")?;
                fmt_transform(f, t)
            }
            Op::Image { len, format, rect } => {
                write!(f, " {format:?} {len} bytes ")?;
                fmt_rect(f, rect)
            }
            Op::Text {
                text,
                x,
                y,
                font,
                advance,
            } => write!(
                f,
                " {text:?} {x} {y} \"{}\" {} {} {:?} advance {advance}",
                font.family, font.size, font.weight, font.style
            ),
        }
    }
}

/// Records every operation in order.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    ops: Vec<Op>,
}

impl RecordingEmitter {
    pub fn new() -> RecordingEmitter {
        RecordingEmitter::default()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    fn record(&mut self, op: Op) {
        self.ops.push(op);
    }
}

impl DrawingEmitter for RecordingEmitter {
    fn begin_path(&mut self) {
        self.record(Op::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.record(Op::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.record(Op::LineTo(x, y));
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.record(Op::CurveTo(x1, y1, x2, y2, x, y));
    }

    fn close_path(&mut self) {
        self.record(Op::ClosePath);
    }

    fn paint_path(&mut self, mode: PaintMode, fill_rule: FillRule) {
        self.record(Op::PaintPath(mode, fill_rule));
    }

    fn draw_rounded_rect(&mut self, rect: &Rect, rx: f64, ry: f64, mode: PaintMode) {
        self.record(Op::RoundedRect {
            rect: *rect,
            rx,
            ry,
            mode,
        });
    }

    fn draw_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, mode: PaintMode) {
        self.record(Op::Ellipse {
            cx,
            cy,
            rx,
            ry,
            mode,
        });
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.record(Op::Line(x1, y1, x2, y2));
    }

    fn push_state(&mut self) {
        self.record(Op::PushState);
    }

    fn pop_state(&mut self) {
        self.record(Op::PopState);
    }

    fn set_transform(&mut self, transform: &Transform) {
        self.record(Op::SetTransform(*transform));
    }

    fn set_fill(&mut self, paint: &Paint) {
        self.record(Op::SetFill(paint.clone()));
    }

    fn set_stroke(&mut self, paint: &Paint) {
        self.record(Op::SetStroke(paint.clone()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.record(Op::SetLineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.record(Op::SetLineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.record(Op::SetLineJoin(join));
    }

    fn set_miter_limit(&mut self, limit: f64) {
        self.record(Op::SetMiterLimit(limit));
    }

    fn set_dash(&mut self, dashes: &[f64], offset: f64) {
        self.record(Op::SetDash(dashes.to_vec(), offset));
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.record(Op::SetOpacity(opacity));
    }

    fn register_gradient(&mut self, id: &str, gradient: &GradientPaint) {
        self.record(Op::RegisterGradient(id.to_string(), gradient.clone()));
    }

    fn begin_object(&mut self, id: &str, bbox: &BoundingBox, transform: &Transform) {
        self.record(Op::BeginObject {
            id: id.to_string(),
            bbox: *bbox,
            transform: *transform,
        });
    }

    fn end_object(&mut self) {
        self.record(Op::EndObject);
    }

    fn invoke_object(&mut self, id: &str, transform: &Transform) {
        self.record(Op::InvokeObject(id.to_string(), *transform));
    }

    fn draw_image(&mut self, data: &[u8], format: ImageFormat, rect: &Rect) {
        self.record(Op::Image {
            len: data.len(),
            format,
            rect: *rect,
        });
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: &FontDescription,
        metrics: &TextMetrics,
    ) {
        self.record(Op::Text {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            advance: metrics.advance,
        });
    }
}
