//! Compile SVG documents into backend-agnostic vector drawing operations.
//!
//! This crate reads a practical subset of SVG 1.1 and translates it into a sequence of
//! calls on a [`DrawingEmitter`].  An emitter is whatever backend you write the
//! document to: a PDF content stream, a canvas, or just a list of operations to look at
//! (see [`RecordingEmitter`]).
//!
//! Reusable content, like the children of `<defs>`, symbols and markers, is compiled
//! once into an object, and each `<use>` or marker vertex invokes that object.  Gradients
//! are registered with the emitter once per definition.
//!
//! # Example
//!
//! ```
//! use svgops::{Compiler, Loader, RecordingEmitter};
//!
//! let document = Loader::new()
//!     .read_str(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="10" height="10"/></svg>"#)
//!     .unwrap();
//!
//! let mut emitter = RecordingEmitter::new();
//! let diagnostics = Compiler::new(&document).compile(&mut emitter);
//!
//! assert!(diagnostics.is_empty());
//! assert!(emitter.ops().iter().any(|op| op.name() == "draw_rounded_rect"));
//! ```
//!
//! Nothing in a document makes compilation fail.  Problems like malformed path data or
//! references that go nowhere are returned as [`Diagnostic`] values, and the offending
//! piece of the document is skipped.

#![warn(nonstandard_style, rust_2018_idioms, unused)]
#![allow(clippy::too_many_arguments)]

use std::path::Path;

pub use crate::bbox::BoundingBox;
pub use crate::document::Document;
pub use crate::emitter::{
    DrawingEmitter, FillRule, FontDescription, FontStyle, ImageEncoder, ImageFormat, LineCap,
    LineJoin, Paint, PaintMode, TextMeasurer, TextMetrics,
};
pub use crate::error::{Diagnostic, LoadingError};
pub use crate::gradient::{ColorStop, GradientKind, GradientPaint, GradientUnits, SpreadMethod};
pub use crate::options::{CompileOptions, LoadOptions};
pub use crate::rect::Rect;
pub use crate::recording::{Op, RecordingEmitter};
pub use crate::session::Session;
pub use crate::transform::Transform;

#[macro_use]
mod log;

#[macro_use]
mod util;

#[macro_use]
mod parsers;

#[macro_use]
mod float_eq;

mod angle;
mod aspect_ratio;
mod bbox;
mod color;
mod defs;
mod document;
mod drawing_ctx;
mod emitter;
mod error;
mod gradient;
mod image;
mod iri;
mod length;
mod marker;
mod node;
mod number_list;
mod options;
mod paint_server;
mod path_builder;
mod path_parser;
mod properties;
mod recording;
mod rect;
mod session;
mod shapes;
mod structure;
mod text;
mod transform;
mod viewbox;
mod xml;

/// Builder for loading a [`Document`].
///
/// # Example:
///
/// ```no_run
/// let document = svgops::Loader::new()
///     .with_logging(true)
///     .read_path("example.svg")
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    /// Creates a `Loader` with the default options.
    ///
    /// Logging is enabled if the `SVGOPS_LOG` environment variable is set.
    pub fn new() -> Self {
        Loader::default()
    }

    /// Creates a `Loader` from a set of options.
    pub fn with_options(options: LoadOptions) -> Self {
        Loader { options }
    }

    /// Turns logging to stderr on or off, regardless of `SVGOPS_LOG`.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.options = self.options.with_logging(enabled);
        self
    }

    fn session(&self) -> Session {
        match self.options.log_enabled {
            Some(enabled) => Session::new_with_log(enabled),
            None => Session::new(),
        }
    }

    /// Reads an SVG document from `path`.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Document, LoadingError> {
        Document::load_from_file(path.as_ref(), self.session())
    }

    /// Reads an SVG document from UTF-8 bytes.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Document, LoadingError> {
        Document::load_from_bytes(bytes, self.session())
    }

    /// Reads an SVG document from a string.
    pub fn read_str(&self, input: &str) -> Result<Document, LoadingError> {
        Document::load_from_str(input, self.session())
    }
}

/// Compiles a [`Document`] into calls on a [`DrawingEmitter`].
///
/// The text measurer and the image encoder are optional; without them, text and images
/// in formats other than PNG or JPEG are skipped with a diagnostic.
pub struct Compiler<'a> {
    document: &'a Document,
    options: CompileOptions,
    text_measurer: Option<&'a dyn TextMeasurer>,
    image_encoder: Option<&'a dyn ImageEncoder>,
}

impl<'a> Compiler<'a> {
    pub fn new(document: &'a Document) -> Self {
        Compiler {
            document,
            options: CompileOptions::default(),
            text_measurer: None,
            image_encoder: None,
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_text_measurer(mut self, text_measurer: &'a dyn TextMeasurer) -> Self {
        self.text_measurer = Some(text_measurer);
        self
    }

    pub fn with_image_encoder(mut self, image_encoder: &'a dyn ImageEncoder) -> Self {
        self.image_encoder = Some(image_encoder);
        self
    }

    /// Emits the whole document.
    ///
    /// Returns the diagnostics reported during this compilation, in document order.
    /// The document's [`Session`] keeps all of them, including those from loading.
    pub fn compile(&self, emitter: &mut dyn DrawingEmitter) -> Vec<Diagnostic> {
        let session = self.document.session();
        let before = session.diagnostics().len();

        drawing_ctx::compile_document(
            self.document,
            emitter,
            &self.options,
            self.text_measurer,
            self.image_encoder,
        );

        session.diagnostics().split_off(before)
    }
}
