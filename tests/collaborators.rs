//! Text and images, which depend on the optional collaborators.

use svgops::{
    Compiler, Diagnostic, FontDescription, ImageEncoder, ImageFormat, Loader, Op, Rect,
    RecordingEmitter, TextMeasurer, TextMetrics,
};

mod utils;

use utils::{compile, count};

/// Every character is 6 units wide and 10 units tall.
struct FixedWidth;

impl TextMeasurer for FixedWidth {
    fn measure(&self, font: &FontDescription, text: &str) -> Option<TextMetrics> {
        let advance = 6.0 * text.chars().count() as f64;

        Some(TextMetrics {
            bbox: Rect::new(0.0, -font.size, advance, 0.0),
            advance,
        })
    }
}

struct GifToPng;

impl ImageEncoder for GifToPng {
    fn encode(&self, data: &[u8], mime_type: &str) -> Option<(Vec<u8>, ImageFormat)> {
        (mime_type == "image/gif").then(|| (data.to_vec(), ImageFormat::Png))
    }
}

fn compile_with(svg: &str, measurer: &dyn TextMeasurer, encoder: &dyn ImageEncoder) -> (Vec<Op>, Vec<Diagnostic>) {
    let document = Loader::new().with_logging(false).read_str(svg).unwrap();
    let mut emitter = RecordingEmitter::new();

    let diagnostics = Compiler::new(&document)
        .with_text_measurer(measurer)
        .with_image_encoder(encoder)
        .compile(&mut emitter);

    (emitter.into_ops(), diagnostics)
}

fn texts(ops: &[Op]) -> Vec<(String, f64, f64)> {
    ops.iter()
        .filter_map(|op| match op {
            Op::Text { text, x, y, .. } => Some((text.clone(), *x, *y)),
            _ => None,
        })
        .collect()
}

const TEXT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg">
  <text x="10" y="20" font-family="Sans" font-size="10">Hello</text>
  <text x="10" y="40" text-anchor="end">abc</text>
</svg>"##;

#[test]
fn text_is_measured_and_anchored() {
    let (ops, diagnostics) = compile_with(TEXT, &FixedWidth, &GifToPng);

    assert!(diagnostics.is_empty());
    assert_eq!(
        texts(&ops),
        vec![
            ("Hello".to_string(), 10.0, 20.0),
            ("abc".to_string(), -8.0, 40.0),
        ]
    );

    let font = ops.iter().find_map(|op| match op {
        Op::Text { font, .. } => Some(font.clone()),
        _ => None,
    });

    assert_eq!(font.map(|f| (f.family, f.size)), Some(("Sans".to_string(), 10.0)));
}

#[test]
fn text_without_measurer_is_skipped() {
    let (ops, diagnostics) = compile(TEXT);

    assert_eq!(count(&ops, "draw_text"), 0);
    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::unsupported("text without a text measurer"),
            Diagnostic::unsupported("text without a text measurer"),
        ]
    );
}

#[test]
fn png_data_passes_through() {
    let (ops, diagnostics) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <image x="5" y="5" width="10" height="20" href="data:image/png;base64,AQID"/>
            </svg>"##,
    );

    assert!(diagnostics.is_empty());
    assert!(ops.contains(&Op::Image {
        len: 3,
        format: ImageFormat::Png,
        rect: Rect::new(5.0, 5.0, 15.0, 25.0),
    }));
}

#[test]
fn other_images_need_an_encoder() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
                    <image width="10" height="10" href="data:image/gif;base64,AQID"/>
                  </svg>"##;

    let (ops, diagnostics) = compile(svg);
    assert_eq!(count(&ops, "draw_image"), 0);
    assert_eq!(
        diagnostics,
        vec![Diagnostic::unsupported("images of type image/gif")]
    );

    let (ops, diagnostics) = compile_with(svg, &FixedWidth, &GifToPng);
    assert!(diagnostics.is_empty());
    assert_eq!(count(&ops, "draw_image"), 1);
}

#[test]
fn external_images_are_skipped() {
    let (ops, diagnostics) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <image width="10" height="10" href="photo.png"/>
            </svg>"##,
    );

    assert_eq!(count(&ops, "draw_image"), 0);
    assert_eq!(diagnostics.len(), 1);
}
