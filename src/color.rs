//! CSS color values.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::Parse;

pub use cssparser::{Color, RGBA};

impl Parse for cssparser::Color {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<cssparser::Color, ParseError<'i>> {
        Ok(cssparser::Color::parse(parser)?)
    }
}

impl Parse for cssparser::RGBA {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<cssparser::RGBA, ParseError<'i>> {
        let loc = parser.current_source_location();

        match cssparser::Color::parse(parser)? {
            cssparser::Color::RGBA(rgba) => Ok(rgba),
            cssparser::Color::CurrentColor => Err(loc.new_custom_error(ValueErrorKind::Value(
                "currentColor is not allowed here".to_string(),
            ))),
        }
    }
}

/// Opaque black, the initial value of `color`, `fill` and `stop-color`.
pub fn black() -> RGBA {
    RGBA::new(0, 0, 0, 255)
}

/// Resolves `currentColor` against the inherited `color` property.
pub fn resolve_color(color: &Color, current_color: RGBA) -> RGBA {
    match *color {
        Color::RGBA(rgba) => rgba,
        Color::CurrentColor => current_color,
    }
}

/// Multiplies the alpha of a color by an opacity in `[0.0, 1.0]`.
pub fn color_with_opacity(color: RGBA, opacity: f64) -> RGBA {
    let alpha = (f64::from(color.alpha) * opacity.clamp(0.0, 1.0)).round() as u8;
    RGBA { alpha, ..color }
}
