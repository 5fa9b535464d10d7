//! Length values for positional and size attributes.
//!
//! A [`Length`] needs to know whether it will be normalized with respect to the width,
//! height, or both dimensions of the current viewport when it is a percentage.  So, a
//! `Length` has a type parameter [`Normalize`]; we provide [`Horizontal`], [`Vertical`],
//! and [`Both`] implementations.
//!
//! For example, a circle has `Length<Horizontal>` for `cx`, `Length<Vertical>` for `cy`,
//! and `Length<Both>` for `r`; `r="50%"` is resolved against the normalized diagonal of
//! the viewport.

use cssparser::{_cssparser_internal_to_lowercase, match_ignore_ascii_case, Parser, Token};
use std::f64::consts::SQRT_2;
use std::marker::PhantomData;

use crate::error::*;
use crate::parsers::Parse;

/// Units for length values.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LengthUnit {
    /// `1.0` means 100%
    Percent,

    /// Pixels, or the CSS default unit
    Px,

    /// Size of the current font
    Em,

    /// x-height of the current font, taken as half the font size
    Ex,

    /// Inches (25.4 mm)
    In,

    /// Centimeters
    Cm,

    /// Millimeters
    Mm,

    /// Points (1/72 inch)
    Pt,

    /// Picas (12 points)
    Pc,
}

/// Used for the type parameter of `Length<N: Normalize>`.
pub trait Normalize {
    /// Computes an orientation-based scaling factor.
    ///
    /// This is used in the [`Length::to_user`] method to resolve percentage lengths.
    fn normalize(x: f64, y: f64) -> f64;
}

/// Allows declaring `Length<Horizontal>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Horizontal;

/// Allows declaring `Length<Vertical>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Vertical;

/// Allows declaring `Length<Both>`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Both;

impl Normalize for Horizontal {
    #[inline]
    fn normalize(x: f64, _y: f64) -> f64 {
        x
    }
}

impl Normalize for Vertical {
    #[inline]
    fn normalize(_x: f64, y: f64) -> f64 {
        y
    }
}

impl Normalize for Both {
    #[inline]
    fn normalize(x: f64, y: f64) -> f64 {
        viewport_percentage(x, y)
    }
}

/// A length value with its unit.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Length<N: Normalize> {
    /// Numeric part of the length
    pub length: f64,

    /// Unit part of the length
    pub unit: LengthUnit,

    orientation: PhantomData<N>,
}

impl<N: Normalize> Default for Length<N> {
    fn default() -> Self {
        Length::new(0.0, LengthUnit::Px)
    }
}

/// Parameters to resolve lengths to user units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NormalizeParams {
    pub vbox_width: f64,
    pub vbox_height: f64,
    pub font_size: f64,
    pub dpi: f64,
}

impl NormalizeParams {
    pub fn new(vbox_width: f64, vbox_height: f64, font_size: f64, dpi: f64) -> NormalizeParams {
        NormalizeParams {
            vbox_width,
            vbox_height,
            font_size,
            dpi,
        }
    }

    pub fn with_viewport(&self, vbox_width: f64, vbox_height: f64) -> NormalizeParams {
        NormalizeParams {
            vbox_width,
            vbox_height,
            ..*self
        }
    }

    pub fn with_font_size(&self, font_size: f64) -> NormalizeParams {
        NormalizeParams { font_size, ..*self }
    }
}

const POINTS_PER_INCH: f64 = 72.0;
const CM_PER_INCH: f64 = 2.54;
const MM_PER_INCH: f64 = 25.4;
const PICA_PER_INCH: f64 = 6.0;

impl<N: Normalize> Length<N> {
    pub fn new(l: f64, unit: LengthUnit) -> Length<N> {
        Length {
            length: l,
            unit,
            orientation: PhantomData,
        }
    }

    /// Converts the length to user-space coordinates.
    pub fn to_user(&self, params: &NormalizeParams) -> f64 {
        match self.unit {
            LengthUnit::Px => self.length,

            LengthUnit::Percent => {
                self.length * <N as Normalize>::normalize(params.vbox_width, params.vbox_height)
            }

            LengthUnit::Em => self.length * params.font_size,

            LengthUnit::Ex => self.length * params.font_size / 2.0,

            LengthUnit::In => self.length * params.dpi,

            LengthUnit::Cm => self.length * params.dpi / CM_PER_INCH,

            LengthUnit::Mm => self.length * params.dpi / MM_PER_INCH,

            LengthUnit::Pt => self.length * params.dpi / POINTS_PER_INCH,

            LengthUnit::Pc => self.length * params.dpi / PICA_PER_INCH,
        }
    }
}

impl<N: Normalize> Parse for Length<N> {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Length<N>, ParseError<'i>> {
        let l_value;
        let l_unit;

        let token = parser.next()?.clone();

        match token {
            Token::Number { value, .. } => {
                l_value = value;
                l_unit = LengthUnit::Px;
            }

            Token::Percentage { unit_value, .. } => {
                l_value = unit_value;
                l_unit = LengthUnit::Percent;
            }

            Token::Dimension {
                value, ref unit, ..
            } => {
                l_value = value;

                l_unit = match_ignore_ascii_case! {unit.as_ref(),
                    "px" => LengthUnit::Px,
                    "em" => LengthUnit::Em,
                    "ex" => LengthUnit::Ex,
                    "in" => LengthUnit::In,
                    "cm" => LengthUnit::Cm,
                    "mm" => LengthUnit::Mm,
                    "pt" => LengthUnit::Pt,
                    "pc" => LengthUnit::Pc,

                    _ => return Err(parser.new_unexpected_token_error(token)),
                };
            }

            _ => return Err(parser.new_unexpected_token_error(token)),
        }

        if !l_value.is_finite() {
            return Err(
                parser.new_custom_error(ValueErrorKind::value_error("expected finite number"))
            );
        }

        Ok(Length::new(f64::from(l_value), l_unit))
    }
}

fn viewport_percentage(x: f64, y: f64) -> f64 {
    // https://www.w3.org/TR/SVG/coords.html#Units
    // "For any other length value expressed as a percentage of the viewport, the
    // percentage is calculated as the specified percentage of
    // sqrt((actual-width)**2 + (actual-height)**2))/sqrt(2)."
    (x * x + y * y).sqrt() / SQRT_2
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::assert_approx_eq_units;

    fn params() -> NormalizeParams {
        NormalizeParams::new(100.0, 200.0, 12.0, 96.0)
    }

    #[test]
    fn parses_default() {
        assert_eq!(
            Length::<Horizontal>::parse_str("42").unwrap(),
            Length::<Horizontal>::new(42.0, LengthUnit::Px)
        );

        assert_eq!(
            Length::<Horizontal>::parse_str("-42px").unwrap(),
            Length::<Horizontal>::new(-42.0, LengthUnit::Px)
        );
    }

    #[test]
    fn parses_units() {
        assert_eq!(
            Length::<Vertical>::parse_str("50.0%").unwrap(),
            Length::<Vertical>::new(0.5, LengthUnit::Percent)
        );

        assert_eq!(
            Length::<Both>::parse_str("10MM").unwrap(),
            Length::<Both>::new(10.0, LengthUnit::Mm)
        );

        assert_eq!(
            Length::<Both>::parse_str("2pc").unwrap(),
            Length::<Both>::new(2.0, LengthUnit::Pc)
        );
    }

    #[test]
    fn invalid_unit_yields_error() {
        assert!(Length::<Both>::parse_str("8furlong").is_err());
        assert!(Length::<Both>::parse_str("").is_err());
    }

    #[test]
    fn normalizes_physical_units() {
        assert_approx_eq_units!(
            Length::<Horizontal>::new(1.0, LengthUnit::In).to_user(&params()),
            96.0
        );
        assert_approx_eq_units!(
            Length::<Horizontal>::new(72.0, LengthUnit::Pt).to_user(&params()),
            96.0
        );
        assert_approx_eq_units!(
            Length::<Horizontal>::new(25.4, LengthUnit::Mm).to_user(&params()),
            96.0
        );
        assert_approx_eq_units!(
            Length::<Horizontal>::new(2.0, LengthUnit::Em).to_user(&params()),
            24.0
        );
    }

    #[test]
    fn normalizes_percentages_per_orientation() {
        assert_approx_eq_units!(
            Length::<Horizontal>::new(0.5, LengthUnit::Percent).to_user(&params()),
            50.0
        );
        assert_approx_eq_units!(
            Length::<Vertical>::new(0.5, LengthUnit::Percent).to_user(&params()),
            100.0
        );
        assert_approx_eq_units!(
            Length::<Both>::new(0.5, LengthUnit::Percent).to_user(&params()),
            viewport_percentage(100.0, 200.0) * 0.5
        );
    }
}
