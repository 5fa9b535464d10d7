//! Angles for rotations and marker orientation.

use std::f64::consts::*;

use cssparser::{_cssparser_internal_to_lowercase, match_ignore_ascii_case, Parser, Token};
use float_cmp::approx_eq;

use crate::error::*;
use crate::parsers::Parse;

/// An angle in radians, normalized to `[0, 2π)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Angle(f64);

impl Angle {
    pub fn new(rad: f64) -> Angle {
        Angle(Angle::normalize(rad))
    }

    pub fn from_degrees(deg: f64) -> Angle {
        Angle(Angle::normalize(deg.to_radians()))
    }

    /// Direction of the vector `(vx, vy)`; a zero vector yields a zero angle.
    pub fn from_vector(vx: f64, vy: f64) -> Angle {
        let rad = vy.atan2(vx);

        if rad.is_nan() {
            Angle(0.0)
        } else {
            Angle(Angle::normalize(rad))
        }
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// Angle halfway between an incoming and an outgoing direction.
    pub fn bisect(self, other: Angle) -> Angle {
        let half_delta = (other.0 - self.0) * 0.5;

        if FRAC_PI_2 < half_delta.abs() {
            Angle(Angle::normalize(self.0 + half_delta - PI))
        } else {
            Angle(Angle::normalize(self.0 + half_delta))
        }
    }

    fn normalize(rad: f64) -> f64 {
        let res = rad % TAU;
        if approx_eq!(f64, res, 0.0) {
            0.0
        } else if res < 0.0 {
            res + TAU
        } else {
            res
        }
    }
}

// angle ::= number ("deg" | "grad" | "rad" | "turn")?
impl Parse for Angle {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Angle, ParseError<'i>> {
        let loc = parser.current_source_location();
        let token = parser.next()?.clone();

        let (value, unit) = match token {
            Token::Number { value, .. } => (value, None),
            Token::Dimension {
                value, ref unit, ..
            } => (value, Some(unit.clone())),
            _ => return Err(loc.new_unexpected_token_error(token)),
        };

        if !value.is_finite() {
            return Err(loc.new_custom_error(ValueErrorKind::value_error("expected finite number")));
        }

        let value = f64::from(value);

        match unit {
            None => Ok(Angle::from_degrees(value)),
            Some(unit) => match_ignore_ascii_case! { unit.as_ref(),
                "deg" => Ok(Angle::from_degrees(value)),
                "grad" => Ok(Angle::from_degrees(value * 0.9)),
                "rad" => Ok(Angle::new(value)),
                "turn" => Ok(Angle::new(value * TAU)),
                _ => Err(loc.new_unexpected_token_error(token)),
            },
        }
    }
}
