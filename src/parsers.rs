//! Attribute value parsing on top of `cssparser`.

use cssparser::{Parser, ParserInput, SourceLocation, Token};
use markup5ever::QualName;

use crate::error::*;

/// A value that can be read from an attribute or a property.
pub trait Parse: Sized {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>>;

    /// Parses the whole of `s`; trailing tokens are an error.
    fn parse_str(s: &str) -> Result<Self, ParseError<'_>> {
        let mut input = ParserInput::new(s);
        let mut parser = Parser::new(&mut input);

        let value = Self::parse(&mut parser)?;
        parser.expect_exhausted()?;
        Ok(value)
    }
}

/// Skips a comma if there is one.
pub fn optional_comma(parser: &mut Parser<'_, '_>) {
    let _ = parser.try_parse(|p| p.expect_comma());
}

pub trait ParseValue<T: Parse> {
    fn parse(&self, value: &str) -> Result<T, ElementError>;
}

/// An attribute name parses its own values, so errors carry the attribute they came
/// from: `attr.parse("42")`.
impl<T: Parse> ParseValue<T> for QualName {
    fn parse(&self, value: &str) -> Result<T, ElementError> {
        T::parse_str(value).attribute(self.clone())
    }
}

fn finite<'i>(loc: SourceLocation, n: f32) -> Result<f64, ParseError<'i>> {
    if n.is_finite() {
        Ok(f64::from(n))
    } else {
        Err(loc.new_custom_error(ValueErrorKind::value_error("expected finite number")))
    }
}

impl Parse for f64 {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let loc = parser.current_source_location();
        let n = parser.expect_number()?;
        finite(loc, n)
    }
}

/// A plain number or a percentage, with percentages scaled to fractions (`50%` is 0.5).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NumberOrPercentage {
    pub value: f64,
}

impl Parse for NumberOrPercentage {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        let loc = parser.current_source_location();

        let n = match *parser.next()? {
            Token::Number { value, .. } => value,
            Token::Percentage { unit_value, .. } => unit_value,
            ref tok => return Err(loc.new_unexpected_token_error(tok.clone())),
        };

        Ok(NumberOrPercentage {
            value: finite(loc, n)?,
        })
    }
}

/// Parses a list of identifiers from a `cssparser::Parser`
///
/// # Example
///
/// ```
/// # use cssparser::{ParserInput, Parser};
/// # use svgops::parse_identifiers;
/// # fn main() -> Result<(), cssparser::BasicParseError<'static>> {
/// # let mut input = ParserInput::new("true");
/// # let mut parser = Parser::new(&mut input);
/// let my_boolean = parse_identifiers!(
///     parser,
///     "true" => true,
///     "false" => false,
/// )?;
/// # Ok(())
/// # }
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! parse_identifiers {
    ($parser:expr,
     $($str:expr => $val:expr,)+) => {
        {
            let loc = $parser.current_source_location();
            let token = $parser.next()?;

            match token {
                $(cssparser::Token::Ident(ref cow) if cow.eq_ignore_ascii_case($str) => Ok($val),)+

                _ => Err(loc.new_basic_unexpected_token_error(token.clone()))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    use markup5ever::{local_name, namespace_url, ns, QualName};

    #[test]
    fn parses_number_or_percentage() {
        assert_eq!(
            NumberOrPercentage::parse_str("0.5").unwrap(),
            NumberOrPercentage { value: 0.5 }
        );
        assert_eq!(
            NumberOrPercentage::parse_str("50%").unwrap(),
            NumberOrPercentage { value: 0.5 }
        );

        assert!(NumberOrPercentage::parse_str("").is_err());
        assert!(NumberOrPercentage::parse_str("foo").is_err());
        assert!(NumberOrPercentage::parse_str("1px").is_err());
    }

    #[test]
    fn qualname_parse_annotates_attribute() {
        let attr = QualName::new(None, ns!(), local_name!("x"));
        let v: f64 = attr.parse("3.5").unwrap();
        assert_eq!(v, 3.5);

        let e: Result<f64, _> = attr.parse("3.5 garbage");
        assert!(e.is_err());
    }
}
