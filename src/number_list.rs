//! Number-list values, as used by `viewBox`.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::{optional_comma, Parse};

#[derive(Eq, PartialEq)]
pub enum NumberListLength {
    Exact(usize),
    Unbounded,
}

#[derive(Debug, PartialEq)]
pub struct NumberList(pub Vec<f64>);

impl NumberList {
    pub fn parse<'i>(
        parser: &mut Parser<'i, '_>,
        length: NumberListLength,
    ) -> Result<Self, ParseError<'i>> {
        let mut v = match length {
            NumberListLength::Exact(l) => Vec::<f64>::with_capacity(l),
            NumberListLength::Unbounded => Vec::<f64>::new(),
        };

        if parser.is_exhausted() && length == NumberListLength::Unbounded {
            return Ok(NumberList(v));
        }

        for i in 0.. {
            if i != 0 {
                optional_comma(parser);
            }

            v.push(f64::parse(parser)?);

            if let NumberListLength::Exact(l) = length {
                if i + 1 == l {
                    break;
                }
            }

            if parser.is_exhausted() {
                match length {
                    NumberListLength::Exact(l) => {
                        let loc = parser.current_source_location();
                        if i + 1 < l {
                            return Err(loc.new_custom_error(ValueErrorKind::value_error(
                                "expected more numbers",
                            )));
                        }
                    }
                    NumberListLength::Unbounded => break,
                }
            }
        }

        Ok(NumberList(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssparser::ParserInput;

    fn parse_str(s: &str, length: NumberListLength) -> Result<NumberList, ParseError<'_>> {
        let mut input = ParserInput::new(s);
        let mut parser = Parser::new(&mut input);

        let res = NumberList::parse(&mut parser, length)?;
        parser.expect_exhausted()?;
        Ok(res)
    }

    #[test]
    fn parses_number_list() {
        assert_eq!(
            parse_str("5", NumberListLength::Exact(1)),
            Ok(NumberList(vec![5.0]))
        );

        assert_eq!(
            parse_str("1 2 3 4", NumberListLength::Exact(4)),
            Ok(NumberList(vec![1.0, 2.0, 3.0, 4.0]))
        );

        assert_eq!(
            parse_str("1,2,3", NumberListLength::Unbounded),
            Ok(NumberList(vec![1.0, 2.0, 3.0]))
        );

        assert_eq!(
            parse_str("", NumberListLength::Unbounded),
            Ok(NumberList(vec![]))
        );
    }

    #[test]
    fn errors_on_invalid_number_list() {
        assert!(parse_str("", NumberListLength::Exact(1)).is_err());
        assert!(parse_str("1 2", NumberListLength::Exact(4)).is_err());
        assert!(parse_str("1 2 3", NumberListLength::Exact(2)).is_err());
        assert!(parse_str("1,,2", NumberListLength::Unbounded).is_err());
        assert!(parse_str("a", NumberListLength::Unbounded).is_err());
    }
}
