//! The `viewBox` attribute.

use cssparser::Parser;
use std::ops::Deref;

use crate::error::*;
use crate::number_list::{NumberList, NumberListLength};
use crate::parsers::Parse;
use crate::rect::Rect;

/// User-space rectangle that an element maps onto its viewport.
///
/// `ViewBox` derefs to [`Rect`], so `vbox.x0` or `vbox.width()` work directly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewBox(Rect);

impl Deref for ViewBox {
    type Target = Rect;

    fn deref(&self) -> &Rect {
        &self.0
    }
}

impl From<Rect> for ViewBox {
    fn from(r: Rect) -> ViewBox {
        ViewBox(r)
    }
}

// viewBox: x [,] y [,] width [,] height, with non-negative width and height
impl Parse for ViewBox {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<ViewBox, ParseError<'i>> {
        let loc = parser.current_source_location();

        let NumberList(v) = NumberList::parse(parser, NumberListLength::Exact(4))?;

        match v[..] {
            [x, y, width, height] if width >= 0.0 && height >= 0.0 => {
                Ok(ViewBox(Rect::new(x, y, x + width, y + height)))
            }

            _ => Err(loc.new_custom_error(ValueErrorKind::value_error(
                "width and height must not be negative",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separators() {
        assert_eq!(
            ViewBox::parse_str("0 0 100 50"),
            Ok(ViewBox(Rect::new(0.0, 0.0, 100.0, 50.0)))
        );

        assert_eq!(
            ViewBox::parse_str(" -10,-20, 5e1 ,2"),
            Ok(ViewBox(Rect::new(-10.0, -20.0, 40.0, -18.0)))
        );
    }

    #[test]
    fn rejects_bad_viewboxes() {
        assert!(ViewBox::parse_str("").is_err());
        assert!(ViewBox::parse_str("0 0 -1 10").is_err());
        assert!(ViewBox::parse_str("0 0 10").is_err());
        assert!(ViewBox::parse_str("0 0 10 10 10").is_err());
        assert!(ViewBox::parse_str("0 0 wide tall").is_err());
    }
}
