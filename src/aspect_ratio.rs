//! Handling of `preserveAspectRatio` values.
//!
//! An [`AspectRatio`] decides how a `viewBox` is fitted into the viewport of an `<svg>`,
//! a `<symbol>` instantiated by `<use>`, or a `<marker>`.  The default is
//! `xMidYMid meet`.

use cssparser::{BasicParseError, Parser};

use crate::error::*;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::Transform;
use crate::viewbox::ViewBox;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FitMode {
    Meet,
    Slice,
}

enum_default!(FitMode, FitMode::Meet);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Align1D {
    Min,
    Mid,
    Max,
}

enum_default!(Align1D, Align1D::Mid);

impl Align1D {
    fn compute(self, dest_pos: f64, dest_size: f64, obj_size: f64) -> f64 {
        match self {
            Align1D::Min => dest_pos,
            Align1D::Mid => dest_pos + (dest_size - obj_size) / 2.0,
            Align1D::Max => dest_pos + dest_size - obj_size,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Align {
    x: Align1D,
    y: Align1D,
    fit: FitMode,
}

/// A parsed `preserveAspectRatio`; `None` alignment means non-uniform scaling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    align: Option<Align>,
}

impl Default for AspectRatio {
    fn default() -> AspectRatio {
        AspectRatio {
            align: Some(Align::default()),
        }
    }
}

impl AspectRatio {
    /// Where the viewBox lands inside the viewport, in viewport coordinates.
    pub fn compute(&self, vbox: &ViewBox, viewport: &Rect) -> Rect {
        match self.align {
            None => *viewport,

            Some(Align { x, y, fit }) => {
                let (vb_width, vb_height) = vbox.size();
                let (vp_width, vp_height) = viewport.size();

                let w_factor = vp_width / vb_width;
                let h_factor = vp_height / vb_height;

                let factor = match fit {
                    FitMode::Meet => w_factor.min(h_factor),
                    FitMode::Slice => w_factor.max(h_factor),
                };

                let w = vb_width * factor;
                let h = vb_height * factor;

                let xpos = x.compute(viewport.x0, vp_width, w);
                let ypos = y.compute(viewport.y0, vp_height, h);

                Rect::new(xpos, ypos, xpos + w, ypos + h)
            }
        }
    }

    /// Computes the transform that establishes the viewBox's coordinate system inside
    /// the viewport.
    ///
    /// Without a viewBox this is just a translation to the viewport's origin.
    ///
    /// Returns `None` when the viewport or the viewBox is empty, which disables
    /// rendering of the element, or when the resulting transform is degenerate.
    pub fn viewport_to_viewbox_transform(
        &self,
        vbox: Option<ViewBox>,
        viewport: &Rect,
    ) -> Option<Transform> {
        if viewport.is_empty() {
            return None;
        }

        let transform = match vbox {
            Some(vbox) if vbox.is_empty() => return None,

            Some(vbox) => {
                let r = self.compute(&vbox, viewport);
                Transform::new_translate(r.x0, r.y0)
                    .pre_scale(r.width() / vbox.width(), r.height() / vbox.height())
                    .pre_translate(-vbox.x0, -vbox.y0)
            }

            None => Transform::new_translate(viewport.x0, viewport.y0),
        };

        Some(transform).filter(Transform::is_invertible)
    }
}

fn parse_align_xy<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Option<(Align1D, Align1D)>, BasicParseError<'i>> {
    use self::Align1D::*;

    parse_identifiers!(
        parser,

        "none" => None,

        "xMinYMin" => Some((Min, Min)),
        "xMidYMin" => Some((Mid, Min)),
        "xMaxYMin" => Some((Max, Min)),

        "xMinYMid" => Some((Min, Mid)),
        "xMidYMid" => Some((Mid, Mid)),
        "xMaxYMid" => Some((Max, Mid)),

        "xMinYMax" => Some((Min, Max)),
        "xMidYMax" => Some((Mid, Max)),
        "xMaxYMax" => Some((Max, Max)),
    )
}

fn parse_fit_mode<'i>(parser: &mut Parser<'i, '_>) -> Result<FitMode, BasicParseError<'i>> {
    parse_identifiers!(
        parser,
        "meet" => FitMode::Meet,
        "slice" => FitMode::Slice,
    )
}

impl Parse for AspectRatio {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<AspectRatio, ParseError<'i>> {
        // SVG 1.1 allowed a leading "defer", which only mattered for <image>
        let _ = parser.try_parse(|p| p.expect_ident_matching("defer"));

        let align_xy = parser.try_parse(parse_align_xy)?;
        let fit = parser.try_parse(parse_fit_mode).unwrap_or_default();
        let align = align_xy.map(|(x, y)| Align { x, y, fit });

        Ok(AspectRatio { align })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(s: &str) -> Rect {
        let viewbox = ViewBox::from(Rect::from_size(1.0, 10.0));
        AspectRatio::parse_str(s)
            .unwrap()
            .compute(&viewbox, &Rect::from_size(10.0, 1.0))
    }

    #[test]
    fn parsing_invalid_strings_yields_error() {
        assert!(AspectRatio::parse_str("").is_err());
        assert!(AspectRatio::parse_str("defer").is_err());
        assert!(AspectRatio::parse_str("xMidYMid foo").is_err());
        assert!(AspectRatio::parse_str("xMidYMid meet foo").is_err());
    }

    #[test]
    fn default_is_x_mid_y_mid_meet() {
        assert_eq!(
            AspectRatio::parse_str("xMidYMid").unwrap(),
            AspectRatio::default()
        );
        assert_eq!(
            AspectRatio::parse_str("xMidYMid meet").unwrap(),
            AspectRatio::default()
        );
    }

    #[test]
    fn parses_valid_strings() {
        assert_eq!(
            AspectRatio::parse_str("none").unwrap(),
            AspectRatio { align: None }
        );

        assert_eq!(
            AspectRatio::parse_str("defer xMinYMax slice").unwrap(),
            AspectRatio {
                align: Some(Align {
                    x: Align1D::Min,
                    y: Align1D::Max,
                    fit: FitMode::Slice,
                }),
            }
        );
    }

    #[test]
    fn meet_fits_inside_viewport() {
        assert!(fit("xMinYMin meet").approx_eq(&Rect::from_size(0.1, 1.0)));
        assert!(fit("xMidYMid meet").approx_eq(&Rect::new(4.95, 0.0, 5.05, 1.0)));
        assert!(fit("xMaxYMax meet").approx_eq(&Rect::new(9.9, 0.0, 10.0, 1.0)));
    }

    #[test]
    fn slice_covers_viewport() {
        assert!(fit("xMinYMin slice").approx_eq(&Rect::from_size(10.0, 100.0)));
        assert!(fit("xMidYMid slice").approx_eq(&Rect::new(0.0, -49.5, 10.0, 50.5)));
        assert!(fit("xMaxYMax slice").approx_eq(&Rect::new(0.0, -99.0, 10.0, 1.0)));
    }

    #[test]
    fn none_stretches() {
        assert_eq!(fit("none"), Rect::from_size(10.0, 1.0));
    }

    #[test]
    fn empty_viewport_or_viewbox_disables_rendering() {
        let a = AspectRatio::default();

        assert_eq!(
            a.viewport_to_viewbox_transform(
                Some(ViewBox::parse_str("10 10 40 40").unwrap()),
                &Rect::from_size(0.0, 0.0),
            ),
            None
        );

        assert_eq!(
            a.viewport_to_viewbox_transform(
                Some(ViewBox::parse_str("10 10 0 0").unwrap()),
                &Rect::from_size(10.0, 10.0),
            ),
            None
        );
    }

    #[test]
    fn maps_viewbox_onto_viewport() {
        let a = AspectRatio::default();
        let t = a.viewport_to_viewbox_transform(
            Some(ViewBox::parse_str("10 10 40 40").unwrap()),
            &Rect::new(1.0, 1.0, 2.0, 2.0),
        );

        assert_eq!(
            t,
            Some(
                Transform::identity()
                    .pre_translate(1.0, 1.0)
                    .pre_scale(0.025, 0.025)
                    .pre_translate(-10.0, -10.0)
            )
        );
    }

    #[test]
    fn without_viewbox_only_translates() {
        let t = AspectRatio::default()
            .viewport_to_viewbox_transform(None, &Rect::new(5.0, 6.0, 20.0, 20.0));

        assert_eq!(t, Some(Transform::new_translate(5.0, 6.0)));
    }
}
