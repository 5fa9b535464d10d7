//! SVG paint servers: the values of the `fill` and `stroke` properties.

use cssparser::Parser;

use crate::bbox::BoundingBox;
use crate::color::{color_with_opacity, resolve_color, Color, RGBA};
use crate::drawing_ctx::{DrawingCtx, Frame};
use crate::emitter::Paint;
use crate::error::*;
use crate::iri::NodeId;
use crate::parsers::Parse;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintServer {
    None,
    Iri {
        iri: NodeId,
        alternate: Option<Color>,
    },
    SolidColor(Color),
}

impl Parse for PaintServer {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<PaintServer, ParseError<'i>> {
        if parser
            .try_parse(|i| i.expect_ident_matching("none"))
            .is_ok()
        {
            Ok(PaintServer::None)
        } else if let Ok(url) = parser.try_parse(|i| i.expect_url()) {
            let loc = parser.current_source_location();

            let alternate = if !parser.is_exhausted() {
                if parser
                    .try_parse(|i| i.expect_ident_matching("none"))
                    .is_ok()
                {
                    None
                } else {
                    Some(parser.try_parse(|i| Color::parse(i))?)
                }
            } else {
                None
            };

            Ok(PaintServer::Iri {
                iri: NodeId::parse(&url).map_err(|e| loc.new_custom_error(e))?,
                alternate,
            })
        } else {
            Ok(Color::parse(parser).map(PaintServer::SolidColor)?)
        }
    }
}

impl PaintServer {
    /// Resolves the paint server into something a backend can paint with.
    ///
    /// `opacity` is the `fill-opacity` or `stroke-opacity` that goes with this paint,
    /// and `bbox` is the untransformed bounding box of the element being painted, for
    /// gradients in `objectBoundingBox` units.
    ///
    /// Returns `None` when there is nothing to paint: for `none`, for gradients without
    /// stops or that cannot be mapped to the bounding box, and for unresolvable
    /// references without a fallback color.
    pub fn resolve(
        &self,
        dc: &mut DrawingCtx<'_>,
        frame: &Frame,
        current_color: RGBA,
        opacity: f64,
        bbox: Option<&BoundingBox>,
    ) -> Option<Paint> {
        let solid = |color: &Color| {
            Paint::Color(color_with_opacity(
                resolve_color(color, current_color),
                opacity,
            ))
        };

        match *self {
            PaintServer::None => None,

            PaintServer::SolidColor(ref color) => Some(solid(color)),

            PaintServer::Iri {
                ref iri,
                ref alternate,
            } => {
                let Some(id) = iri.internal() else {
                    dc.session()
                        .report(Diagnostic::unsupported("references to external paint servers"));
                    return alternate.as_ref().map(solid);
                };

                let def = match dc.lookup(frame.scope, id) {
                    Some(def) if def.kind().is_gradient() => def,

                    Some(_) => {
                        svgops_log!(dc.session(), "paint server {} is not a gradient", iri);
                        dc.session().report(Diagnostic::unresolved(&iri.to_string()));
                        return alternate.as_ref().map(solid);
                    }

                    None => {
                        dc.session().report(Diagnostic::unresolved(&iri.to_string()));
                        return alternate.as_ref().map(solid);
                    }
                };

                let gradient = dc.gradient(&def);

                // https://www.w3.org/TR/SVG2/pservers.html#StopNotes
                match gradient.paint.stops.as_slice() {
                    [] => None,

                    [stop] => Some(Paint::Color(color_with_opacity(
                        stop.color,
                        stop.opacity * opacity,
                    ))),

                    _ => {
                        let matrix = gradient.paint_matrix(bbox, &frame.transform)?;

                        Some(Paint::Gradient {
                            id: def.key,
                            matrix,
                            opacity,
                        })
                    }
                }
            }
        }
    }
}
