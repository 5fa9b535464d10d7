//! Gradient paint servers; the `linearGradient` and `radialGradient` elements.

use std::fmt;

use cssparser::Parser;

use crate::bbox::BoundingBox;
use crate::color::{self, RGBA};
use crate::defs::{DefsRegistry, Definition};
use crate::error::*;
use crate::iri::NodeId;
use crate::length::*;
use crate::node::{ElementKind, Node, NodeBorrow};
use crate::parsers::{NumberOrPercentage, Parse};
use crate::properties::ComputedValues;
use crate::session::Session;
use crate::transform::{Transform, TransformList};
use crate::xml::Attributes;

/// Contents of a `<stop>` element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    /// Offset in `[0.0, 1.0]`; offsets never decrease along a gradient.
    pub offset: f64,

    /// The `stop-color`, with `currentColor` already resolved.
    pub color: RGBA,

    /// The `stop-opacity`.
    pub opacity: f64,
}

/// `gradientUnits` attribute; its default is `objectBoundingBox`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GradientUnits {
    ObjectBoundingBox,
    UserSpaceOnUse,
}

enum_default!(GradientUnits, GradientUnits::ObjectBoundingBox);

impl Parse for GradientUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<GradientUnits, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "objectBoundingBox" => GradientUnits::ObjectBoundingBox,
            "userSpaceOnUse" => GradientUnits::UserSpaceOnUse,
        )?)
    }
}

/// `spreadMethod` attribute for gradients.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpreadMethod {
    Pad,
    Reflect,
    Repeat,
}

enum_default!(SpreadMethod, SpreadMethod::Pad);

impl Parse for SpreadMethod {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<SpreadMethod, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "pad" => SpreadMethod::Pad,
            "reflect" => SpreadMethod::Reflect,
            "repeat" => SpreadMethod::Repeat,
        )?)
    }
}

/// Geometry of a gradient in gradient space, in user units.
///
/// For `objectBoundingBox` units these are fractions of the bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GradientKind {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },

    Radial {
        cx: f64,
        cy: f64,
        r: f64,
        fx: f64,
        fy: f64,
        fr: f64,
    },
}

/// A gradient as announced to a backend with
/// [`DrawingEmitter::register_gradient`](crate::DrawingEmitter::register_gradient).
#[derive(Debug, Clone, PartialEq)]
pub struct GradientPaint {
    pub kind: GradientKind,
    pub units: GradientUnits,
    pub spread: SpreadMethod,
    pub stops: Vec<ColorStop>,

    /// Backends can't vary opacity per stop.  When some stop is translucent, this is
    /// the average opacity of all the stops, to be applied to the whole gradient.
    pub opacity: Option<f64>,
}

impl fmt::Display for GradientPaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            GradientKind::Linear { x1, y1, x2, y2 } => write!(f, "linear {x1} {y1} {x2} {y2}")?,
            GradientKind::Radial {
                cx,
                cy,
                r,
                fx,
                fy,
                fr,
            } => write!(f, "radial {cx} {cy} {r} {fx} {fy} {fr}")?,
        }

        write!(f, " {:?} {:?} [", self.units, self.spread)?;

        for (i, stop) in self.stops.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            let c = stop.color;
            write!(
                f,
                "{} rgba({}, {}, {}, {})",
                stop.offset, c.red, c.green, c.blue, c.alpha
            )?;
        }

        write!(f, "]")?;

        if let Some(opacity) = self.opacity {
            write!(f, " opacity {opacity}")?;
        }

        Ok(())
    }
}

/// Parameters specific to each gradient type, before being resolved.
///
/// These will be composed together with the variant from fallback nodes (referenced
/// with e.g. `<linearGradient href="#fallback">`) to form a resolved gradient.
#[derive(Copy, Clone)]
enum UnresolvedVariant {
    Linear {
        x1: Option<Length<Horizontal>>,
        y1: Option<Length<Vertical>>,
        x2: Option<Length<Horizontal>>,
        y2: Option<Length<Vertical>>,
    },

    Radial {
        cx: Option<Length<Horizontal>>,
        cy: Option<Length<Vertical>>,
        r: Option<Length<Both>>,
        fx: Option<Length<Horizontal>>,
        fy: Option<Length<Vertical>>,
    },
}

fn percent<N: Normalize>(v: f64) -> Length<N> {
    Length::new(v, LengthUnit::Percent)
}

impl UnresolvedVariant {
    fn from_attributes(kind: ElementKind, attrs: &Attributes, session: &Session) -> Self {
        if kind == ElementKind::RadialGradient {
            UnresolvedVariant::Radial {
                cx: attrs.parse_valid("cx", session),
                cy: attrs.parse_valid("cy", session),
                r: attrs.parse_valid("r", session),
                fx: attrs.parse_valid("fx", session),
                fy: attrs.parse_valid("fy", session),
            }
        } else {
            UnresolvedVariant::Linear {
                x1: attrs.parse_valid("x1", session),
                y1: attrs.parse_valid("y1", session),
                x2: attrs.parse_valid("x2", session),
                y2: attrs.parse_valid("y2", session),
            }
        }
    }

    fn is_resolved(&self) -> bool {
        match *self {
            UnresolvedVariant::Linear { x1, y1, x2, y2 } => {
                x1.is_some() && y1.is_some() && x2.is_some() && y2.is_some()
            }

            UnresolvedVariant::Radial { cx, cy, r, fx, fy } => {
                cx.is_some() && cy.is_some() && r.is_some() && fx.is_some() && fy.is_some()
            }
        }
    }

    fn resolve_from_fallback(&self, fallback: &UnresolvedVariant) -> UnresolvedVariant {
        match (*self, *fallback) {
            (
                UnresolvedVariant::Linear { x1, y1, x2, y2 },
                UnresolvedVariant::Linear {
                    x1: fx1,
                    y1: fy1,
                    x2: fx2,
                    y2: fy2,
                },
            ) => UnresolvedVariant::Linear {
                x1: x1.or(fx1),
                y1: y1.or(fy1),
                x2: x2.or(fx2),
                y2: y2.or(fy2),
            },

            (
                UnresolvedVariant::Radial { cx, cy, r, fx, fy },
                UnresolvedVariant::Radial {
                    cx: f_cx,
                    cy: f_cy,
                    r: f_r,
                    fx: f_fx,
                    fy: f_fy,
                },
            ) => UnresolvedVariant::Radial {
                cx: cx.or(f_cx),
                cy: cy.or(f_cy),
                r: r.or(f_r),
                fx: fx.or(f_fx),
                fy: fy.or(f_fy),
            },

            _ => *self, // If variants are of different types, then nothing to resolve
        }
    }

    // https://www.w3.org/TR/SVG/pservers.html#LinearGradients
    // https://www.w3.org/TR/SVG/pservers.html#RadialGradients
    fn resolve_from_defaults(&self, params: &NormalizeParams) -> GradientKind {
        match *self {
            UnresolvedVariant::Linear { x1, y1, x2, y2 } => GradientKind::Linear {
                x1: x1.unwrap_or_else(|| percent(0.0)).to_user(params),
                y1: y1.unwrap_or_else(|| percent(0.0)).to_user(params),
                x2: x2.unwrap_or_else(|| percent(1.0)).to_user(params),
                y2: y2.unwrap_or_else(|| percent(0.0)).to_user(params),
            },

            UnresolvedVariant::Radial { cx, cy, r, fx, fy } => {
                let cx = cx.unwrap_or_else(|| percent(0.5));
                let cy = cy.unwrap_or_else(|| percent(0.5));

                // fx and fy fall back to the presentational value of cx and cy
                let fx = fx.unwrap_or(cx);
                let fy = fy.unwrap_or(cy);

                GradientKind::Radial {
                    cx: cx.to_user(params),
                    cy: cy.to_user(params),
                    r: r.unwrap_or_else(|| percent(0.5)).to_user(params),
                    fx: fx.to_user(params),
                    fy: fy.to_user(params),
                    fr: 0.0,
                }
            }
        }
    }
}

/// Main structure used during gradient resolution.
///
/// Fields are `None` when they are not specified in the gradient itself, and may be
/// taken from the fallback gradient.
struct UnresolvedGradient {
    units: Option<GradientUnits>,
    transform: Option<Transform>,
    spread: Option<SpreadMethod>,
    stops: Option<Vec<ColorStop>>,

    variant: UnresolvedVariant,
}

impl UnresolvedGradient {
    fn from_node(node: &Node, params: &NormalizeParams, session: &Session) -> UnresolvedGradient {
        let elt = node.borrow_element();
        let attrs = elt.attributes();

        let mut gradient = UnresolvedGradient {
            units: attrs.parse_valid("gradientUnits", session),
            transform: attrs.get_attribute("gradientTransform").map(|t| {
                let list = TransformList::parse_lenient(t);
                list.report_skipped(session);
                list.transform
            }),
            spread: attrs.parse_valid("spreadMethod", session),
            stops: None,
            variant: UnresolvedVariant::from_attributes(elt.kind(), attrs, session),
        };

        gradient.add_color_stops_from_node(node, params, session);
        gradient
    }

    fn add_color_stop(&mut self, offset: f64, color: RGBA, opacity: f64) {
        let stops = self.stops.get_or_insert_with(Vec::new);

        let last_offset = stops.last().map_or(0.0, |s| s.offset);
        let offset = offset.clamp(0.0, 1.0).max(last_offset);

        stops.push(ColorStop {
            offset,
            color,
            opacity,
        });
    }

    /// Looks for `<stop>` children inside a gradient node.
    ///
    /// A gradient without stop children leaves `stops` unset, so that it can take the
    /// stops of its fallback.
    fn add_color_stops_from_node(
        &mut self,
        node: &Node,
        params: &NormalizeParams,
        session: &Session,
    ) {
        let values = ComputedValues::for_node(node, params, session);

        for child in node.children().filter(|c| c.is_element()) {
            let elt = child.borrow_element();

            if elt.kind() != ElementKind::Stop {
                continue;
            }

            let attrs = elt.attributes();

            let offset = match attrs.parse::<NumberOrPercentage>("offset") {
                Some(Ok(NumberOrPercentage { value })) => value,
                Some(Err(e)) => {
                    svgops_log!(session, "(gradient stop with invalid offset: {})", e);
                    0.0
                }
                None => 0.0,
            };

            let stop_values = values.cascade(attrs, params, session);
            let color = color::resolve_color(&stop_values.stop_color, stop_values.color);

            self.add_color_stop(offset, color, stop_values.stop_opacity);
        }
    }

    fn is_resolved(&self) -> bool {
        self.units.is_some()
            && self.transform.is_some()
            && self.spread.is_some()
            && self.stops.is_some()
            && self.variant.is_resolved()
    }

    fn resolve_from_fallback(&self, fallback: &UnresolvedGradient) -> UnresolvedGradient {
        UnresolvedGradient {
            units: self.units.or(fallback.units),
            transform: self.transform.or(fallback.transform),
            spread: self.spread.or(fallback.spread),
            stops: self.stops.clone().or_else(|| fallback.stops.clone()),
            variant: self.variant.resolve_from_fallback(&fallback.variant),
        }
    }

    fn resolve_from_defaults(self, params: &NormalizeParams) -> ResolvedGradient {
        let units = self.units.unwrap_or_default();

        // Object bounding box units are fractions of the box, so lengths resolve
        // against a unit square.
        let params = match units {
            GradientUnits::ObjectBoundingBox => params.with_viewport(1.0, 1.0),
            GradientUnits::UserSpaceOnUse => *params,
        };

        let stops = self.stops.unwrap_or_default();
        let opacity = average_opacity(&stops);

        ResolvedGradient {
            paint: GradientPaint {
                kind: self.variant.resolve_from_defaults(&params),
                units,
                spread: self.spread.unwrap_or_default(),
                stops,
                opacity,
            },
            transform: self.transform.unwrap_or_default(),
        }
    }
}

fn average_opacity(stops: &[ColorStop]) -> Option<f64> {
    if stops.iter().all(|s| s.opacity == 1.0) {
        None
    } else {
        let sum: f64 = stops.iter().map(|s| s.opacity).sum();
        Some(sum / stops.len() as f64)
    }
}

/// Resolved gradient; this is memoizable after the initial resolution.
#[derive(Debug, Clone)]
pub struct ResolvedGradient {
    pub paint: GradientPaint,

    /// The `gradientTransform`.
    pub transform: Transform,
}

impl ResolvedGradient {
    /// Resolves the gradient in `def`, following `href` fallbacks from the gradient's
    /// own scope.
    ///
    /// Reference cycles and references to non-gradients end the fallback chain; what
    /// is still unspecified at that point takes its default value.
    pub fn resolve(def: &Definition, defs: &DefsRegistry, session: &Session) -> ResolvedGradient {
        let params = defs.params(def.scope);

        let mut gradient = UnresolvedGradient::from_node(&def.node, params, session);
        let mut fallback = fallback_of(&def.node, session);
        let mut scope = def.scope;
        let mut visited = vec![def.node.borrow_element().index()];

        while !gradient.is_resolved() {
            let Some(node_id) = fallback.take() else {
                break;
            };

            let Some(id) = node_id.internal() else {
                session.report(Diagnostic::unsupported("references to external gradients"));
                break;
            };

            let Some(fallback_def) = defs.lookup(scope, id) else {
                session.report(Diagnostic::unresolved(&node_id.to_string()));
                break;
            };

            if !fallback_def.kind().is_gradient() {
                svgops_log!(session, "gradient fallback {} is not a gradient", node_id);
                break;
            }

            let index = fallback_def.node.borrow_element().index();
            if visited.contains(&index) {
                session.report(Diagnostic::unsupported("circular gradient references"));
                break;
            }
            visited.push(index);

            let fallback_gradient =
                UnresolvedGradient::from_node(&fallback_def.node, params, session);
            gradient = gradient.resolve_from_fallback(&fallback_gradient);
            fallback = fallback_of(&fallback_def.node, session);
            scope = fallback_def.scope;
        }

        gradient.resolve_from_defaults(params)
    }

    /// Transform from gradient space to the space where the painted element is drawn.
    ///
    /// `world` is the transform of the painted element, and `bbox` its untransformed
    /// bounding box.  Returns `None` for `objectBoundingBox` units when the box is
    /// missing or empty, in which case the element is not painted.
    pub fn paint_matrix(&self, bbox: Option<&BoundingBox>, world: &Transform) -> Option<Transform> {
        let space = match self.paint.units {
            GradientUnits::ObjectBoundingBox => {
                world.pre_transform(&bbox?.unit_square_transform()?)
            }
            GradientUnits::UserSpaceOnUse => *world,
        };

        Some(space.pre_transform(&self.transform))
    }
}

fn fallback_of(node: &Node, session: &Session) -> Option<NodeId> {
    let elt = node.borrow_element();
    let href = elt.attributes().get_href()?;

    match NodeId::parse(href) {
        Ok(id) => Some(id),
        Err(e) => {
            svgops_log!(session, "(ignoring invalid gradient href \"{}\": {})", href, e);
            None
        }
    }
}
