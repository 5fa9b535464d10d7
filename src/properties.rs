//! Presentation properties and their computed values.
//!
//! Properties come from presentation attributes like `fill="red"`, or from declarations
//! in the inline `style` attribute; see [`Attributes::get`].  There are no stylesheets.
//!
//! [`ComputedValues::cascade`] computes the values for an element from those of its
//! parent.  Inherited properties take the parent's value when unspecified, or when
//! specified as `inherit`; the rest go back to their initial value.  A value that fails
//! to parse is ignored as if it was not specified.

use cssparser::Parser;

use crate::color::{self, Color, RGBA};
use crate::emitter::{FillRule, FontStyle, LineCap, LineJoin};
use crate::error::*;
use crate::iri::IRI;
use crate::length::*;
use crate::node::{Node, NodeBorrow};
use crate::paint_server::PaintServer;
use crate::parsers::{optional_comma, NumberOrPercentage, Parse};
use crate::session::Session;
use crate::xml::Attributes;

/// The `visibility` property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
    Collapse,
}

/// The `display` property; we only care whether it is `none`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Display {
    Inline,
    None,
}

/// The `text-anchor` property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// The `font-weight` property, as a number between 1 and 1000.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
    Bolder,
    Lighter,
    Weight(u16),
}

impl FontWeight {
    fn compute(self, parent: u16) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
            FontWeight::Weight(w) => w,

            // https://www.w3.org/TR/css-fonts-4/#relative-weights
            FontWeight::Bolder => match parent {
                0..=349 => 400,
                350..=549 => 700,
                _ => 900,
            },
            FontWeight::Lighter => match parent {
                0..=549 => 100,
                550..=749 => 400,
                _ => 700,
            },
        }
    }
}

/// An opacity value clamped to `[0.0, 1.0]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Opacity(pub f64);

/// The `stroke-dasharray` property; `None` for solid lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dasharray(pub Option<Vec<Length<Both>>>);

/// The `font-family` property, kept as written minus quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFamily(pub String);

impl Parse for FillRule {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<FillRule, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "nonzero" => FillRule::NonZero,
            "evenodd" => FillRule::EvenOdd,
        )?)
    }
}

impl Parse for LineCap {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<LineCap, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "butt" => LineCap::Butt,
            "round" => LineCap::Round,
            "square" => LineCap::Square,
        )?)
    }
}

impl Parse for LineJoin {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<LineJoin, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "miter" => LineJoin::Miter,
            "miter-clip" => LineJoin::Miter,
            "round" => LineJoin::Round,
            "bevel" => LineJoin::Bevel,
        )?)
    }
}

impl Parse for FontStyle {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<FontStyle, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "normal" => FontStyle::Normal,
            "italic" => FontStyle::Italic,
            "oblique" => FontStyle::Oblique,
        )?)
    }
}

impl Parse for Visibility {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Visibility, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "visible" => Visibility::Visible,
            "hidden" => Visibility::Hidden,
            "collapse" => Visibility::Collapse,
        )?)
    }
}

impl Parse for Display {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Display, ParseError<'i>> {
        let ident = parser.expect_ident()?;

        if ident.eq_ignore_ascii_case("none") {
            Ok(Display::None)
        } else {
            Ok(Display::Inline)
        }
    }
}

impl Parse for TextAnchor {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<TextAnchor, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "start" => TextAnchor::Start,
            "middle" => TextAnchor::Middle,
            "end" => TextAnchor::End,
        )?)
    }
}

impl Parse for FontWeight {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<FontWeight, ParseError<'i>> {
        parser
            .try_parse(|p| {
                Ok(parse_identifiers!(
                    p,
                    "normal" => FontWeight::Normal,
                    "bold" => FontWeight::Bold,
                    "bolder" => FontWeight::Bolder,
                    "lighter" => FontWeight::Lighter,
                )?)
            })
            .or_else(|_: ParseError<'_>| {
                let loc = parser.current_source_location();
                let n = f64::parse(parser)?;

                if (1.0..=1000.0).contains(&n) {
                    Ok(FontWeight::Weight(n.round() as u16))
                } else {
                    Err(loc.new_custom_error(ValueErrorKind::value_error(
                        "value must be between 1 and 1000 inclusive",
                    )))
                }
            })
    }
}

impl Parse for Opacity {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Opacity, ParseError<'i>> {
        let NumberOrPercentage { value } = NumberOrPercentage::parse(parser)?;
        Ok(Opacity(value.clamp(0.0, 1.0)))
    }
}

impl Parse for Dasharray {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Dasharray, ParseError<'i>> {
        if parser
            .try_parse(|p| p.expect_ident_matching("none"))
            .is_ok()
        {
            return Ok(Dasharray(None));
        }

        let mut dashes = Vec::new();

        loop {
            let loc = parser.current_source_location();
            let d = Length::<Both>::parse(parser)?;

            if d.length < 0.0 {
                return Err(loc.new_custom_error(ValueErrorKind::value_error(
                    "dash lengths must not be negative",
                )));
            }

            dashes.push(d);

            if parser.is_exhausted() {
                break;
            }

            optional_comma(parser);
        }

        Ok(Dasharray(Some(dashes)))
    }
}

impl Parse for FontFamily {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<FontFamily, ParseError<'i>> {
        let loc = parser.current_source_location();
        let start = parser.position();

        // Consume everything, and check that there was something to consume
        let mut empty = true;
        while parser.next().is_ok() {
            empty = false;
        }

        if empty {
            return Err(loc.new_custom_error(ValueErrorKind::value_error(
                "expected a font family",
            )));
        }

        let family: String = parser
            .slice_from(start)
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect();

        Ok(FontFamily(family.trim().to_string()))
    }
}

/// `font-size` keeps percentages and `em` relative to the parent's size.
struct FontSize(Length<Both>);

impl Parse for FontSize {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<FontSize, ParseError<'i>> {
        let loc = parser.current_source_location();
        let size = Length::<Both>::parse(parser)?;

        if size.length < 0.0 {
            Err(loc.new_custom_error(ValueErrorKind::value_error(
                "font-size must not be negative",
            )))
        } else {
            Ok(FontSize(size))
        }
    }
}

impl FontSize {
    fn compute(&self, parent_size: f64, params: &NormalizeParams) -> f64 {
        match self.0.unit {
            LengthUnit::Percent => self.0.length * parent_size,
            _ => self.0.to_user(&params.with_font_size(parent_size)),
        }
    }
}

/// Computed values of the properties for an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedValues {
    pub color: RGBA,
    pub fill: PaintServer,
    pub fill_opacity: f64,
    pub fill_rule: FillRule,
    pub stroke: PaintServer,
    pub stroke_width: Length<Both>,
    pub stroke_opacity: f64,
    pub stroke_linecap: LineCap,
    pub stroke_linejoin: LineJoin,
    pub stroke_miterlimit: f64,
    pub stroke_dasharray: Dasharray,
    pub stroke_dashoffset: Length<Both>,
    pub visibility: Visibility,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub text_anchor: TextAnchor,
    pub marker_start: IRI,
    pub marker_mid: IRI,
    pub marker_end: IRI,

    // Not inherited
    pub opacity: f64,
    pub display: Display,
    pub stop_color: Color,
    pub stop_opacity: f64,
}

impl ComputedValues {
    /// Initial values, as for the parent of the root element.
    pub fn initial(font_size: f64) -> ComputedValues {
        ComputedValues {
            color: color::black(),
            fill: PaintServer::SolidColor(Color::RGBA(color::black())),
            fill_opacity: 1.0,
            fill_rule: FillRule::default(),
            stroke: PaintServer::None,
            stroke_width: Length::new(1.0, LengthUnit::Px),
            stroke_opacity: 1.0,
            stroke_linecap: LineCap::default(),
            stroke_linejoin: LineJoin::default(),
            stroke_miterlimit: 4.0,
            stroke_dasharray: Dasharray::default(),
            stroke_dashoffset: Length::default(),
            visibility: Visibility::Visible,
            font_family: String::from("sans-serif"),
            font_size,
            font_weight: 400,
            font_style: FontStyle::default(),
            text_anchor: TextAnchor::Start,
            marker_start: IRI::None,
            marker_mid: IRI::None,
            marker_end: IRI::None,

            opacity: 1.0,
            display: Display::Inline,
            stop_color: Color::RGBA(color::black()),
            stop_opacity: 1.0,
        }
    }

    /// Computes the values for an element whose parent has the values in `self`.
    pub fn cascade(
        &self,
        attrs: &Attributes,
        params: &NormalizeParams,
        session: &Session,
    ) -> ComputedValues {
        let mut v = ComputedValues {
            opacity: 1.0,
            display: Display::Inline,
            stop_color: Color::RGBA(color::black()),
            stop_opacity: 1.0,
            ..self.clone()
        };

        let specified = Specified { attrs, session };

        if let Some(c) = specified.get::<Color>("color") {
            v.color = color::resolve_color(&c, self.color);
        }

        if let Some(p) = specified.get("fill") {
            v.fill = p;
        }
        if let Some(Opacity(o)) = specified.get("fill-opacity") {
            v.fill_opacity = o;
        }
        if let Some(r) = specified.get("fill-rule") {
            v.fill_rule = r;
        }

        if let Some(p) = specified.get("stroke") {
            v.stroke = p;
        }
        if let Some(w) = specified.get::<Length<Both>>("stroke-width") {
            if w.length >= 0.0 {
                v.stroke_width = w;
            }
        }
        if let Some(Opacity(o)) = specified.get("stroke-opacity") {
            v.stroke_opacity = o;
        }
        if let Some(c) = specified.get("stroke-linecap") {
            v.stroke_linecap = c;
        }
        if let Some(j) = specified.get("stroke-linejoin") {
            v.stroke_linejoin = j;
        }
        if let Some(m) = specified.get::<f64>("stroke-miterlimit") {
            if m >= 1.0 {
                v.stroke_miterlimit = m;
            }
        }
        if let Some(d) = specified.get("stroke-dasharray") {
            v.stroke_dasharray = d;
        }
        if let Some(o) = specified.get("stroke-dashoffset") {
            v.stroke_dashoffset = o;
        }

        if let Some(vis) = specified.get("visibility") {
            v.visibility = vis;
        }

        if let Some(FontFamily(f)) = specified.get("font-family") {
            v.font_family = f;
        }
        if let Some(s) = specified.get::<FontSize>("font-size") {
            v.font_size = s.compute(self.font_size, params);
        }
        if let Some(w) = specified.get::<FontWeight>("font-weight") {
            v.font_weight = w.compute(self.font_weight);
        }
        if let Some(s) = specified.get("font-style") {
            v.font_style = s;
        }
        if let Some(a) = specified.get("text-anchor") {
            v.text_anchor = a;
        }

        if let Some(m) = specified.get::<IRI>("marker") {
            v.marker_start = m.clone();
            v.marker_mid = m.clone();
            v.marker_end = m;
        }
        if let Some(m) = specified.get("marker-start") {
            v.marker_start = m;
        }
        if let Some(m) = specified.get("marker-mid") {
            v.marker_mid = m;
        }
        if let Some(m) = specified.get("marker-end") {
            v.marker_end = m;
        }

        v.opacity = specified
            .get_non_inherited::<Opacity>("opacity")
            .map_or_else(|| self.opacity_if_inherited(attrs, "opacity"), |o| o.0);
        if let Some(d) = specified.get_non_inherited("display") {
            v.display = d;
        }
        if let Some(c) = specified.get_non_inherited::<Color>("stop-color") {
            v.stop_color = Color::RGBA(color::resolve_color(&c, v.color));
        }
        if let Some(Opacity(o)) = specified.get_non_inherited("stop-opacity") {
            v.stop_opacity = o;
        }

        v
    }

    fn opacity_if_inherited(&self, attrs: &Attributes, name: &str) -> f64 {
        if is_inherit(attrs, name) {
            self.opacity
        } else {
            1.0
        }
    }

    /// Computes the values for `node` by cascading from the root of its tree.
    pub fn for_node(node: &Node, params: &NormalizeParams, session: &Session) -> ComputedValues {
        let mut chain: Vec<Node> = node.ancestors().filter(|n| n.is_element()).collect();
        chain.reverse();

        chain
            .iter()
            .fold(ComputedValues::initial(params.font_size), |values, n| {
                values.cascade(n.borrow_element().attributes(), params, session)
            })
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Stroke width in user units.
    pub fn stroke_width(&self, params: &NormalizeParams) -> f64 {
        self.stroke_width.to_user(&params.with_font_size(self.font_size))
    }

    /// Dash lengths in user units; empty for solid lines, including the case where all
    /// the lengths are zero.
    pub fn dashes(&self, params: &NormalizeParams) -> Vec<f64> {
        let params = params.with_font_size(self.font_size);

        match self.stroke_dasharray.0 {
            Some(ref dashes) => {
                let mut v: Vec<f64> = dashes.iter().map(|d| d.to_user(&params)).collect();

                if v.iter().all(|d| *d == 0.0) {
                    return Vec::new();
                }

                // An odd number of values is repeated to yield an even number of values
                if v.len() % 2 == 1 {
                    v.extend_from_within(..);
                }

                v
            }

            None => Vec::new(),
        }
    }

    pub fn dash_offset(&self, params: &NormalizeParams) -> f64 {
        self.stroke_dashoffset
            .to_user(&params.with_font_size(self.font_size))
    }
}

fn is_inherit(attrs: &Attributes, name: &str) -> bool {
    attrs
        .get(name)
        .map_or(false, |v| v.trim().eq_ignore_ascii_case("inherit"))
}

/// Helper to look up and parse specified values, logging the invalid ones.
struct Specified<'a> {
    attrs: &'a Attributes,
    session: &'a Session,
}

impl Specified<'_> {
    /// Specified value of an inherited property; `inherit` counts as unspecified.
    fn get<T: Parse>(&self, name: &str) -> Option<T> {
        if is_inherit(self.attrs, name) {
            return None;
        }

        self.get_non_inherited(name)
    }

    /// `inherit` is not handled here; the caller has to do it for non-inherited
    /// properties that support it.
    fn get_non_inherited<T: Parse>(&self, name: &str) -> Option<T> {
        match self.attrs.parse(name)? {
            Ok(v) => Some(v),
            Err(e) => {
                svgops_log!(self.session, "(ignoring invalid property: {})", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iri::NodeId;

    fn params() -> NormalizeParams {
        NormalizeParams::new(100.0, 100.0, 12.0, 96.0)
    }

    fn cascade(parent: &ComputedValues, attrs: &[(&str, &str)]) -> ComputedValues {
        parent.cascade(
            &Attributes::from_strs(attrs),
            &params(),
            &Session::new_for_test_suite(),
        )
    }

    #[test]
    fn initial_values() {
        let v = ComputedValues::initial(12.0);
        assert_eq!(v.fill, PaintServer::SolidColor(Color::RGBA(color::black())));
        assert_eq!(v.stroke, PaintServer::None);
        assert_eq!(v.stroke_width(&params()), 1.0);
        assert_eq!(v.stroke_miterlimit, 4.0);
        assert!(v.is_visible());
    }

    #[test]
    fn inherited_properties_inherit() {
        let root = ComputedValues::initial(12.0);
        let parent = cascade(
            &root,
            &[("fill", "red"), ("stroke-width", "3"), ("opacity", "0.5")],
        );
        let child = cascade(&parent, &[]);

        assert_eq!(child.fill, parent.fill);
        assert_eq!(child.stroke_width(&params()), 3.0);

        // opacity is not inherited
        assert_eq!(parent.opacity, 0.5);
        assert_eq!(child.opacity, 1.0);

        let inherited = cascade(&parent, &[("opacity", "inherit")]);
        assert_eq!(inherited.opacity, 0.5);
    }

    #[test]
    fn style_declarations_apply() {
        let v = cascade(
            &ComputedValues::initial(12.0),
            &[("style", "fill-rule: evenodd; stroke-linecap: round")],
        );

        assert_eq!(v.fill_rule, FillRule::EvenOdd);
        assert_eq!(v.stroke_linecap, LineCap::Round);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let root = ComputedValues::initial(12.0);
        let parent = cascade(&root, &[("stroke-width", "2")]);
        let v = cascade(
            &parent,
            &[
                ("stroke-width", "-1"),
                ("fill-rule", "sideways"),
                ("fill-opacity", "lots"),
            ],
        );

        assert_eq!(v.stroke_width(&params()), 2.0);
        assert_eq!(v.fill_rule, FillRule::NonZero);
        assert_eq!(v.fill_opacity, 1.0);
    }

    #[test]
    fn current_color() {
        let v = cascade(
            &ComputedValues::initial(12.0),
            &[("color", "lime"), ("stop-color", "currentColor")],
        );

        assert_eq!(v.color, RGBA::new(0, 255, 0, 255));
        assert_eq!(v.stop_color, Color::RGBA(RGBA::new(0, 255, 0, 255)));
    }

    #[test]
    fn opacities_are_clamped() {
        let v = cascade(
            &ComputedValues::initial(12.0),
            &[("fill-opacity", "50%"), ("stroke-opacity", "2")],
        );

        assert_eq!(v.fill_opacity, 0.5);
        assert_eq!(v.stroke_opacity, 1.0);
    }

    #[test]
    fn font_sizes_are_relative_to_parent() {
        let root = ComputedValues::initial(12.0);
        let parent = cascade(&root, &[("font-size", "20")]);

        assert_eq!(cascade(&parent, &[("font-size", "2em")]).font_size, 40.0);
        assert_eq!(cascade(&parent, &[("font-size", "50%")]).font_size, 10.0);
    }

    #[test]
    fn font_weights() {
        let root = ComputedValues::initial(12.0);
        assert_eq!(cascade(&root, &[("font-weight", "bold")]).font_weight, 700);
        assert_eq!(cascade(&root, &[("font-weight", "bolder")]).font_weight, 700);
        assert_eq!(cascade(&root, &[("font-weight", "300")]).font_weight, 300);
        assert_eq!(cascade(&root, &[("font-weight", "0")]).font_weight, 400);
    }

    #[test]
    fn font_family_strips_quotes() {
        let v = cascade(
            &ComputedValues::initial(12.0),
            &[("font-family", "'DejaVu Sans', serif")],
        );
        assert_eq!(v.font_family, "DejaVu Sans, serif");
    }

    #[test]
    fn dasharrays() {
        let root = ComputedValues::initial(12.0);

        let v = cascade(&root, &[("stroke-dasharray", "5, 2 1")]);
        assert_eq!(v.dashes(&params()), vec![5.0, 2.0, 1.0, 5.0, 2.0, 1.0]);

        let v = cascade(&root, &[("stroke-dasharray", "0 0")]);
        assert!(v.dashes(&params()).is_empty());

        let v = cascade(&root, &[("stroke-dasharray", "none")]);
        assert!(v.dashes(&params()).is_empty());

        assert!(Dasharray::parse_str("1 -2").is_err());
    }

    #[test]
    fn marker_shorthand() {
        let v = cascade(
            &ComputedValues::initial(12.0),
            &[("marker", "url(#m)"), ("marker-mid", "none")],
        );

        let m = IRI::Resource(NodeId::Internal("m".to_string()));
        assert_eq!(v.marker_start, m);
        assert_eq!(v.marker_mid, IRI::None);
        assert_eq!(v.marker_end, m);
    }

    #[test]
    fn display_and_visibility() {
        let root = ComputedValues::initial(12.0);
        assert_eq!(cascade(&root, &[("display", "none")]).display, Display::None);
        assert_eq!(cascade(&root, &[("display", "block")]).display, Display::Inline);
        assert!(!cascade(&root, &[("visibility", "hidden")]).is_visible());
    }
}
