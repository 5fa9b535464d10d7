//! Structural elements in SVG: the `svg`, `symbol` and `use` elements.
//!
//! Groups and anchors need no code of their own; the drawing context just draws their
//! children.

use crate::aspect_ratio::AspectRatio;
use crate::bbox::BoundingBox;
use crate::drawing_ctx::{DrawingCtx, Frame, ObjectSpace};
use crate::error::Diagnostic;
use crate::iri::NodeId;
use crate::length::*;
use crate::node::{ElementKind, Node, NodeBorrow};
use crate::rect::Rect;
use crate::session::Session;
use crate::transform::Transform;
use crate::viewbox::ViewBox;
use crate::xml::Attributes;

/// A viewport established by an `<svg>` element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    /// Maps the element's content to its parent's user space.
    pub transform: Transform,

    /// Parameters to resolve lengths in the content.
    pub params: NormalizeParams,

    /// The viewport rectangle, in the parent's user space.
    pub bounds: Rect,
}

/// The `<svg>` element.
pub struct Svg {
    x: Length<Horizontal>,
    y: Length<Vertical>,
    width: Option<Length<Horizontal>>,
    height: Option<Length<Vertical>>,
    vbox: Option<ViewBox>,
    preserve_aspect_ratio: AspectRatio,
}

impl Svg {
    pub fn from_attributes(attrs: &Attributes, session: &Session) -> Svg {
        Svg {
            x: attrs.parse_valid("x", session).unwrap_or_default(),
            y: attrs.parse_valid("y", session).unwrap_or_default(),
            width: attrs.parse_valid("width", session),
            height: attrs.parse_valid("height", session),
            vbox: attrs.parse_valid("viewBox", session),
            preserve_aspect_ratio: attrs
                .parse_valid("preserveAspectRatio", session)
                .unwrap_or_default(),
        }
    }

    /// Viewport of the outermost `<svg>`.
    ///
    /// There is no enclosing viewport, so percentages in `width` and `height` are
    /// relative to the viewBox, or to 100x100 if there is none; a missing size is the
    /// viewBox's size, or 100.  The `x` and `y` attributes do not apply.
    pub fn root_viewport(&self, font_size: f64, dpi: f64) -> Option<Viewport> {
        let (vbox_width, vbox_height) = self
            .vbox
            .map_or((100.0, 100.0), |vbox| (vbox.width(), vbox.height()));

        let params = NormalizeParams::new(vbox_width, vbox_height, font_size, dpi);

        let width = self.width.map_or(vbox_width, |w| w.to_user(&params));
        let height = self.height.map_or(vbox_height, |h| h.to_user(&params));

        self.viewport(Rect::from_size(width, height), &params)
    }

    /// Viewport of an `<svg>` nested in another one, whose user space has `params`.
    ///
    /// A missing size means `100%`.  Returns `None` if the viewport is empty.
    pub fn nested_viewport(&self, params: &NormalizeParams) -> Option<Viewport> {
        let x = self.x.to_user(params);
        let y = self.y.to_user(params);

        let width = self
            .width
            .unwrap_or(Length::new(1.0, LengthUnit::Percent))
            .to_user(params);
        let height = self
            .height
            .unwrap_or(Length::new(1.0, LengthUnit::Percent))
            .to_user(params);

        if width <= 0.0 || height <= 0.0 {
            return None;
        }

        self.viewport(Rect::from_origin_size(x, y, width, height), params)
    }

    fn viewport(&self, bounds: Rect, params: &NormalizeParams) -> Option<Viewport> {
        let transform = self
            .preserve_aspect_ratio
            .viewport_to_viewbox_transform(self.vbox, &bounds)?;

        let params = match self.vbox {
            Some(vbox) => params.with_viewport(vbox.width(), vbox.height()),
            None => params.with_viewport(bounds.width(), bounds.height()),
        };

        Some(Viewport {
            transform,
            params,
            bounds,
        })
    }

    /// The area of the content, in the content's coordinates.
    ///
    /// This is the viewBox if there is one, or else the viewport's size.
    pub fn content_bounds(&self, params: &NormalizeParams) -> Option<Rect> {
        if let Some(vbox) = self.vbox {
            return Some(*vbox);
        }

        self.nested_viewport(params)
            .map(|vp| Rect::from_size(vp.bounds.width(), vp.bounds.height()))
    }
}

/// Draws a nested `<svg>`.  Its content goes into a new scope.
pub fn draw_svg(dc: &mut DrawingCtx<'_>, node: &Node, frame: &Frame) {
    let scope = dc.enter_svg(node, Some(frame.scope), frame.params);

    let frame = Frame {
        scope,
        ..frame.clone()
    };

    dc.draw_children(node, &frame);
}

/// The `<symbol>` element, as instantiated by `<use>`.
pub struct Symbol {
    vbox: Option<ViewBox>,
    preserve_aspect_ratio: AspectRatio,
}

impl Symbol {
    pub fn from_attributes(attrs: &Attributes, session: &Session) -> Symbol {
        Symbol {
            vbox: attrs.parse_valid("viewBox", session),
            preserve_aspect_ratio: attrs
                .parse_valid("preserveAspectRatio", session)
                .unwrap_or_default(),
        }
    }

    /// Transform from the symbol's content to a viewport of `width` by `height` at
    /// the origin.
    fn placement(&self, width: f64, height: f64) -> Option<Transform> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }

        self.preserve_aspect_ratio
            .viewport_to_viewbox_transform(self.vbox, &Rect::from_size(width, height))
    }
}

/// The `<use>` element.
pub struct Use {
    link: Option<NodeId>,
    x: Length<Horizontal>,
    y: Length<Vertical>,
    width: Option<Length<Horizontal>>,
    height: Option<Length<Vertical>>,
}

impl Use {
    pub fn from_attributes(attrs: &Attributes, session: &Session) -> Use {
        let link = attrs.get_href().and_then(|href| match NodeId::parse(href) {
            Ok(id) => Some(id),
            Err(e) => {
                svgops_log!(session, "(ignoring invalid href \"{}\": {})", href, e);
                None
            }
        });

        Use {
            link,
            x: attrs.parse_valid("x", session).unwrap_or_default(),
            y: attrs.parse_valid("y", session).unwrap_or_default(),
            width: attrs.parse_valid("width", session),
            height: attrs.parse_valid("height", session),
        }
    }

    /// Requested size, if both dimensions are given and positive.
    fn size(&self, params: &NormalizeParams) -> Option<(f64, f64)> {
        let w = self.width?.to_user(params);
        let h = self.height?.to_user(params);

        if w > 0.0 && h > 0.0 {
            Some((w, h))
        } else {
            None
        }
    }

    /// Transform for a non-symbol target: scaled to the requested size when there is
    /// one and the object's box is not empty.
    fn scale_to_size(&self, params: &NormalizeParams, bbox: &BoundingBox) -> Transform {
        match self.size(params) {
            Some((w, h)) if !bbox.is_empty() => {
                Transform::new_scale(w / bbox.width, h / bbox.height)
            }

            _ => Transform::identity(),
        }
    }
}

/// Places the definition referenced by a `<use>`.
pub fn draw_use(dc: &mut DrawingCtx<'_>, node: &Node, frame: &Frame) {
    let session = dc.session().clone();
    let use_ = Use::from_attributes(node.borrow_element().attributes(), &session);

    let Some(link) = use_.link.as_ref() else {
        svgops_log!(session, "(use element without a link)");
        return;
    };

    let Some(id) = link.internal() else {
        session.report(Diagnostic::unsupported("references to external documents"));
        return;
    };

    let Some(def) = dc.lookup(frame.scope, id) else {
        session.report(Diagnostic::unresolved(&link.to_string()));
        return;
    };

    let kind = def.kind();
    if kind.is_gradient()
        || matches!(
            kind,
            ElementKind::Marker | ElementKind::Stop | ElementKind::Defs | ElementKind::Unknown
        )
    {
        svgops_log!(
            session,
            "(use element references a non-drawable {})",
            *def.node.borrow()
        );
        return;
    }

    let params = &frame.params;
    let origin = frame
        .transform
        .pre_translate(use_.x.to_user(params), use_.y.to_user(params));

    if kind == ElementKind::Symbol {
        let symbol = Symbol::from_attributes(def.node.borrow_element().attributes(), &session);

        let width = use_
            .width
            .unwrap_or(Length::new(1.0, LengthUnit::Percent))
            .to_user(params);
        let height = use_
            .height
            .unwrap_or(Length::new(1.0, LengthUnit::Percent))
            .to_user(params);

        dc.place_reference(&def, frame.depth, |_| {
            symbol
                .placement(width, height)
                .map(|t| origin.pre_transform(&t))
        });
    } else {
        dc.place_reference(&def, frame.depth, |space: &ObjectSpace| {
            Some(origin.pre_transform(&use_.scale_to_size(params, &space.bbox)))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_eq::ApproxEqUnits;

    fn svg(attrs: &[(&str, &str)]) -> Svg {
        Svg::from_attributes(&Attributes::from_strs(attrs), &Session::new_for_test_suite())
    }

    fn params() -> NormalizeParams {
        NormalizeParams::new(200.0, 100.0, 12.0, 96.0)
    }

    #[test]
    fn root_viewport_defaults() {
        let vp = svg(&[]).root_viewport(12.0, 96.0).unwrap();
        assert_eq!(vp.bounds, Rect::from_size(100.0, 100.0));
        assert!(vp.transform.is_identity());
        assert_eq!((vp.params.vbox_width, vp.params.vbox_height), (100.0, 100.0));
    }

    #[test]
    fn root_viewport_takes_size_from_viewbox() {
        let vp = svg(&[("viewBox", "0 0 50 20")]).root_viewport(12.0, 96.0).unwrap();
        assert_eq!(vp.bounds, Rect::from_size(50.0, 20.0));
        assert!(vp.transform.is_identity());
    }

    #[test]
    fn root_viewport_ignores_position() {
        let vp = svg(&[("x", "10"), ("width", "1in"), ("height", "50%")])
            .root_viewport(12.0, 96.0)
            .unwrap();

        assert_eq!(vp.bounds, Rect::from_size(96.0, 50.0));
        assert!(vp.transform.is_identity());
    }

    #[test]
    fn root_viewport_scales_viewbox() {
        let vp = svg(&[("width", "200"), ("height", "200"), ("viewBox", "0 0 100 100")])
            .root_viewport(12.0, 96.0)
            .unwrap();

        assert_eq!(vp.transform, Transform::new_scale(2.0, 2.0));
        assert_eq!((vp.params.vbox_width, vp.params.vbox_height), (100.0, 100.0));
    }

    #[test]
    fn nested_viewport_defaults_to_parent_size() {
        let vp = svg(&[("x", "10"), ("y", "20")]).nested_viewport(&params()).unwrap();

        assert_eq!(vp.bounds, Rect::from_origin_size(10.0, 20.0, 200.0, 100.0));
        assert_eq!(vp.transform, Transform::new_translate(10.0, 20.0));
    }

    #[test]
    fn nested_viewport_with_viewbox() {
        let vp = svg(&[
            ("width", "50%"),
            ("height", "50"),
            ("viewBox", "0 0 10 10"),
            ("preserveAspectRatio", "xMinYMin meet"),
        ])
        .nested_viewport(&params())
        .unwrap();

        let (x, y) = vp.transform.transform_point(10.0, 10.0);
        assert!(x.approx_eq_units(50.0));
        assert!(y.approx_eq_units(50.0));
        assert_eq!((vp.params.vbox_width, vp.params.vbox_height), (10.0, 10.0));
    }

    #[test]
    fn empty_nested_viewport_is_disabled() {
        assert!(svg(&[("width", "0")]).nested_viewport(&params()).is_none());
        assert!(svg(&[("viewBox", "0 0 0 10")])
            .nested_viewport(&params())
            .is_none());
    }

    #[test]
    fn content_bounds_prefer_viewbox() {
        assert_eq!(
            svg(&[("viewBox", "5 5 10 10")]).content_bounds(&params()),
            Some(Rect::new(5.0, 5.0, 15.0, 15.0))
        );
        assert_eq!(
            svg(&[("x", "5"), ("width", "10"), ("height", "20")]).content_bounds(&params()),
            Some(Rect::from_size(10.0, 20.0))
        );
    }

    #[test]
    fn use_scales_only_with_positive_sizes() {
        let session = Session::new_for_test_suite();
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 20.0);

        let u = Use::from_attributes(
            &Attributes::from_strs(&[("href", "#a"), ("width", "20"), ("height", "10")]),
            &session,
        );
        assert_eq!(u.scale_to_size(&params(), &bbox), Transform::new_scale(2.0, 0.5));

        let u = Use::from_attributes(
            &Attributes::from_strs(&[("href", "#a"), ("width", "20"), ("height", "0")]),
            &session,
        );
        assert!(u.scale_to_size(&params(), &bbox).is_identity());

        let u = Use::from_attributes(&Attributes::from_strs(&[("width", "20")]), &session);
        assert!(u.scale_to_size(&params(), &bbox).is_identity());
        assert!(u.link.is_none());
    }

    #[test]
    fn symbol_placement() {
        let session = Session::new_for_test_suite();
        let symbol = Symbol::from_attributes(
            &Attributes::from_strs(&[("viewBox", "0 0 10 10")]),
            &session,
        );

        assert_eq!(symbol.placement(20.0, 20.0), Some(Transform::new_scale(2.0, 2.0)));
        assert_eq!(symbol.placement(0.0, 20.0), None);
    }
}
