//! The main context structure which drives the compilation of a document.
//!
//! [`compile_document`] walks the tree of elements depth-first and calls a
//! [`DrawingEmitter`] for each thing to draw.  Along the way it keeps track of:
//!
//! * The [`DefsRegistry`], filled in as each `<svg>` scope is entered.  A whole scope is
//!   registered before any of its content is drawn, so references can point forward.
//!
//! * Reusable objects.  The children of `<defs>` are compiled once into objects when
//!   their scope is entered, and everything referenced by `<use>` or by a marker
//!   property is compiled on first use.  Each reference just invokes the object.
//!
//! * The transform last sent to the emitter, so that it is only sent when it changes.
//!
//! Content that is referenced from inside an object being compiled is drawn inline into
//! that object; objects are never nested.

use std::collections::HashMap;

use crate::bbox::{union_opt, BoundingBox};
use crate::defs::{DefsRegistry, Definition, ScopeId};
use crate::document::Document;
use crate::emitter::{DrawingEmitter, ImageEncoder, TextMeasurer};
use crate::error::Diagnostic;
use crate::gradient::ResolvedGradient;
use crate::image;
use crate::length::NormalizeParams;
use crate::marker::Marker;
use crate::node::{ElementKind, Node, NodeBorrow};
use crate::options::CompileOptions;
use crate::properties::{ComputedValues, Display};
use crate::session::Session;
use crate::shapes::{self, Shape};
use crate::structure::{self, Svg};
use crate::text;
use crate::transform::{parse_transform, Transform, TransformList};
use crate::viewbox::ViewBox;

/// What an element's children inherit while they are drawn.
#[derive(Clone)]
pub struct Frame {
    /// Computed values of the element.
    pub values: ComputedValues,

    /// Transform from the element's user space to the output space: the page, or the
    /// reusable object being compiled.
    pub transform: Transform,

    /// Parameters to resolve lengths in the element's user space.
    pub params: NormalizeParams,

    /// Scope where ids are resolved.
    pub scope: ScopeId,

    /// Nesting depth, counting references as one level.
    pub depth: usize,
}

/// The coordinate system that an element establishes for its content.
pub struct LocalSpace {
    /// Maps the content to the element's parent user space.
    pub transform: Transform,

    pub params: NormalizeParams,
}

/// How a definition is laid out as a reusable object.
pub struct ObjectSpace {
    /// Maps the object's content to the space where it is placed.
    pub local: Transform,

    /// Box of the object's content, in the object's own coordinates.
    pub bbox: BoundingBox,

    /// Parameters to resolve lengths in the object's content.
    pub params: NormalizeParams,

    /// Computed values of the definition, cascaded from its ancestors in the document.
    pub values: ComputedValues,
}

/// Properties that are recognized but have no effect on the output.
const UNSUPPORTED_PROPERTIES: [&str; 3] = ["clip-path", "mask", "filter"];

pub struct DrawingCtx<'a> {
    session: Session,

    emitter: &'a mut dyn DrawingEmitter,
    text_measurer: Option<&'a dyn TextMeasurer>,
    image_encoder: Option<&'a dyn ImageEncoder>,

    max_depth: usize,
    depth_reported: bool,

    defs: DefsRegistry,

    /// Scopes of the `<svg>` elements entered so far, by element index.
    svg_scopes: HashMap<usize, ScopeId>,

    /// Gradients already announced to the emitter, by scoped key.
    gradients: HashMap<String, ResolvedGradient>,

    /// Objects already compiled, by scoped key.
    objects: HashMap<String, BoundingBox>,

    /// Whether content currently goes into a reusable object.
    in_object: bool,

    /// Element indices of the definitions being drawn, to detect reference cycles.
    instancing: Vec<usize>,

    /// Mirror of the emitter's transform, one entry per pushed state.
    transforms: Vec<Transform>,
}

/// Compiles a whole document into calls to `emitter`.
///
/// This never fails; whatever could not be compiled is reported to the document's
/// [`Session`].
pub fn compile_document(
    document: &Document,
    emitter: &mut dyn DrawingEmitter,
    options: &CompileOptions,
    text_measurer: Option<&dyn TextMeasurer>,
    image_encoder: Option<&dyn ImageEncoder>,
) {
    let session = document.session().clone();
    let root = document.root();

    let (values, viewport, transform) = {
        let elt = root.borrow_element();
        let attrs = elt.attributes();

        let Some(viewport) =
            Svg::from_attributes(attrs, &session).root_viewport(options.font_size, options.dpi)
        else {
            svgops_log!(session, "(root viewport is empty; not drawing anything)");
            return;
        };

        let values = ComputedValues::initial(options.font_size).cascade(
            attrs,
            &viewport.params,
            &session,
        );

        let transform = attrs
            .get_attribute("transform")
            .map_or_else(Transform::identity, parse_transform)
            .pre_transform(&viewport.transform);

        (values, viewport, transform)
    };

    if values.display == Display::None {
        return;
    }

    let mut dc = DrawingCtx {
        session,
        emitter,
        text_measurer,
        image_encoder,
        max_depth: options.max_depth,
        depth_reported: false,
        defs: DefsRegistry::new(viewport.params),
        svg_scopes: HashMap::new(),
        gradients: HashMap::new(),
        objects: HashMap::new(),
        in_object: false,
        instancing: Vec::new(),
        transforms: vec![Transform::identity()],
    };

    dc.report_unsupported(&root);

    let scope = dc.enter_svg(&root, None, viewport.params);

    let frame = Frame {
        params: viewport.params.with_font_size(values.font_size),
        values,
        transform,
        scope,
        depth: 0,
    };

    dc.with_saved_state(frame.values.opacity, |dc| dc.draw_children(&root, &frame));
}

impl<'a> DrawingCtx<'a> {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn emitter(&mut self) -> &mut (dyn DrawingEmitter + 'a) {
        &mut *self.emitter
    }

    pub fn text_measurer(&self) -> Option<&'a dyn TextMeasurer> {
        self.text_measurer
    }

    pub fn image_encoder(&self) -> Option<&'a dyn ImageEncoder> {
        self.image_encoder
    }

    /// Looks up `id` from `scope` and its ancestors.
    pub fn lookup(&self, scope: ScopeId, id: &str) -> Option<Definition> {
        self.defs.lookup(scope, id).cloned()
    }

    /// Sets the emitter's transform, unless it is already set to `transform`.
    pub fn set_transform(&mut self, transform: &Transform) {
        match self.transforms.last_mut() {
            Some(current) if *current == *transform => (),

            Some(current) => {
                *current = *transform;
                self.emitter.set_transform(transform);
            }

            None => self.emitter.set_transform(transform),
        }
    }

    /// Resolves a gradient, announcing it to the emitter the first time.
    pub fn gradient(&mut self, def: &Definition) -> ResolvedGradient {
        if let Some(gradient) = self.gradients.get(&def.key) {
            return gradient.clone();
        }

        let gradient = ResolvedGradient::resolve(def, &self.defs, &self.session);
        self.emitter.register_gradient(&def.key, &gradient.paint);
        self.gradients.insert(def.key.clone(), gradient.clone());

        gradient
    }

    /// Returns the scope of an `<svg>` element, registering its definitions the first
    /// time.
    ///
    /// `parent` is the scope where the element appears, or `None` for the root.
    pub fn enter_svg(
        &mut self,
        node: &Node,
        parent: Option<ScopeId>,
        params: NormalizeParams,
    ) -> ScopeId {
        let index = node.borrow_element().index();

        if let Some(scope) = self.svg_scopes.get(&index) {
            return *scope;
        }

        let scope = match parent {
            Some(parent) => self.defs.new_scope(parent, params),
            None => self.defs.root(),
        };

        self.svg_scopes.insert(index, scope);

        let discovered = self.defs.discover(scope, node);

        for name in &discovered.unsupported {
            self.session
                .report(Diagnostic::unsupported(&format!("{name} elements")));
        }

        for key in &discovered.gradients {
            if let Some(def) = self.defs.get(key).cloned() {
                self.gradient(&def);
            }
        }

        if !self.in_object {
            for key in &discovered.objects {
                if let Some(def) = self.defs.get(key).cloned() {
                    self.compile_object(&def);
                }
            }
        }

        scope
    }

    /// Draws the element children of `node`.
    pub fn draw_children(&mut self, node: &Node, frame: &Frame) {
        for child in node.children().filter(|c| c.is_element()) {
            self.draw_node(&child, frame);
        }
    }

    fn draw_node(&mut self, node: &Node, parent: &Frame) {
        let Some(kind) = node.element_kind() else {
            return;
        };

        if matches!(
            kind,
            ElementKind::Unknown | ElementKind::Defs | ElementKind::Stop | ElementKind::TSpan
        ) || kind.is_definition_only()
        {
            return;
        }

        let depth = parent.depth + 1;
        if !self.check_depth(depth) {
            return;
        }

        let values = parent.values.cascade(
            node.borrow_element().attributes(),
            &parent.params,
            &self.session,
        );

        if values.display == Display::None {
            return;
        }

        self.report_unsupported(node);

        let params = parent.params.with_font_size(values.font_size);

        let Some(space) = local_space(node, &params, &self.session) else {
            svgops_log!(
                self.session,
                "(not drawing {} with an empty viewport)",
                *node.borrow()
            );
            return;
        };

        let frame = Frame {
            transform: parent.transform.pre_transform(&space.transform),
            params: space.params.with_font_size(values.font_size),
            scope: parent.scope,
            depth,
            values,
        };

        self.with_saved_state(frame.values.opacity, |dc| {
            dc.draw_content(kind, node, &frame)
        });
    }

    fn draw_content(&mut self, kind: ElementKind, node: &Node, frame: &Frame) {
        match kind {
            ElementKind::Svg => structure::draw_svg(self, node, frame),
            ElementKind::Group | ElementKind::Anchor => self.draw_children(node, frame),
            ElementKind::Use => structure::draw_use(self, node, frame),
            ElementKind::Image => image::draw_image(self, node, frame),
            ElementKind::Text => text::draw_text(self, node, frame),
            _ if kind.is_shape() => shapes::draw_shape(self, node, frame),
            _ => (),
        }
    }

    fn check_depth(&mut self, depth: usize) -> bool {
        if depth <= self.max_depth {
            return true;
        }

        self.report_too_deep();
        false
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Reports the nesting limit once per compilation.
    pub fn report_too_deep(&mut self) {
        if !self.depth_reported {
            self.depth_reported = true;
            self.session.report(Diagnostic::unsupported(
                "documents nested deeper than the maximum depth",
            ));
        }
    }

    /// Reports what `node` asks for that is not compiled.
    fn report_unsupported(&self, node: &Node) {
        let elt = node.borrow_element();
        let attrs = elt.attributes();

        if let Some(transform) = attrs.get_attribute("transform") {
            TransformList::parse_lenient(transform).report_skipped(&self.session);
        }

        for property in UNSUPPORTED_PROPERTIES {
            if attrs.get(property).map_or(false, |v| v.trim() != "none") {
                self.session
                    .report(Diagnostic::unsupported(&format!("the {property} property")));
            }
        }
    }

    /// Runs `draw_fn` between a push and a pop of the graphics state.
    fn with_saved_state(&mut self, opacity: f64, draw_fn: impl FnOnce(&mut DrawingCtx<'a>)) {
        let current = self
            .transforms
            .last()
            .copied()
            .unwrap_or_else(Transform::identity);

        self.emitter.push_state();
        self.transforms.push(current);

        if opacity < 1.0 {
            self.emitter.set_opacity(opacity);
        }

        draw_fn(self);

        self.transforms.pop();
        self.emitter.pop_state();
    }

    /// Places a definition referenced by `<use>` or by a marker property.
    ///
    /// `placement` gets the layout of the definition as an object, and returns the
    /// transform from the object's space to the output space, or `None` to not draw it.
    pub fn place_reference(
        &mut self,
        def: &Definition,
        depth: usize,
        placement: impl FnOnce(&ObjectSpace) -> Option<Transform>,
    ) {
        let index = def.node.borrow_element().index();

        if self.instancing.contains(&index) {
            let id = def.node.borrow_element().get_id().unwrap_or_default().to_string();
            self.session.report(Diagnostic::unsupported(&format!(
                "circular reference to #{id}"
            )));
            return;
        }

        if !self.check_depth(depth + 1) {
            return;
        }

        let Some(space) = self.object_space(def) else {
            svgops_log!(self.session, "(not drawing {} with an empty viewport)", def.key);
            return;
        };

        let Some(placement) = placement(&space) else {
            return;
        };

        if self.in_object {
            self.instancing.push(index);
            let transform = placement.pre_transform(&space.local);
            self.draw_object_content(def, &space, transform, depth + 1);
            self.instancing.pop();
        } else {
            self.compile_object(def);

            if self.objects.contains_key(&def.key) {
                self.emitter.invoke_object(&def.key, &placement);
            }
        }
    }

    /// Compiles a definition into a reusable object, unless it is compiled already.
    fn compile_object(&mut self, def: &Definition) {
        if self.in_object || self.objects.contains_key(&def.key) {
            return;
        }

        let Some(space) = self.object_space(def) else {
            svgops_log!(self.session, "(not compiling {} with an empty viewport)", def.key);
            return;
        };

        let index = def.node.borrow_element().index();

        self.emitter.begin_object(&def.key, &space.bbox, &space.local);
        self.transforms.push(Transform::identity());
        self.in_object = true;
        self.instancing.push(index);

        self.draw_object_content(def, &space, Transform::identity(), 0);

        self.instancing.pop();
        self.in_object = false;
        self.transforms.pop();
        self.emitter.end_object();

        self.objects.insert(def.key.clone(), space.bbox);
    }

    fn draw_object_content(
        &mut self,
        def: &Definition,
        space: &ObjectSpace,
        transform: Transform,
        depth: usize,
    ) {
        if space.values.display == Display::None {
            return;
        }

        self.report_unsupported(&def.node);

        let kind = def.kind();

        let frame = Frame {
            values: space.values.clone(),
            transform,
            params: space.params.with_font_size(space.values.font_size),
            scope: def.scope,
            depth,
        };

        self.with_saved_state(frame.values.opacity, |dc| match kind {
            ElementKind::Marker | ElementKind::Symbol => dc.draw_children(&def.node, &frame),
            _ => dc.draw_content(kind, &def.node, &frame),
        });
    }

    /// Lays out a definition as a reusable object; `None` if it has an empty viewport.
    fn object_space(&self, def: &Definition) -> Option<ObjectSpace> {
        let params = *self.defs.params(def.scope);
        let values = ComputedValues::for_node(&def.node, &params, &self.session);
        let params = params.with_font_size(values.font_size);

        let elt = def.node.borrow_element();

        match elt.kind() {
            ElementKind::Marker => {
                let marker = Marker::from_attributes(elt.attributes(), &self.session);
                let (local, bbox, params) = marker.content_space(&params)?;

                Some(ObjectSpace {
                    local,
                    bbox,
                    params,
                    values,
                })
            }

            ElementKind::Symbol => {
                let vbox: Option<ViewBox> = elt.attributes().parse_valid("viewBox", &self.session);

                let params = vbox.map_or(params, |v| params.with_viewport(v.width(), v.height()));

                let bbox = vbox
                    .map(|v| BoundingBox::from_rect(&v))
                    .or_else(|| self.content_bbox(&def.node, &params, 0))
                    .unwrap_or_default();

                Some(ObjectSpace {
                    local: Transform::identity(),
                    bbox,
                    params,
                    values,
                })
            }

            _ => {
                let space = local_space(&def.node, &params, &self.session)?;
                let bbox = self
                    .content_bbox(&def.node, &space.params, 0)
                    .unwrap_or_default();

                Some(ObjectSpace {
                    local: space.transform,
                    bbox,
                    params: space.params,
                    values,
                })
            }
        }
    }

    /// Untransformed bounding box of an element's content, in its own user space.
    ///
    /// Containers union the boxes of their children, each mapped through the child's
    /// local transform.  `<use>` and text have no box here.
    pub fn content_bbox(
        &self,
        node: &Node,
        params: &NormalizeParams,
        depth: usize,
    ) -> Option<BoundingBox> {
        if depth > self.max_depth {
            return None;
        }

        let elt = node.borrow_element();
        let kind = elt.kind();

        match kind {
            _ if kind.is_shape() => Shape::from_element(kind, elt.attributes(), params)
                .ok()
                .and_then(|shape| shape.bbox()),

            ElementKind::Image => image::image_rect(elt.attributes(), params)
                .ok()
                .map(|r| BoundingBox::from_rect(&r)),

            ElementKind::Svg => Svg::from_attributes(elt.attributes(), &self.session)
                .content_bounds(params)
                .map(|r| BoundingBox::from_rect(&r)),

            ElementKind::Group
            | ElementKind::Anchor
            | ElementKind::Symbol
            | ElementKind::Marker => node
                .children()
                .filter(|c| match c.element_kind() {
                    Some(k) => {
                        !k.is_definition_only()
                            && !matches!(k, ElementKind::Defs | ElementKind::Unknown)
                    }
                    None => false,
                })
                .fold(None, |bbox, child| {
                    let Some(space) = local_space(&child, params, &self.session) else {
                        return bbox;
                    };

                    let child_bbox = self
                        .content_bbox(&child, &space.params, depth + 1)
                        .map(|b| b.transform(&space.transform));

                    union_opt(bbox, child_bbox)
                }),

            _ => None,
        }
    }
}

/// Computes the coordinate system that `node` establishes for its content.
///
/// This is the `transform` attribute and, for a nested `<svg>`, its viewport.  Returns
/// `None` for an `<svg>` with an empty viewport.
pub fn local_space(node: &Node, params: &NormalizeParams, session: &Session) -> Option<LocalSpace> {
    let elt = node.borrow_element();
    let attrs = elt.attributes();

    let transform = attrs
        .get_attribute("transform")
        .map_or_else(Transform::identity, parse_transform);

    if elt.kind() == ElementKind::Svg {
        let viewport = Svg::from_attributes(attrs, session).nested_viewport(params)?;

        Some(LocalSpace {
            transform: transform.pre_transform(&viewport.transform),
            params: viewport.params,
        })
    } else {
        Some(LocalSpace {
            transform,
            params: *params,
        })
    }
}
