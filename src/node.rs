//! Tree nodes, the representation of SVG elements.
//!
//! We use the [rctree crate][rctree] to represent the SVG tree of elements.  Its
//! [`rctree::Node`] struct provides a generic wrapper over nodes in a tree; we put a
//! [`NodeData`] as its type parameter and call the result [`Node`].
//!
//! The tree is never modified after loading.  The compiler keeps its own bookkeeping of
//! which nodes it has already registered or compiled, keyed by [`Element::index`].
//!
//! [rctree]: https://docs.rs/rctree

use markup5ever::QualName;
use std::cell::Ref;
use std::fmt;

use crate::text::Chars;
use crate::xml::Attributes;

/// Strong reference to an element in the SVG tree.
pub type Node = rctree::Node<NodeData>;

/// Data for a single DOM node.
///
/// Between elements there are usually text nodes with just whitespace; we only keep
/// text inside the elements that render it.
pub enum NodeData {
    Element(Box<Element>),
    Text(Box<Chars>),
}

impl NodeData {
    pub fn new_element(index: usize, name: &QualName, attributes: Attributes) -> NodeData {
        NodeData::Element(Box::new(Element::new(index, name, attributes)))
    }

    pub fn new_chars(initial_text: &str) -> NodeData {
        NodeData::Text(Box::new(Chars::new(initial_text)))
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NodeData::Element(ref e) => write!(f, "{e}"),
            NodeData::Text(_) => write!(f, "Chars"),
        }
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// The element kinds we know how to compile.
///
/// Everything else is [`ElementKind::Unknown`] and is skipped along with its subtree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Svg,
    Group,
    Anchor,
    Defs,
    Symbol,
    Marker,
    Use,
    Rect,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
    Path,
    LinearGradient,
    RadialGradient,
    Stop,
    Image,
    Text,
    TSpan,
    Unknown,
}

impl ElementKind {
    pub fn from_local_name(name: &str) -> ElementKind {
        match name {
            "svg" => ElementKind::Svg,
            "g" => ElementKind::Group,
            "a" => ElementKind::Anchor,
            "defs" => ElementKind::Defs,
            "symbol" => ElementKind::Symbol,
            "marker" => ElementKind::Marker,
            "use" => ElementKind::Use,
            "rect" => ElementKind::Rect,
            "circle" => ElementKind::Circle,
            "ellipse" => ElementKind::Ellipse,
            "line" => ElementKind::Line,
            "polyline" => ElementKind::Polyline,
            "polygon" => ElementKind::Polygon,
            "path" => ElementKind::Path,
            "linearGradient" => ElementKind::LinearGradient,
            "radialGradient" => ElementKind::RadialGradient,
            "stop" => ElementKind::Stop,
            "image" => ElementKind::Image,
            "text" => ElementKind::Text,
            "tspan" => ElementKind::TSpan,
            _ => ElementKind::Unknown,
        }
    }

    pub fn is_gradient(self) -> bool {
        matches!(self, ElementKind::LinearGradient | ElementKind::RadialGradient)
    }

    /// Basic shapes and paths.
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            ElementKind::Rect
                | ElementKind::Circle
                | ElementKind::Ellipse
                | ElementKind::Line
                | ElementKind::Polyline
                | ElementKind::Polygon
                | ElementKind::Path
        )
    }

    /// Elements that never render where they appear, only through a reference.
    pub fn is_definition_only(self) -> bool {
        self.is_gradient() || matches!(self, ElementKind::Symbol | ElementKind::Marker)
    }

    /// Elements that establish a new viewport and a new scope for ids.
    pub fn establishes_scope(self) -> bool {
        self == ElementKind::Svg
    }
}

/// An SVG element.
pub struct Element {
    index: usize,
    kind: ElementKind,
    element_name: QualName,
    attributes: Attributes,
}

impl Element {
    fn new(index: usize, name: &QualName, attributes: Attributes) -> Element {
        Element {
            index,
            kind: ElementKind::from_local_name(&name.local),
            element_name: name.clone(),
            attributes,
        }
    }

    /// Position of the element in document order; unique within a document.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn element_name(&self) -> &QualName {
        &self.element_name
    }

    pub fn get_id(&self) -> Option<&str> {
        self.attributes.get_id()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element_name.local)?;
        write!(f, " id={}", self.get_id().unwrap_or("None"))?;
        Ok(())
    }
}

/// Helper trait to get different NodeData variants
pub trait NodeBorrow {
    /// Returns `false` for NodeData::Text, `true` otherwise.
    fn is_element(&self) -> bool;

    /// Returns `true` for NodeData::Text, `false` otherwise.
    fn is_chars(&self) -> bool;

    /// Borrows a `Chars` reference.
    ///
    /// Panics: will panic if `&self` is not a `NodeData::Text` node
    fn borrow_chars(&self) -> Ref<'_, Chars>;

    /// Borrows an `Element` reference
    ///
    /// Panics: will panic if `&self` is not a `NodeData::Element` node
    fn borrow_element(&self) -> Ref<'_, Element>;

    /// Kind of the element, or `None` for text nodes.
    fn element_kind(&self) -> Option<ElementKind>;
}

impl NodeBorrow for Node {
    fn is_element(&self) -> bool {
        matches!(*self.borrow(), NodeData::Element(_))
    }

    fn is_chars(&self) -> bool {
        matches!(*self.borrow(), NodeData::Text(_))
    }

    fn borrow_chars(&self) -> Ref<'_, Chars> {
        Ref::map(self.borrow(), |n| match n {
            NodeData::Text(c) => &**c,
            _ => panic!("tried to borrow_chars for a non-text node"),
        })
    }

    fn borrow_element(&self) -> Ref<'_, Element> {
        Ref::map(self.borrow(), |n| match n {
            NodeData::Element(e) => &**e,
            _ => panic!("tried to borrow_element for a non-element node"),
        })
    }

    fn element_kind(&self) -> Option<ElementKind> {
        match *self.borrow() {
            NodeData::Element(ref e) => Some(e.kind()),
            NodeData::Text(_) => None,
        }
    }
}
