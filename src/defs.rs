//! Scoped registry of the elements that can be referenced by id.
//!
//! Every `<svg>` element, the root included, opens a scope.  Scopes form a tree that
//! mirrors the nesting of `<svg>` elements, and each scope has a prefix derived from its
//! parent's: the root's prefix is empty, and the second scope opened inside the root is
//! `s1:`, its first child scope `s1:s0:`, and so on.  An element with `id="a"` is stored
//! under the key `prefix + "a"` of the scope where it appears.
//!
//! Looking up `a` from a scope tries that scope's key first and then the keys of its
//! ancestors, innermost first.  So a scope sees its own definitions and those of its
//! ancestors, shadowing the latter when the same id is used, but never the definitions
//! of sibling scopes.
//!
//! The registry is an arena: scopes are never copied, and lookups walk up the parent
//! chain.

use std::collections::HashMap;

use markup5ever::QualName;

use crate::length::NormalizeParams;
use crate::node::{ElementKind, Node, NodeBorrow};

/// Index of a scope in a [`DefsRegistry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

struct Scope {
    parent: Option<ScopeId>,
    prefix: String,
    num_children: usize,

    /// Viewport of the `<svg>` that opened the scope.
    params: NormalizeParams,
}

/// An element registered under an id.
#[derive(Clone)]
pub struct Definition {
    pub node: Node,

    /// The scope where the element appears; references from inside it resolve there.
    pub scope: ScopeId,

    /// Scoped key, unique within a document.
    pub key: String,
}

impl Definition {
    pub fn kind(&self) -> ElementKind {
        self.node.borrow_element().kind()
    }
}

/// Keys of what [`DefsRegistry::discover`] found that needs further processing.
#[derive(Debug, Default, PartialEq)]
pub struct Discovered {
    /// Gradients declared in the scope.
    pub gradients: Vec<String>,

    /// Direct children of `<defs>` elements that can be compiled into reusable objects.
    pub objects: Vec<String>,

    /// Names of the SVG elements in the scope that are not supported.
    pub unsupported: Vec<String>,
}

pub struct DefsRegistry {
    scopes: Vec<Scope>,
    defs: HashMap<String, Definition>,
}

impl DefsRegistry {
    /// Creates a registry with just the root scope.
    pub fn new(root_params: NormalizeParams) -> DefsRegistry {
        DefsRegistry {
            scopes: vec![Scope {
                parent: None,
                prefix: String::new(),
                num_children: 0,
                params: root_params,
            }],
            defs: HashMap::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Opens a new scope as a child of `parent`.
    pub fn new_scope(&mut self, parent: ScopeId, params: NormalizeParams) -> ScopeId {
        let parent_scope = &mut self.scopes[parent.0];
        let prefix = format!("{}s{}:", parent_scope.prefix, parent_scope.num_children);
        parent_scope.num_children += 1;

        self.scopes.push(Scope {
            parent: Some(parent),
            prefix,
            num_children: 0,
            params,
        });

        ScopeId(self.scopes.len() - 1)
    }

    pub fn prefix(&self, scope: ScopeId) -> &str {
        &self.scopes[scope.0].prefix
    }

    pub fn params(&self, scope: ScopeId) -> &NormalizeParams {
        &self.scopes[scope.0].params
    }

    /// Registers `node` under `id` in `scope`.
    ///
    /// The first element registered for a key wins; returns the key if `node` was
    /// registered, or `None` if the key was already taken.
    pub fn insert(&mut self, scope: ScopeId, id: &str, node: Node) -> Option<String> {
        let key = format!("{}{}", self.prefix(scope), id);

        if self.defs.contains_key(&key) {
            return None;
        }

        self.defs.insert(
            key.clone(),
            Definition {
                node,
                scope,
                key: key.clone(),
            },
        );

        Some(key)
    }

    /// Looks up `id` from `scope`, trying enclosing scopes from the innermost out.
    pub fn lookup(&self, scope: ScopeId, id: &str) -> Option<&Definition> {
        let mut current = Some(scope);

        while let Some(s) = current {
            let key = format!("{}{}", self.prefix(s), id);

            if let Some(def) = self.defs.get(&key) {
                return Some(def);
            }

            current = self.scopes[s.0].parent;
        }

        None
    }

    pub fn get(&self, key: &str) -> Option<&Definition> {
        self.defs.get(key)
    }

    /// Registers every element with an id under `svg`, a scope's `<svg>` element.
    ///
    /// Nested `<svg>` elements are registered themselves, but their content belongs to
    /// their own scopes and is left alone.  The walk keeps its own stack, so arbitrarily
    /// deep documents do not exhaust the call stack.
    pub fn discover(&mut self, scope: ScopeId, svg: &Node) -> Discovered {
        let mut discovered = Discovered::default();

        // (node, kind of its parent element), popped in document order
        let mut stack: Vec<(Node, ElementKind)> = element_children(svg)
            .rev()
            .map(|c| (c, ElementKind::Svg))
            .collect();

        while let Some((node, parent_kind)) = stack.pop() {
            let (kind, id) = {
                let elt = node.borrow_element();

                if elt.kind() == ElementKind::Unknown
                    && parent_kind != ElementKind::Unknown
                    && is_unsupported_svg_element(elt.element_name())
                {
                    discovered
                        .unsupported
                        .push(elt.element_name().local.to_string());
                }

                (elt.kind(), elt.get_id().map(String::from))
            };

            if let Some(key) = id.and_then(|id| self.insert(scope, &id, node.clone())) {
                if kind.is_gradient() {
                    discovered.gradients.push(key);
                } else if parent_kind == ElementKind::Defs && is_compilable(kind) {
                    discovered.objects.push(key);
                }
            }

            if kind != ElementKind::Svg {
                stack.extend(element_children(&node).rev().map(|c| (c, kind)));
            }
        }

        discovered
    }
}

fn element_children(node: &Node) -> impl DoubleEndedIterator<Item = Node> {
    node.children()
        .filter(|c| c.is_element())
        .collect::<Vec<_>>()
        .into_iter()
}

/// SVG elements we do not compile.  Descriptive elements carry no content to lose, and
/// prefixed elements from editors' private vocabularies are not ours to report.
fn is_unsupported_svg_element(name: &QualName) -> bool {
    name.prefix.as_ref().map_or(true, |p| &**p == "svg")
        && !matches!(&*name.local, "title" | "desc" | "metadata")
}

fn is_compilable(kind: ElementKind) -> bool {
    !matches!(
        kind,
        ElementKind::Stop | ElementKind::Defs | ElementKind::Unknown
    ) && !kind.is_gradient()
}
