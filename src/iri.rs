//! References to other elements: `url(#id)` values and `href` attributes.

use std::fmt;

use cssparser::Parser;

use crate::error::*;
use crate::parsers::Parse;

/// Identifier of a node
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum NodeId {
    /// element id
    Internal(String),
    /// url, element id
    External(String, String),
}

impl NodeId {
    pub fn parse(href: &str) -> Result<NodeId, ValueErrorKind> {
        let (url, id) = match href.rfind('#') {
            None => (Some(href), None),
            Some(0) => (None, Some(&href[1..])),
            Some(p) => (Some(&href[..p]), Some(&href[(p + 1)..])),
        };

        match (url, id) {
            (None, Some(id)) if !id.is_empty() => Ok(NodeId::Internal(String::from(id))),
            (Some(url), Some(id)) if !id.is_empty() => {
                Ok(NodeId::External(String::from(url), String::from(id)))
            }
            _ => Err(ValueErrorKind::value_error("fragment identifier required")),
        }
    }

    /// Returns the id for references within this document.
    pub fn internal(&self) -> Option<&str> {
        match *self {
            NodeId::Internal(ref id) => Some(id),
            NodeId::External(..) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Internal(id) => write!(f, "#{id}"),
            NodeId::External(url, id) => write!(f, "{url}#{id}"),
        }
    }
}

/// Used where properties take a funciri or "none"
///
/// This is not to be used for values which don't come from properties.
/// For example, the `href` attribute in the `<use>` element takes a plain
/// URL, not a `url(...)` value; use [`NodeId::parse`] for that.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum IRI {
    #[default]
    None,
    Resource(NodeId),
}

impl IRI {
    /// Returns the contents of an `IRI::Resource`, or `None`
    pub fn get(&self) -> Option<&NodeId> {
        match *self {
            IRI::None => None,
            IRI::Resource(ref f) => Some(f),
        }
    }
}

impl Parse for IRI {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<IRI, ParseError<'i>> {
        if parser
            .try_parse(|i| i.expect_ident_matching("none"))
            .is_ok()
        {
            Ok(IRI::None)
        } else {
            let loc = parser.current_source_location();
            let url = parser.expect_url()?;
            let node_id = NodeId::parse(&url).map_err(|e| loc.new_custom_error(e))?;

            Ok(IRI::Resource(node_id))
        }
    }
}
