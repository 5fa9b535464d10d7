//! Store XML element attributes and their values.

use std::slice;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationListParser, DeclarationParser, Parser, ParserInput,
};
use markup5ever::{namespace_url, ns, Attribute, LocalName, QualName};
use string_cache::DefaultAtom;

use crate::error::*;
use crate::parsers::{Parse, ParseValue};
use crate::session::Session;

/// Type used to store attribute values.
///
/// Attribute values are often repeated in an SVG file, so we intern them using the
/// string_cache crate.
pub type AttributeValue = DefaultAtom;

/// The attributes of an element, plus the declarations of its inline `style`.
///
/// Lookups with [`Attributes::get`] see a presentation attribute first and fall back to
/// the same-named declaration in `style="..."`.
#[derive(Clone, Default)]
pub struct Attributes {
    attrs: Box<[(QualName, AttributeValue)]>,
    style: Box<[(LocalName, AttributeValue)]>,
}

/// Iterator from `Attributes.iter`.
pub struct AttributesIter<'a>(slice::Iter<'a, (QualName, AttributeValue)>);

impl Attributes {
    /// Creates an `Attributes` from the attributes of a start tag.
    ///
    /// The `style` attribute is split into its declarations here; invalid declarations
    /// are dropped.
    pub fn new_from_xml5ever(attrs: &[Attribute]) -> Attributes {
        Attributes::from_pairs(
            attrs
                .iter()
                .map(|a| (a.name.clone(), AttributeValue::from(&*a.value))),
        )
    }

    fn from_pairs(pairs: impl Iterator<Item = (QualName, AttributeValue)>) -> Attributes {
        let attrs: Box<[_]> = pairs.collect();

        let style = attrs
            .iter()
            .find(|(name, _)| name.prefix.is_none() && &*name.local == "style")
            .map(|(_, value)| parse_style_declarations(value))
            .unwrap_or_default();

        Attributes { attrs, style }
    }

    /// Builds attributes out of `(name, value)` string pairs; names may carry a prefix
    /// like `xlink:href`.
    pub fn from_strs(pairs: &[(&str, &str)]) -> Attributes {
        Attributes::from_pairs(pairs.iter().map(|&(name, value)| {
            let qual_name = match name.split_once(':') {
                Some((prefix, local)) => QualName::new(
                    Some(prefix.into()),
                    ns!(),
                    LocalName::from(local),
                ),
                None => QualName::new(None, ns!(), LocalName::from(name)),
            };

            (qual_name, AttributeValue::from(value))
        }))
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Creates an iterator that yields `(QualName, &'a str)` tuples.
    pub fn iter(&self) -> AttributesIter<'_> {
        AttributesIter(self.attrs.iter())
    }

    /// Value of an unprefixed attribute, ignoring the inline style.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.prefix.is_none() && &*n.local == name)
            .map(|(_, value)| &value[..])
    }

    /// Value of a property, from its attribute or else from the inline style.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_attribute(name).or_else(|| {
            self.style
                .iter()
                .find(|(n, _)| &**n == name)
                .map(|(_, value)| &value[..])
        })
    }

    /// `href` and `xlink:href` mean the same; a plain `href` wins if both are present.
    pub fn get_href(&self) -> Option<&str> {
        self.get_attribute("href").or_else(|| {
            self.attrs
                .iter()
                .find(|(n, _)| {
                    n.prefix.as_ref().map(|p| &**p) == Some("xlink") && &*n.local == "href"
                })
                .map(|(_, value)| &value[..])
        })
    }

    pub fn get_id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Parses a property with [`Attributes::get`].
    ///
    /// Returns `None` when the property is absent.
    pub fn parse<T: Parse>(&self, name: &str) -> Option<Result<T, ElementError>> {
        self.get(name).map(|value| {
            let attr = QualName::new(None, ns!(), LocalName::from(name));
            attr.parse(value)
        })
    }

    /// Like [`Attributes::parse`], but an invalid value is logged and treated as absent.
    pub fn parse_valid<T: Parse>(&self, name: &str, session: &Session) -> Option<T> {
        match self.parse(name)? {
            Ok(v) => Some(v),
            Err(e) => {
                svgops_log!(session, "(ignoring invalid attribute: {})", e);
                None
            }
        }
    }
}

impl<'a> Iterator for AttributesIter<'a> {
    type Item = (QualName, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(a, v)| (a.clone(), v.as_ref()))
    }
}

struct StyleDeclarationParser;

impl<'i> DeclarationParser<'i> for StyleDeclarationParser {
    type Declaration = (LocalName, AttributeValue);
    type Error = ValueErrorKind;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i>> {
        let start = input.position();
        while input.next().is_ok() {}

        let value = input.slice_from(start).trim();
        let value = match value.rsplit_once('!') {
            Some((v, important)) if important.trim().eq_ignore_ascii_case("important") => v.trim(),
            _ => value,
        };

        Ok((
            LocalName::from(name.as_ref().to_ascii_lowercase()),
            AttributeValue::from(value),
        ))
    }
}

impl<'i> AtRuleParser<'i> for StyleDeclarationParser {
    type Prelude = ();
    type AtRule = (LocalName, AttributeValue);
    type Error = ValueErrorKind;
}

fn parse_style_declarations(style: &str) -> Box<[(LocalName, AttributeValue)]> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);

    DeclarationListParser::new(&mut parser, StyleDeclarationParser)
        .filter_map(Result::ok)
        .collect()
}
