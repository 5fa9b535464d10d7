//! Error types.

use std::fmt;

use cssparser::{BasicParseError, BasicParseErrorKind};
use markup5ever::QualName;

/// A short-lived error.
///
/// The lifetime of the error is the same as the `cssparser::ParserInput` that
/// was used to create a `cssparser::Parser`.  That is, it is the lifetime of
/// the string data that is being parsed.
///
/// The code flow will sometimes require preserving this error as a long-lived struct;
/// see the `impl<'i, O> AttributeResultExt<O> for Result<O, ParseError<'i>>` for that
/// purpose.
pub type ParseError<'i> = cssparser::ParseError<'i, ValueErrorKind>;

/// A simple error which refers to an attribute's value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueErrorKind {
    /// A property with the specified name was not found
    UnknownProperty,

    /// The value could not be parsed
    Parse(String),

    // The value could be parsed, but is invalid
    Value(String),
}

impl ValueErrorKind {
    pub fn parse_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Parse(s.to_string())
    }

    pub fn value_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Value(s.to_string())
    }
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ValueErrorKind::UnknownProperty => write!(f, "unknown property name"),

            ValueErrorKind::Parse(ref s) => write!(f, "parse error: {s}"),

            ValueErrorKind::Value(ref s) => write!(f, "invalid value: {s}"),
        }
    }
}

impl<'a> From<BasicParseError<'a>> for ValueErrorKind {
    fn from(e: BasicParseError<'_>) -> ValueErrorKind {
        let BasicParseError { kind, .. } = e;

        let msg = match kind {
            BasicParseErrorKind::UnexpectedToken(_) => "unexpected token",
            BasicParseErrorKind::EndOfInput => "unexpected end of input",
            BasicParseErrorKind::AtRuleInvalid(_) => "invalid @-rule",
            BasicParseErrorKind::AtRuleBodyInvalid => "invalid @-rule body",
            BasicParseErrorKind::QualifiedRuleInvalid => "invalid qualified rule",
        };

        ValueErrorKind::parse_error(msg)
    }
}

impl<'i> From<ParseError<'i>> for ValueErrorKind {
    fn from(e: ParseError<'i>) -> ValueErrorKind {
        match e.kind {
            cssparser::ParseErrorKind::Basic(b) => ValueErrorKind::from(BasicParseError {
                kind: b,
                location: e.location,
            }),
            cssparser::ParseErrorKind::Custom(v) => v,
        }
    }
}

/// A complete error for an attribute and its erroneous value
#[derive(Debug, Clone)]
pub struct ElementError {
    pub attr: QualName,
    pub err: ValueErrorKind,
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.attr.local, self.err)
    }
}

/// Attaches the name of the attribute being parsed to a value error, turning any
/// error convertible to `ValueErrorKind` into an `ElementError`.
pub trait AttributeResultExt<O> {
    fn attribute(self, attr: QualName) -> Result<O, ElementError>;
}

impl<O, E: Into<ValueErrorKind>> AttributeResultExt<O> for Result<O, E> {
    fn attribute(self, attr: QualName) -> Result<O, ElementError> {
        self.map_err(|e| e.into())
            .map_err(|err| ElementError { attr, err })
    }
}

/// Errors that can happen while loading an SVG document.
///
/// These are the only hard failures; once a document is loaded, compiling it
/// always succeeds and degraded content is reported as a [`Diagnostic`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadingError {
    /// XML syntax error.
    #[error("XML parse error: {0}")]
    XmlParseError(String),

    /// The document does not have a toplevel `<svg>` element.
    #[error("document does not have a toplevel <svg> element")]
    NoSvgRoot,

    /// Could not read the input.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LoadingError {
    fn from(e: std::io::Error) -> LoadingError {
        LoadingError::Io(e.to_string())
    }
}

/// A condition under which part of the document was degraded or skipped.
///
/// None of these abort compilation; they are collected in the
/// [`Session`](crate::session::Session) so that callers can report them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    /// Path data that could not be parsed; the offending segment was skipped.
    #[error("malformed path data in <{element}>: {message}")]
    MalformedPathData { element: String, message: String },

    /// A `url(#id)` or `href` that matched no visible definition.
    #[error("unresolved reference to \"{reference}\"")]
    UnresolvedReference { reference: String },

    /// A feature that is intentionally degraded.
    #[error("unsupported feature: {feature}")]
    UnsupportedFeature { feature: String },

    /// A missing or out-of-range numeric attribute; the element was omitted.
    #[error("invalid value for attribute \"{attribute}\" of <{element}>")]
    InvalidNumericAttribute { element: String, attribute: String },
}

impl Diagnostic {
    pub fn unresolved(reference: &str) -> Diagnostic {
        Diagnostic::UnresolvedReference {
            reference: reference.to_string(),
        }
    }

    pub fn unsupported(feature: &str) -> Diagnostic {
        Diagnostic::UnsupportedFeature {
            feature: feature.to_string(),
        }
    }

    pub fn invalid_attribute(element: &str, attribute: &str) -> Diagnostic {
        Diagnostic::InvalidNumericAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }
}
