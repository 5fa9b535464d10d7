//! Main SVG document structure.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::LoadingError;
use crate::node::Node;
use crate::session::Session;
use crate::xml::xml_load_from_str;

/// A loaded SVG file and its tree of elements.
///
/// The tree is immutable once loaded; compiling a document does not change it, so a
/// document can be compiled any number of times.
pub struct Document {
    /// Tree of nodes; the root is guaranteed to be an `<svg>` element.
    tree: Node,

    session: Session,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.tree)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parses a document from a string.
    pub fn load_from_str(input: &str, session: Session) -> Result<Document, LoadingError> {
        let tree = xml_load_from_str(input, &session)?;

        Ok(Document { tree, session })
    }

    /// Reads and parses a document from a file.
    pub fn load_from_file(path: &Path, session: Session) -> Result<Document, LoadingError> {
        let bytes = fs::read(path)?;
        Document::load_from_bytes(&bytes, session)
    }

    /// Parses a document from UTF-8 bytes.
    pub fn load_from_bytes(bytes: &[u8], session: Session) -> Result<Document, LoadingError> {
        let input = std::str::from_utf8(bytes)
            .map_err(|e| LoadingError::XmlParseError(format!("invalid UTF-8: {e}")))?;

        Document::load_from_str(input, session)
    }

    /// Gets the root node.  This is guaranteed to be an `<svg>` element.
    pub fn root(&self) -> Node {
        self.tree.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
