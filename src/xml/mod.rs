//! The XML loader.
//!
//! XML is tokenized with xml5ever, and the tokens are assembled into a tree of
//! [`Node`]s.  There is no namespace processing: elements are recognized by their local
//! name.

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever::buffer_queue::BufferQueue;
use markup5ever::QualName;
use xml5ever::tendril::StrTendril;
use xml5ever::tokenizer::{TagKind, Token, TokenSink, XmlTokenizer, XmlTokenizerOpts};

use crate::error::LoadingError;
use crate::node::{ElementKind, Node, NodeBorrow, NodeData};
use crate::session::Session;

mod attributes;

pub use attributes::Attributes;

/// Upper bound on the number of elements in a document.
const MAX_LOADED_ELEMENTS: usize = 1_000_000;

/// Holds the state used for XML processing.
///
/// These methods are called when an XML event is parsed out of the token stream:
/// `start_element`, `end_element`, `characters`.  The first error stops the processing
/// of any further events.
struct XmlState {
    session: Session,
    tree: Option<Node>,
    current_node: Option<Node>,
    num_loaded_elements: usize,
    error: Option<LoadingError>,
}

impl XmlState {
    fn new(session: Session) -> XmlState {
        XmlState {
            session,
            tree: None,
            current_node: None,
            num_loaded_elements: 0,
            error: None,
        }
    }

    fn error(&mut self, msg: &str) {
        if self.error.is_none() {
            self.error = Some(LoadingError::XmlParseError(msg.to_string()));
        }
    }

    fn start_element(&mut self, name: &QualName, attrs: Attributes) {
        if self.error.is_some() {
            return;
        }

        if self.num_loaded_elements >= MAX_LOADED_ELEMENTS {
            self.error("cannot load more than the maximum number of elements");
            return;
        }

        let node = Node::new(NodeData::new_element(
            self.num_loaded_elements,
            name,
            attrs,
        ));
        self.num_loaded_elements += 1;

        match self.current_node.take() {
            Some(parent) => parent.append(node.clone()),

            None if self.tree.is_none() => self.tree = Some(node.clone()),

            None => {
                self.error("extra content at the end of the document");
                return;
            }
        }

        self.current_node = Some(node);
    }

    /// Closes the current element; `name` is `None` for a `</>` short tag.
    fn end_element(&mut self, name: Option<&QualName>) {
        if self.error.is_some() {
            return;
        }

        let Some(current) = self.current_node.take() else {
            self.error("unexpected end tag");
            return;
        };

        if let Some(name) = name {
            let matches = {
                let elt = current.borrow_element();
                let current_name = elt.element_name();
                current_name.local == name.local && current_name.prefix == name.prefix
            };

            if !matches {
                self.error(&format!("mismatched end tag </{}>", name.local));
                return;
            }
        }

        self.current_node = current.parent();
    }

    fn characters(&mut self, text: &str) {
        if self.error.is_some() || text.is_empty() {
            return;
        }

        // Character data only matters inside the elements that render it
        let Some(ref parent) = self.current_node else {
            return;
        };

        if !matches!(
            parent.element_kind(),
            Some(ElementKind::Text | ElementKind::TSpan)
        ) {
            return;
        }

        // When the last child is a Chars node we can coalesce the text
        if let Some(child) = parent.last_child().filter(|c| c.is_chars()) {
            child.borrow_chars().append(text);
        } else {
            parent.append(Node::new(NodeData::new_chars(text)));
        }
    }

    fn finish(&mut self) -> Result<Node, LoadingError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        if self.current_node.is_some() {
            return Err(LoadingError::XmlParseError(String::from(
                "premature end of document",
            )));
        }

        match self.tree.take() {
            Some(root) if root.element_kind() == Some(ElementKind::Svg) => Ok(root),
            _ => Err(LoadingError::NoSvgRoot),
        }
    }
}

struct XmlSink(Rc<RefCell<XmlState>>);

impl TokenSink for XmlSink {
    fn process_token(&mut self, token: Token) {
        let mut state = self.0.borrow_mut();

        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => {
                    state.start_element(&tag.name, Attributes::new_from_xml5ever(&tag.attrs))
                }

                TagKind::EmptyTag => {
                    state.start_element(&tag.name, Attributes::new_from_xml5ever(&tag.attrs));
                    state.end_element(Some(&tag.name));
                }

                TagKind::EndTag => state.end_element(Some(&tag.name)),

                TagKind::ShortTag => state.end_element(None),
            },

            Token::CharacterTokens(text) => state.characters(&text),

            Token::ParseError(e) => {
                svgops_log!(state.session, "XML parse error: {}", e);
                state.error(&e);
            }

            _ => (),
        }
    }
}

/// Parses an XML document into a tree whose root is an `<svg>` element.
pub fn xml_load_from_str(input: &str, session: &Session) -> Result<Node, LoadingError> {
    let state = Rc::new(RefCell::new(XmlState::new(session.clone())));

    let mut queue = BufferQueue::new();
    queue.push_back(StrTendril::from_slice(input));

    let mut tokenizer = XmlTokenizer::new(XmlSink(state.clone()), XmlTokenizerOpts::default());
    tokenizer.run(&mut queue);
    tokenizer.end();

    let mut state = state.borrow_mut();
    state.finish()
}
