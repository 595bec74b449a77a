//! Minimal element tree over `quick-xml` events.
//!
//! Descriptors are small, so the parsers build a tree first and then
//! walk it. Only element names (local part, namespace prefix dropped)
//! and text content are kept; attributes carry nothing descriptors use.

use crate::ParseError;
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first child named `name`; `None` if the child
    /// is absent or blank.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|c| c.text.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Parses a complete document and returns its root element.
pub(crate) fn parse_document(input: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| ParseError::Malformed {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                stack.push(Element::named(local_name(start.local_name().as_ref())));
            }
            Event::Empty(start) => {
                let element = Element::named(local_name(start.local_name().as_ref()));
                attach(&mut stack, &mut root, element, &reader)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| ParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: "closing tag without matching opening tag".into(),
                })?;
                attach(&mut stack, &mut root, element, &reader)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| ParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                })?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&value);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, DOCTYPE.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Malformed {
            position: reader.buffer_position() as u64,
            message: format!("unexpected end of document inside <{}>", open.name),
        });
    }

    root.ok_or_else(|| ParseError::Malformed {
        position: 0,
        message: "document has no root element".into(),
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    reader: &Reader<&[u8]>,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ParseError::Malformed {
            position: reader.buffer_position() as u64,
            message: format!("second root element <{}>", element.name),
        }),
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Checks the root element name.
pub(crate) fn expect_root(root: &Element, expected: &'static str) -> Result<(), ParseError> {
    if root.name == expected {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot {
            expected,
            found: root.name.clone(),
        })
    }
}
