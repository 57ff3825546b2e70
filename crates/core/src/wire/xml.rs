//! XML payloads parsed into an owned element tree

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

use super::{WireFormat, WireNode};
use crate::error::{Error, Result};

/// XML wire format
pub struct Xml;

impl WireFormat for Xml {
    type Node = XmlElement;

    const NAME: &'static str = "XML";

    fn parse(text: &str) -> Result<XmlElement> {
        XmlElement::parse(text)
    }
}

/// Owned XML element: name, attributes, concatenated text, child elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

fn malformed(err: impl std::fmt::Display) -> Error {
    Error::Materialization {
        format: Xml::NAME,
        message: err.to_string(),
    }
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a document and return its root element
    pub fn parse(text: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(Self::from_start(&e)?),
                Ok(Event::Empty(e)) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| malformed("closing tag without an open element"))?;
                    // Indentation between child elements is not content
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(malformed)?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => return Err(malformed(format!("text outside of the root element: {text:?}"))),
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, processing instructions, doctype
                Ok(_) => {}
                Err(e) => return Err(malformed(e)),
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(format!("unclosed element <{}>", open.name)));
        }

        root.ok_or_else(|| malformed("document has no root element"))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
        let mut element = XmlElement::new(&String::from_utf8_lossy(start.name().as_ref()));

        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(malformed)?.into_owned();
            element.attributes.push((key, value));
        }

        Ok(element)
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(element);
                Ok(())
            }
            None if root.is_some() => Err(malformed("more than one root element")),
            None => {
                *root = Some(element);
                Ok(())
            }
        }
    }
}

impl WireNode for XmlElement {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn child(&self, key: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == key)
    }

    fn items(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.text))
    }
}
