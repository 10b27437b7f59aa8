use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufRead;

/// A single element of the markup document. Attribute values are
/// entity-unescaped, tag names are kept verbatim so that unknown elements
/// can still be reported by name further down the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<XmlNode>,
}

/// Sheets have mixed content (`<Label>Hello {{sheet.title}}</Label>`), so
/// text has to keep its position between sibling elements.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    fn new(tag: String, attributes: HashMap<String, String>) -> Self {
        XmlElement {
            tag,
            attributes,
            children: Vec::new(),
        }
    }

    /// Convenience for tests and the tree builder: the child elements,
    /// skipping interleaved text.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

fn read_attributes<'a>(
    element: &'a quick_xml::events::BytesStart<'a>,
    position: u64,
) -> Result<HashMap<String, String>, String> {
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute =
            attribute.map_err(|e| format!("Malformed attribute at {}: {}", position, e))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| format!("Malformed attribute value at {}: {}", position, e))?
            .to_string();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

/// Reads a whole markup document into a DOM tree. This is the only place in
/// the pipeline that can hard-fail: structural XML errors (mismatched tags,
/// truncated input, no root element) are unrecoverable, everything above
/// this layer degrades instead.
pub fn parse_document<T: BufRead>(read: T) -> Result<XmlElement, String> {
    let mut reader = Reader::from_reader(read);
    let mut buffer = Vec::new();

    // Open elements, the last entry being the innermost one.
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buffer)
            .map_err(|e| format!("Malformed markup at {}: {}", position, e))?;

        match event {
            Event::Start(element) => {
                let tag = String::from_utf8_lossy(element.name().as_ref()).to_string();
                let attributes = read_attributes(&element, position)?;
                stack.push(XmlElement::new(tag, attributes));
            }
            Event::Empty(element) => {
                let tag = String::from_utf8_lossy(element.name().as_ref()).to_string();
                let attributes = read_attributes(&element, position)?;
                attach(&mut stack, &mut root, XmlElement::new(tag, attributes))?;
            }
            Event::End(_) => {
                // Name mismatches have already been rejected by the reader.
                let element = stack
                    .pop()
                    .ok_or_else(|| format!("Unexpected closing tag at {}", position))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| format!("Malformed text at {}: {}", position, e))?;
                push_text(&mut stack, text.trim());
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).to_string();
                push_text(&mut stack, text.trim());
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
                debug!("Skipping non-content event at {}", position);
            }
            Event::Eof => break,
        }

        buffer.clear();
    }

    if !stack.is_empty() {
        return Err(format!("Unclosed element <{}>", stack.last().unwrap().tag));
    }

    root.ok_or_else(|| "Document contains no root element".to_string())
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_some() {
                return Err(format!(
                    "Unexpected second root element <{}>",
                    element.tag
                ));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    if text.is_empty() {
        return;
    }
    // Text outside the root element carries no meaning for a sheet.
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
}
