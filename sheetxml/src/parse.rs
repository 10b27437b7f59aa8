use crate::SheetError;
use crate::elements::{ElementKind, SheetNode};
use log::warn;
use sheetxml_parser::dom::{XmlElement, XmlNode};
use sheetxml_parser::expression::split_expression_value;
use std::collections::HashMap;

/// Per-parse state. Keys restart at zero for every document so that two
/// parses of identical markup yield equal trees.
#[derive(Default)]
struct ParseState {
    next_key: u32,
}

impl ParseState {
    fn next_key(&mut self) -> u32 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }
}

/// Converts raw markup into a sheet node tree. The only hard failure is
/// structurally broken XML; unknown tags and elements missing a required
/// attribute degrade into Void nodes so their siblings still render.
pub fn parse_sheet(markup: &str) -> Result<SheetNode, SheetError> {
    let root = sheetxml_parser::deserialize_xml(markup.as_bytes()).map_err(SheetError::Markup)?;
    let mut state = ParseState::default();
    Ok(parse_element(&root, &mut state))
}

fn parse_element(element: &XmlElement, state: &mut ParseState) -> SheetNode {
    let key = state.next_key();

    let Some(kind) = ElementKind::from_tag(&element.tag) else {
        warn!("Unknown element <{}>, rendering a placeholder", element.tag);
        return void_node(key, &element.tag, None);
    };

    let definition = kind.definition();
    for required in definition.required {
        if element.attribute(required).is_none() {
            let error = SheetError::MissingAttribute {
                element: definition.name,
                attribute: required,
            };
            warn!("{}", error);
            return void_node(key, &element.tag, Some(error.to_string()));
        }
    }

    let mut attributes = HashMap::new();
    for (name, value) in &element.attributes {
        attributes.insert(name.clone(), split_expression_value(value));
    }

    let mut children = Vec::new();
    if definition.allows_children {
        for child in &element.children {
            match child {
                XmlNode::Element(child_element) => {
                    children.push(parse_element(child_element, state));
                }
                XmlNode::Text(text) => children.push(text_node(state.next_key(), text)),
            }
        }
    }

    SheetNode {
        key,
        kind,
        attributes,
        children,
    }
}

fn void_node(key: u32, tag: &str, reason: Option<String>) -> SheetNode {
    SheetNode {
        key,
        kind: ElementKind::Void {
            tag: tag.to_string(),
            reason,
        },
        attributes: HashMap::new(),
        children: Vec::new(),
    }
}

fn text_node(key: u32, text: &str) -> SheetNode {
    let mut attributes = HashMap::new();
    attributes.insert("text".to_string(), split_expression_value(text));
    SheetNode {
        key,
        kind: ElementKind::Text,
        attributes,
        children: Vec::new(),
    }
}
