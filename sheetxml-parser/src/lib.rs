use crate::dom::XmlElement;
use std::io::BufRead;

pub mod dom;
pub mod expression;

/// Parses a sheet markup document into a generic DOM tree, rooted at the
/// document's single top-level element.
pub fn deserialize_xml<T: BufRead>(read: T) -> Result<XmlElement, String> {
    dom::parse_document(read)
}
