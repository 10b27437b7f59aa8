use sheetxml_parser::expression::ParsedExpression;
use std::collections::HashMap;

/// The closed set of element kinds a sheet can contain. Markup dispatch is
/// an exhaustive match over this enum rather than a runtime name registry,
/// so adding a kind forces every transformation stage to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Sheet,
    Page,
    Row,
    Column,
    Section,
    Table,
    TableRow,
    TableCell,
    Label,
    Button,
    Icon,
    Input,
    TextArea,
    Checkbox,
    Radio,
    Select,
    SelectOption,
    /// Repeats its children once per item of a resolved list, exposing the
    /// item under the loop's `key` name.
    Loop,
    /// Declares a sheet-local variable; lifted into the sheet store at load
    /// time and never rendered.
    Variable,
    /// Synthetic kind for text between elements; carries its template in
    /// the `text` attribute.
    Text,
    /// Anything that could not be parsed: unknown tags and elements missing
    /// a required attribute. Renders as a visible placeholder instead of
    /// failing the sheet.
    Void {
        tag: String,
        reason: Option<String>,
    },
}

/// Static description of an element kind: whether children are descended
/// into, which attributes must be present, and which attributes carry
/// expressions the renderer resolves per pass.
pub struct ElementDefinition {
    pub name: &'static str,
    pub allows_children: bool,
    pub required: &'static [&'static str],
    pub variable_attributes: &'static [&'static str],
}

impl ElementKind {
    /// Tag dispatch, case-insensitive like the rest of the markup surface.
    /// Returns None for tags outside the closed set.
    pub fn from_tag(tag: &str) -> Option<ElementKind> {
        let kind = match tag.to_ascii_lowercase().as_str() {
            "sheet" => ElementKind::Sheet,
            "page" => ElementKind::Page,
            "row" => ElementKind::Row,
            "column" => ElementKind::Column,
            "section" => ElementKind::Section,
            "table" => ElementKind::Table,
            "tablerow" => ElementKind::TableRow,
            "tablecell" => ElementKind::TableCell,
            "label" => ElementKind::Label,
            "button" => ElementKind::Button,
            "icon" => ElementKind::Icon,
            "input" => ElementKind::Input,
            "textarea" => ElementKind::TextArea,
            "checkbox" => ElementKind::Checkbox,
            "radio" => ElementKind::Radio,
            "select" => ElementKind::Select,
            "option" => ElementKind::SelectOption,
            "loop" => ElementKind::Loop,
            "variable" => ElementKind::Variable,
            _ => return None,
        };
        Some(kind)
    }

    pub fn definition(&self) -> &'static ElementDefinition {
        match self {
            ElementKind::Sheet => &ElementDefinition {
                name: "Sheet",
                allows_children: true,
                required: &[],
                variable_attributes: &[],
            },
            ElementKind::Page => &ElementDefinition {
                name: "Page",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class", "name"],
            },
            ElementKind::Row => &ElementDefinition {
                name: "Row",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::Column => &ElementDefinition {
                name: "Column",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::Section => &ElementDefinition {
                name: "Section",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::Table => &ElementDefinition {
                name: "Table",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::TableRow => &ElementDefinition {
                name: "TableRow",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::TableCell => &ElementDefinition {
                name: "TableCell",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::Label => &ElementDefinition {
                name: "Label",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::Button => &ElementDefinition {
                name: "Button",
                allows_children: true,
                required: &[],
                variable_attributes: &["id", "class"],
            },
            ElementKind::Icon => &ElementDefinition {
                name: "Icon",
                allows_children: false,
                required: &["src"],
                variable_attributes: &["id", "class", "src"],
            },
            ElementKind::Input => &ElementDefinition {
                name: "Input",
                allows_children: false,
                required: &["name"],
                variable_attributes: &["id", "class", "name"],
            },
            ElementKind::TextArea => &ElementDefinition {
                name: "TextArea",
                allows_children: false,
                required: &["name"],
                variable_attributes: &["id", "class", "name"],
            },
            ElementKind::Checkbox => &ElementDefinition {
                name: "Checkbox",
                allows_children: false,
                required: &["name"],
                variable_attributes: &["id", "class", "name", "value"],
            },
            ElementKind::Radio => &ElementDefinition {
                name: "Radio",
                allows_children: false,
                required: &["name", "value"],
                variable_attributes: &["id", "class", "name", "value", "label"],
            },
            ElementKind::Select => &ElementDefinition {
                name: "Select",
                allows_children: true,
                required: &["name"],
                variable_attributes: &["id", "class", "name"],
            },
            ElementKind::SelectOption => &ElementDefinition {
                name: "Option",
                allows_children: true,
                required: &["value"],
                variable_attributes: &["value", "label"],
            },
            ElementKind::Loop => &ElementDefinition {
                name: "Loop",
                allows_children: true,
                required: &["list", "key"],
                variable_attributes: &[],
            },
            ElementKind::Variable => &ElementDefinition {
                name: "Variable",
                allows_children: false,
                required: &["name", "value"],
                variable_attributes: &[],
            },
            ElementKind::Text => &ElementDefinition {
                name: "Text",
                allows_children: false,
                required: &[],
                variable_attributes: &["text"],
            },
            ElementKind::Void { .. } => &ElementDefinition {
                name: "Void",
                allows_children: false,
                required: &[],
                variable_attributes: &[],
            },
        }
    }
}

/// One node of a parsed sheet. The tree is immutable after parse;
/// reloading a sheet replaces the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetNode {
    /// Parse-unique identity, used as the display-list key downstream.
    /// Assignment is deterministic, so identical markup parses to
    /// structurally equal trees.
    pub key: u32,
    pub kind: ElementKind,
    pub attributes: HashMap<String, ParsedExpression>,
    pub children: Vec<SheetNode>,
}

impl SheetNode {
    pub fn expression(&self, attribute: &str) -> Option<&ParsedExpression> {
        self.attributes.get(attribute)
    }

    /// The value of an attribute that does not take part in variable
    /// resolution (e.g. a Loop's `key` or a Button's `action`).
    pub fn static_attribute(&self, attribute: &str) -> Option<String> {
        self.attributes.get(attribute)?.static_value()
    }
}
