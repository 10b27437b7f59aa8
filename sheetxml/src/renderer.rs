use crate::elements::{ElementKind, SheetNode};
use crate::engine::{SheetEngine, SheetProperties};
use crate::values::Value;
use log::trace;
use std::collections::BTreeMap;

/// The kinds of display node the view layer has to know how to draw.
/// `Loop` and `Variable` never reach the display tree: loops flatten into
/// their parent and variable declarations render nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
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
    Text,
    Void,
}

/// One node of the rendered output: a kind, the resolved string props, and
/// the rendered children. The view layer converts these to widgets; the
/// engine stays free of any UI toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub key: u32,
    pub kind: DisplayKind,
    pub props: BTreeMap<String, String>,
    pub children: Vec<DisplayNode>,
}

/// Renders the sheet bound to a render id into a display tree. Returns
/// None when the render or its sheet is not (or no longer) loaded — the
/// caller shows nothing rather than an error, matching the load-in-flight
/// contract.
#[profiling::function]
pub fn render_sheet(engine: &SheetEngine, render_id: &str) -> Option<DisplayNode> {
    let root = engine.get_sheet(render_id)?;
    let properties = SheetProperties::new();
    let rendered = render_node(engine, render_id, root, &properties);
    if rendered.len() != 1 {
        trace!("Sheet root of {} rendered {} nodes", render_id, rendered.len());
    }
    rendered.into_iter().next()
}

/// Renders one node. Most kinds produce exactly one display node; a Loop
/// produces one per item of its list and a Variable produces none.
fn render_node(
    engine: &SheetEngine,
    render_id: &str,
    node: &SheetNode,
    properties: &SheetProperties,
) -> Vec<DisplayNode> {
    match &node.kind {
        ElementKind::Variable => Vec::new(),
        ElementKind::Loop => render_loop(engine, render_id, node, properties),
        ElementKind::Void { tag, reason } => {
            let mut props = BTreeMap::new();
            props.insert("tag".to_string(), tag.clone());
            if let Some(reason) = reason {
                props.insert("reason".to_string(), reason.clone());
            }
            vec![DisplayNode {
                key: node.key,
                kind: DisplayKind::Void,
                props,
                children: Vec::new(),
            }]
        }
        kind => {
            let mut props = resolve_props(engine, render_id, node, properties);
            attach_bindings(engine, render_id, node, properties, &mut props);

            let mut children = Vec::new();
            for child in &node.children {
                children.extend(render_node(engine, render_id, child, properties));
            }

            vec![DisplayNode {
                key: node.key,
                kind: display_kind(kind),
                props,
                children,
            }]
        }
    }
}

/// Resolves the kind's declared variable attributes into string props.
/// Attributes absent from the markup stay absent from the props.
fn resolve_props(
    engine: &SheetEngine,
    render_id: &str,
    node: &SheetNode,
    properties: &SheetProperties,
) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    for attribute in node.kind.definition().variable_attributes {
        if let Some(expression) = node.expression(attribute) {
            props.insert(
                attribute.to_string(),
                engine.render_variable(render_id, expression, properties),
            );
        }
    }

    // Button actions are plain identifiers, not templates.
    if node.kind == ElementKind::Button {
        for attribute in ["action", "target"] {
            if let Some(value) = node.static_attribute(attribute) {
                props.insert(attribute.to_string(), value);
            }
        }
    }

    props
}

/// Form elements display the field their resolved `name` points at: the
/// name is itself a variable path, so `<Input name="character.hp"/>` shows
/// the actor's current hit points.
fn attach_bindings(
    engine: &SheetEngine,
    render_id: &str,
    node: &SheetNode,
    properties: &SheetProperties,
    props: &mut BTreeMap<String, String>,
) {
    let bound = matches!(
        node.kind,
        ElementKind::Input
            | ElementKind::TextArea
            | ElementKind::Checkbox
            | ElementKind::Radio
            | ElementKind::Select
    );
    if !bound {
        return;
    }

    let Some(path) = props.get("name").cloned() else {
        return;
    };
    let field = engine.resolve_variable(render_id, &path, properties);

    if node.kind == ElementKind::Radio {
        let own_value = props.get("value").cloned().unwrap_or_default();
        let checked = !field.is_null() && field.display() == own_value;
        props.insert("checked".to_string(), checked.to_string());
    } else {
        props.insert("value".to_string(), field.display());
    }
}

/// Repeats the loop's children once per item of its resolved list. The
/// item is exposed under the loop's `key` name and its position under
/// `index`, layered over the enclosing scope.
fn render_loop(
    engine: &SheetEngine,
    render_id: &str,
    node: &SheetNode,
    properties: &SheetProperties,
) -> Vec<DisplayNode> {
    let (Some(list), Some(key)) = (node.static_attribute("list"), node.static_attribute("key"))
    else {
        // Required attributes, but a damaged tree still renders nothing
        // rather than panicking.
        return Vec::new();
    };

    let Value::Array(items) = engine.resolve_variable(render_id, &list, properties) else {
        trace!("The loop list {} did not resolve to a list", list);
        return Vec::new();
    };

    let mut rendered = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let mut scoped = properties.clone();
        scoped.insert(key.clone(), item);
        scoped.insert("index".to_string(), Value::from(index as i64));

        for child in &node.children {
            rendered.extend(render_node(engine, render_id, child, &scoped));
        }
    }
    rendered
}

fn display_kind(kind: &ElementKind) -> DisplayKind {
    match kind {
        ElementKind::Sheet => DisplayKind::Sheet,
        ElementKind::Page => DisplayKind::Page,
        ElementKind::Row => DisplayKind::Row,
        ElementKind::Column => DisplayKind::Column,
        ElementKind::Section => DisplayKind::Section,
        ElementKind::Table => DisplayKind::Table,
        ElementKind::TableRow => DisplayKind::TableRow,
        ElementKind::TableCell => DisplayKind::TableCell,
        ElementKind::Label => DisplayKind::Label,
        ElementKind::Button => DisplayKind::Button,
        ElementKind::Icon => DisplayKind::Icon,
        ElementKind::Input => DisplayKind::Input,
        ElementKind::TextArea => DisplayKind::TextArea,
        ElementKind::Checkbox => DisplayKind::Checkbox,
        ElementKind::Radio => DisplayKind::Radio,
        ElementKind::Select => DisplayKind::Select,
        ElementKind::SelectOption => DisplayKind::SelectOption,
        ElementKind::Text => DisplayKind::Text,
        // Handled before mapping; keeping the match exhaustive anyway.
        ElementKind::Loop | ElementKind::Variable => DisplayKind::Void,
        ElementKind::Void { .. } => DisplayKind::Void,
    }
}

/// Drives re-rendering: polls the engine's revision and reports whether
/// anything changed since the last poll. A displayed tree is stale for at
/// most one poll after a write.
pub struct RenderWatcher {
    last_revision: u64,
}

impl RenderWatcher {
    pub fn new(engine: &SheetEngine) -> Self {
        RenderWatcher {
            last_revision: engine.revision(),
        }
    }

    /// True when the engine changed since the last poll (or construction).
    pub fn poll(&mut self, engine: &SheetEngine) -> bool {
        let revision = engine.revision();
        let changed = revision != self.last_revision;
        self.last_revision = revision;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(node: &'a DisplayNode, kind: DisplayKind) -> Option<&'a DisplayNode> {
        if node.kind == kind {
            return Some(node);
        }
        node.children.iter().find_map(|child| find(child, kind))
    }

    fn engine_with_sheet(markup: &str) -> (SheetEngine, String) {
        let mut engine = SheetEngine::new();
        engine.load_sheet("sheet-1", markup).unwrap();
        let actor: Value = serde_json::from_str(
            r#"{
                "name": "Waals",
                "alignment": "good",
                "stats": { "str": 14 },
                "content": {
                    "inventory": [
                        { "name": "Rope", "count": 1 },
                        { "name": "Torch", "count": 3 }
                    ]
                }
            }"#,
        )
        .unwrap();
        engine.load_actor("60ab0f", Some(actor), false);
        let render_id = engine.create_render(Some("60ab0f"), "sheet-1", None);
        (engine, render_id)
    }

    #[test]
    fn input_binds_its_named_field() {
        let (engine, render_id) =
            engine_with_sheet(r#"<Sheet><Input name="character.stats.str"/></Sheet>"#);
        let tree = render_sheet(&engine, &render_id).unwrap();

        let input = find(&tree, DisplayKind::Input).unwrap();
        assert_eq!(input.props.get("name").unwrap(), "character.stats.str");
        assert_eq!(input.props.get("value").unwrap(), "14");
    }

    #[test]
    fn label_text_resolves_sheet_variables() {
        let (engine, render_id) = engine_with_sheet(
            r#"<Sheet>
                <Variable name="title" value="Waals"/>
                <Label>Hello {{sheet.title}}</Label>
            </Sheet>"#,
        );
        let tree = render_sheet(&engine, &render_id).unwrap();

        let text = find(&tree, DisplayKind::Text).unwrap();
        assert_eq!(text.props.get("text").unwrap(), "Hello Waals");
    }

    #[test]
    fn loops_render_children_per_item() {
        let (engine, render_id) = engine_with_sheet(
            r#"<Sheet>
                <Loop list="content.inventory" key="item">
                    <Label>{{item.name}} x{{item.count}} ({{index}})</Label>
                </Loop>
            </Sheet>"#,
        );
        let tree = render_sheet(&engine, &render_id).unwrap();

        // The loop flattens into the sheet: two labels, no loop node.
        assert_eq!(tree.children.len(), 2);
        let first = find(&tree.children[0], DisplayKind::Text).unwrap();
        let second = find(&tree.children[1], DisplayKind::Text).unwrap();
        assert_eq!(first.props.get("text").unwrap(), "Rope x1 (0)");
        assert_eq!(second.props.get("text").unwrap(), "Torch x3 (1)");
    }

    #[test]
    fn radio_checked_follows_the_field() {
        let (engine, render_id) = engine_with_sheet(
            r#"<Sheet>
                <Radio name="character.alignment" value="good" label="Good"/>
                <Radio name="character.alignment" value="evil" label="Evil"/>
            </Sheet>"#,
        );
        let tree = render_sheet(&engine, &render_id).unwrap();

        assert_eq!(tree.children[0].props.get("checked").unwrap(), "true");
        assert_eq!(tree.children[1].props.get("checked").unwrap(), "false");
    }

    #[test]
    fn void_nodes_carry_their_diagnostics() {
        let (engine, render_id) = engine_with_sheet(r#"<Sheet><Wobble/><Input/></Sheet>"#);
        let tree = render_sheet(&engine, &render_id).unwrap();

        assert_eq!(tree.children[0].kind, DisplayKind::Void);
        assert_eq!(tree.children[0].props.get("tag").unwrap(), "Wobble");
        assert!(tree.children[0].props.get("reason").is_none());

        assert_eq!(tree.children[1].kind, DisplayKind::Void);
        assert!(tree.children[1].props.get("reason").unwrap().contains("name"));
    }

    #[test]
    fn variables_render_nothing() {
        let (engine, render_id) =
            engine_with_sheet(r#"<Sheet><Variable name="a" value="1"/></Sheet>"#);
        let tree = render_sheet(&engine, &render_id).unwrap();
        assert!(tree.children.is_empty());
    }

    #[test]
    fn missing_sheet_renders_nothing() {
        let engine = SheetEngine::new();
        assert!(render_sheet(&engine, "nope").is_none());
    }

    #[test]
    fn watcher_reports_writes_once() {
        let (mut engine, render_id) =
            engine_with_sheet(r#"<Sheet><Input name="character.stats.str"/></Sheet>"#);
        let mut watcher = RenderWatcher::new(&engine);
        assert!(!watcher.poll(&engine));

        engine.set_actor_field(&render_id, "stats.str", Value::from(16i64));
        assert!(watcher.poll(&engine));
        assert!(!watcher.poll(&engine));

        // The re-rendered tree observes the write.
        let tree = render_sheet(&engine, &render_id).unwrap();
        let input = find(&tree, DisplayKind::Input).unwrap();
        assert_eq!(input.props.get("value").unwrap(), "16");
    }

    #[test]
    fn preview_without_actor_renders_blank_fields() {
        let mut engine = SheetEngine::new();
        engine
            .load_sheet("sheet-1", r#"<Sheet><Input name="character.name"/></Sheet>"#)
            .unwrap();
        let render_id = engine.create_render(None, "sheet-1", None);

        let tree = render_sheet(&engine, &render_id).unwrap();
        let input = find(&tree, DisplayKind::Input).unwrap();
        assert_eq!(input.props.get("value").unwrap(), "");
    }
}
