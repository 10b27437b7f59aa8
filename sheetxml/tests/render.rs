use sheetxml::renderer::{DisplayKind, DisplayNode, RenderWatcher, render_sheet};
use sheetxml::{SheetEngine, SheetProperties, Value};

const SHEET_REF: &str = "sheet-1";
const ACTOR_REF: &str = "60ab0f";
const RULESET_REF: &str = "5e";

fn actor_document() -> Value {
    serde_json::from_str(
        r#"{
            "name": "Waals",
            "alignment": "good",
            "inspired": true,
            "class": "fighter",
            "notes": "Found a map.",
            "stats": { "strength": 14 },
            "content": {
                "inventory": [
                    { "name": "Rope", "count": 1 },
                    { "name": "Torch", "count": 3 },
                    { "name": "Rations", "count": 5 }
                ]
            }
        }"#,
    )
    .unwrap()
}

fn ruleset_document() -> Value {
    serde_json::from_str(r#"{ "name": "5e", "rules": { "maxHp": 20 } }"#).unwrap()
}

fn loaded_engine() -> (SheetEngine, String) {
    let mut engine = SheetEngine::new();
    engine
        .load_sheet(SHEET_REF, include_str!("CharacterSheet.xml"))
        .expect("The fixture sheet to parse");
    engine.load_actor(ACTOR_REF, Some(actor_document()), false);
    engine.load_ruleset(RULESET_REF, ruleset_document());
    let render_id = engine.create_render(Some(ACTOR_REF), SHEET_REF, Some(RULESET_REF));
    (engine, render_id)
}

fn collect<'a>(node: &'a DisplayNode, kind: DisplayKind, found: &mut Vec<&'a DisplayNode>) {
    if node.kind == kind {
        found.push(node);
    }
    for child in &node.children {
        collect(child, kind, found);
    }
}

fn find_all(node: &DisplayNode, kind: DisplayKind) -> Vec<&DisplayNode> {
    let mut found = Vec::new();
    collect(node, kind, &mut found);
    found
}

#[test]
fn full_sheet_renders_every_binding() {
    let (engine, render_id) = loaded_engine();
    let tree = render_sheet(&engine, &render_id).expect("The sheet to render");

    let inputs = find_all(&tree, DisplayKind::Input);
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].props.get("value").unwrap(), "Waals");
    assert_eq!(inputs[1].props.get("value").unwrap(), "14");

    let texts = find_all(&tree, DisplayKind::Text);
    assert!(texts.iter().any(|t| t.props.get("text").unwrap() == "Hello Adventurer"));
    assert!(texts.iter().any(|t| t.props.get("text").unwrap() == "20"));

    let checkboxes = find_all(&tree, DisplayKind::Checkbox);
    assert_eq!(checkboxes[0].props.get("value").unwrap(), "true");

    let radios = find_all(&tree, DisplayKind::Radio);
    assert_eq!(radios.len(), 2);
    assert_eq!(radios[0].props.get("checked").unwrap(), "true");
    assert_eq!(radios[1].props.get("checked").unwrap(), "false");

    let selects = find_all(&tree, DisplayKind::Select);
    assert_eq!(selects[0].props.get("value").unwrap(), "fighter");

    let areas = find_all(&tree, DisplayKind::TextArea);
    assert_eq!(areas[0].props.get("value").unwrap(), "Found a map.");
}

#[test]
fn loop_rows_follow_content_mutations() {
    let (mut engine, render_id) = loaded_engine();

    let tree = render_sheet(&engine, &render_id).unwrap();
    let texts = find_all(&tree, DisplayKind::Text);
    assert!(texts.iter().any(|t| t.props.get("text").unwrap() == "Torch x3"));

    // Deleting index 1 moves Rations up; the re-rendered loop follows.
    engine.delete_content_item(&render_id, "inventory", 1);
    let tree = render_sheet(&engine, &render_id).unwrap();
    let texts = find_all(&tree, DisplayKind::Text);
    assert!(!texts.iter().any(|t| t.props.get("text").unwrap() == "Torch x3"));
    assert!(texts.iter().any(|t| t.props.get("text").unwrap() == "Rations x5"));

    let item: Value = serde_json::from_str(r#"{ "name": "Lantern", "count": 1 }"#).unwrap();
    engine.push_new_content(&render_id, "inventory", Some(item));
    let tree = render_sheet(&engine, &render_id).unwrap();
    let texts = find_all(&tree, DisplayKind::Text);
    assert!(texts.iter().any(|t| t.props.get("text").unwrap() == "Lantern x1"));
}

#[test]
fn edits_are_visible_by_the_next_poll() {
    let (mut engine, render_id) = loaded_engine();
    let mut watcher = RenderWatcher::new(&engine);

    engine.set_actor_field(&render_id, "stats.strength", Value::from(16i64));
    assert!(watcher.poll(&engine));

    let tree = render_sheet(&engine, &render_id).unwrap();
    let inputs = find_all(&tree, DisplayKind::Input);
    assert_eq!(inputs[1].props.get("value").unwrap(), "16");
}

#[test]
fn two_renders_of_one_actor_share_data() {
    let (mut engine, render_id) = loaded_engine();
    engine
        .load_sheet("sheet-2", r#"<Sheet><Input name="character.stats.strength"/></Sheet>"#)
        .unwrap();
    // Same actor, different sheet: the render id collides with the first
    // render on purpose (one live render per real actor), so rebind it.
    let second = engine.create_render(Some(ACTOR_REF), "sheet-2", None);
    assert_eq!(second, render_id);

    engine.set_actor_field(&second, "stats.strength", Value::from(9i64));
    assert_eq!(
        engine.get_actor_field(&render_id, "stats.strength"),
        Value::Number(9.0)
    );
}

#[test]
fn reparsing_identical_markup_yields_equal_trees() {
    let markup = include_str!("CharacterSheet.xml");
    let first = sheetxml::parse::parse_sheet(markup).unwrap();
    let second = sheetxml::parse::parse_sheet(markup).unwrap();
    assert_eq!(first, second);
}

#[test]
fn static_expressions_resolve_to_themselves() {
    let (engine, render_id) = loaded_engine();
    for raw in ["", "plain text", "no markers here: { }"] {
        let expression = sheetxml_parser::expression::split_expression_value(raw);
        assert_eq!(
            engine.render_variable(&render_id, &expression, &SheetProperties::new()),
            raw
        );
    }
}

#[test]
fn unloading_midway_blanks_the_sheet_without_failing() {
    let (mut engine, render_id) = loaded_engine();
    engine.unload_actor(ACTOR_REF);

    let tree = render_sheet(&engine, &render_id).expect("The sheet itself is still loaded");
    let inputs = find_all(&tree, DisplayKind::Input);
    assert_eq!(inputs[0].props.get("value").unwrap(), "");

    engine.unload_sheet(SHEET_REF);
    assert!(render_sheet(&engine, &render_id).is_none());
}
