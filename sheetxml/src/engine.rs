use crate::SheetError;
use crate::actors::ActorStore;
use crate::elements::SheetNode;
use crate::registry::{RenderRegistry, TEMP_REF};
use crate::rulesets::{RuleGroup, RulesetStore};
use crate::sheets::SheetStore;
use crate::values::{self, Value};
use log::trace;
use sheetxml_parser::expression::{ExpressionSegment, ParsedExpression};
use std::collections::BTreeMap;

/// Loop-local properties, layered over the stores during resolution. The
/// loop key and `index` of every enclosing Loop live here.
pub type SheetProperties = BTreeMap<String, Value>;

/// The context object owning every scope store and the render registry.
/// Constructed once at application start and passed by reference to
/// whatever loads or renders sheets; `clear` resets it on logout.
///
/// All accessors take a render id and translate it to the underlying refs,
/// returning empty results for unknown ids — a render being torn down while
/// reads are still in flight is expected and harmless.
#[derive(Default)]
pub struct SheetEngine {
    actors: ActorStore,
    rulesets: RulesetStore,
    sheets: SheetStore,
    renders: RenderRegistry,
    revision: u64,
}

impl SheetEngine {
    pub fn new() -> Self {
        SheetEngine::default()
    }

    /// Monotonic change counter. Bumped by every mutation; a watcher that
    /// compares revisions observes any write by its next poll.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Binds a new render to its actor/sheet/ruleset refs and returns the
    /// id to access it by. Absent refs fall back to the `"temp"` sentinel.
    pub fn create_render(
        &mut self,
        actor_ref: Option<&str>,
        sheet_ref: &str,
        ruleset_ref: Option<&str>,
    ) -> String {
        self.bump();
        self.renders.create_render(actor_ref, sheet_ref, ruleset_ref)
    }

    pub fn discard_render(&mut self, render_id: &str) -> bool {
        self.bump();
        self.renders.discard_render(render_id)
    }

    /// Loads an actor's values. A `None` document simplifies callers
    /// draining optional fetch results; it does nothing.
    pub fn load_actor(&mut self, actor_ref: &str, document: Option<Value>, force: bool) {
        let Some(document) = document else {
            return;
        };
        self.actors.load(actor_ref, document, force);
        self.bump();
    }

    /// Parses a sheet's markup and loads the resulting node tree.
    pub fn load_sheet(&mut self, sheet_ref: &str, markup: &str) -> Result<(), SheetError> {
        self.sheets.load(sheet_ref, markup)?;
        self.bump();
        Ok(())
    }

    /// Loads the combined values of a ruleset (and its campaign overlay,
    /// once that exists).
    pub fn load_ruleset(&mut self, ruleset_ref: &str, document: Value) {
        self.rulesets.load(ruleset_ref, document);
        self.bump();
    }

    pub fn unload_actor(&mut self, actor_ref: &str) -> bool {
        self.bump();
        self.actors.unload(actor_ref)
    }

    pub fn unload_sheet(&mut self, sheet_ref: &str) -> bool {
        self.bump();
        self.sheets.unload(sheet_ref)
    }

    pub fn unload_ruleset(&mut self, ruleset_ref: &str) -> bool {
        self.bump();
        self.rulesets.unload(ruleset_ref)
    }

    /// Drops everything, e.g. when the user logs out.
    pub fn clear(&mut self) {
        self.actors.clear();
        self.rulesets.clear();
        self.sheets.clear();
        self.renders.clear();
        self.bump();
    }

    /// The actor ref behind a render, or the shared temp ref for unknown
    /// renders.
    pub fn get_actor_ref(&self, render_id: &str) -> &str {
        match self.renders.get(render_id) {
            Some(group) => &group.actor_ref,
            None => TEMP_REF,
        }
    }

    pub fn get_actor(&self, render_id: &str) -> Option<&Value> {
        let group = self.renders.get(render_id)?;
        self.actors.get(&group.actor_ref)
    }

    pub fn get_sheet(&self, render_id: &str) -> Option<&SheetNode> {
        let group = self.renders.get(render_id)?;
        self.sheets.get_sheet(&group.sheet_ref)
    }

    pub fn is_actor_loaded(&self, render_id: &str) -> bool {
        match self.renders.get(render_id) {
            Some(group) => self.actors.is_loaded(&group.actor_ref),
            None => false,
        }
    }

    /// Reads a single actor field through a render binding.
    pub fn get_actor_field(&self, render_id: &str, path: &str) -> Value {
        match self.renders.get(render_id) {
            Some(group) => self.actors.get_field(&group.actor_ref, path),
            None => Value::Null,
        }
    }

    /// Writes a single actor field through a render binding. Unknown
    /// renders are a no-op; the caller validated the session when it
    /// mounted.
    pub fn set_actor_field(&mut self, render_id: &str, path: &str, value: Value) {
        let Some(group) = self.renders.get(render_id) else {
            return;
        };
        let actor_ref = group.actor_ref.clone();
        self.actors.set_field(&actor_ref, path, value);
        self.bump();
    }

    pub fn get_content(&self, render_id: &str, group: &str) -> &[Value] {
        match self.renders.get(render_id) {
            Some(render) => self.actors.content(&render.actor_ref, group),
            None => &[],
        }
    }

    pub fn push_new_content(&mut self, render_id: &str, group: &str, item: Option<Value>) {
        let Some(render) = self.renders.get(render_id) else {
            return;
        };
        let actor_ref = render.actor_ref.clone();
        self.actors.push_content(&actor_ref, group, item);
        self.bump();
    }

    pub fn delete_content_item(&mut self, render_id: &str, group: &str, index: usize) {
        let Some(render) = self.renders.get(render_id) else {
            return;
        };
        let actor_ref = render.actor_ref.clone();
        self.actors.delete_content(&actor_ref, group, index);
        self.bump();
    }

    /// Renders a whole parsed expression into its display string. Literal
    /// segments pass through, variables resolve against this render's
    /// scopes. Never fails; missing data renders empty.
    pub fn render_variable(
        &self,
        render_id: &str,
        expression: &ParsedExpression,
        properties: &SheetProperties,
    ) -> String {
        let mut rendered = String::new();
        for segment in &expression.segments {
            match segment {
                ExpressionSegment::Text(text) => rendered.push_str(text),
                ExpressionSegment::Variable(variable) => {
                    rendered.push_str(&self.resolve_variable(render_id, variable, properties).display());
                }
            }
        }
        rendered
    }

    /// Resolves one dotted variable path by namespace dispatch on its
    /// first segment. Anything that is not a known namespace is looked up
    /// as a whole inside the loop-local properties.
    pub fn resolve_variable(
        &self,
        render_id: &str,
        variable: &str,
        properties: &SheetProperties,
    ) -> Value {
        if variable.is_empty() {
            return Value::Null;
        }

        // The namespace is everything before the first period. A bare name
        // keeps the whole path as both namespace and remainder.
        let (namespace, remainder) = match variable.find('.') {
            Some(index) if index > 0 => (&variable[..index], &variable[index + 1..]),
            _ => (variable, variable),
        };

        let Some(render) = self.renders.get(render_id) else {
            trace!("Resolving {} against the unknown render {}", variable, render_id);
            return Value::Null;
        };

        match namespace {
            // The value comes from the actor bound to this render
            "character" => self.actors.get_field(&render.actor_ref, remainder),
            // A whole content group; the caller decides how to display it
            "content" => Value::Array(self.actors.content(&render.actor_ref, remainder).to_vec()),
            // The value comes from the ruleset (and later the campaign)
            "rules" => {
                self.rulesets
                    .get_variable(&render.ruleset_ref, RuleGroup::Static, remainder)
            }
            // A value the sheet declared for itself
            "sheet" => self.sheets.get_variable(&render.sheet_ref, remainder),
            // A loop-local property; the whole path is looked up, not the
            // remainder, and an absent top segment short-circuits empty
            _ => match properties.get(namespace) {
                None => Value::Null,
                Some(value) if namespace == remainder => value.clone(),
                Some(value) => values::read(value, remainder).clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_render() -> (SheetEngine, String) {
        let mut engine = SheetEngine::new();
        engine
            .load_sheet(
                "sheet-1",
                r#"<Sheet>
                    <Variable name="title" value="Waals"/>
                    <Input name="character.stats.strength"/>
                </Sheet>"#,
            )
            .unwrap();
        let actor: Value = serde_json::from_str(
            r#"{
                "name": "Waals",
                "stats": { "strength": 14 },
                "content": { "inventory": [ { "name": "Rope" } ] }
            }"#,
        )
        .unwrap();
        engine.load_actor("60ab0f", Some(actor), false);
        let ruleset: Value = serde_json::from_str(r#"{ "rules": { "maxHp": 20 } }"#).unwrap();
        engine.load_ruleset("5e", ruleset);

        let render_id = engine.create_render(Some("60ab0f"), "sheet-1", Some("5e"));
        (engine, render_id)
    }

    #[test]
    fn namespaces_dispatch_to_their_stores() {
        let (engine, render_id) = engine_with_render();
        let properties = SheetProperties::new();

        assert_eq!(
            engine.resolve_variable(&render_id, "character.stats.strength", &properties),
            Value::Number(14.0)
        );
        assert_eq!(
            engine.resolve_variable(&render_id, "rules.maxHp", &properties),
            Value::Number(20.0)
        );
        assert_eq!(
            engine.resolve_variable(&render_id, "sheet.title", &properties),
            Value::from("Waals")
        );
        match engine.resolve_variable(&render_id, "content.inventory", &properties) {
            Value::Array(items) => assert_eq!(items.len(), 1),
            other => panic!("Expected the content group, got {:?}", other),
        }
    }

    #[test]
    fn loop_properties_resolve_by_whole_path() {
        let (engine, render_id) = engine_with_render();
        let mut properties = SheetProperties::new();
        let item: Value = serde_json::from_str(r#"{ "name": "Rope" }"#).unwrap();
        properties.insert("item".to_string(), item);
        properties.insert("index".to_string(), Value::from(0i64));

        assert_eq!(
            engine.resolve_variable(&render_id, "item.name", &properties),
            Value::from("Rope")
        );
        assert_eq!(
            engine.resolve_variable(&render_id, "index", &properties),
            Value::Number(0.0)
        );
        // An absent top segment short-circuits to empty.
        assert!(
            engine
                .resolve_variable(&render_id, "missing.name", &properties)
                .is_null()
        );
    }

    #[test]
    fn unknown_render_ids_resolve_empty_everywhere() {
        let (engine, _) = engine_with_render();
        let properties = SheetProperties::new();

        assert!(engine.get_actor("nope").is_none());
        assert!(engine.get_sheet("nope").is_none());
        assert_eq!(engine.get_actor_ref("nope"), TEMP_REF);
        assert!(engine.get_actor_field("nope", "name").is_null());
        assert!(engine.get_content("nope", "inventory").is_empty());
        assert!(!engine.is_actor_loaded("nope"));
        assert!(
            engine
                .resolve_variable("nope", "character.name", &properties)
                .is_null()
        );
    }

    #[test]
    fn writes_through_a_render_are_read_back() {
        let (mut engine, render_id) = engine_with_render();
        engine.set_actor_field(&render_id, "stats.strength", Value::from(16i64));
        assert_eq!(
            engine.get_actor_field(&render_id, "stats.strength"),
            Value::Number(16.0)
        );
    }

    #[test]
    fn every_write_bumps_the_revision() {
        let (mut engine, render_id) = engine_with_render();
        let before = engine.revision();
        engine.set_actor_field(&render_id, "name", Value::from("Other"));
        assert!(engine.revision() > before);

        let before = engine.revision();
        engine.push_new_content(&render_id, "inventory", None);
        engine.delete_content_item(&render_id, "inventory", 0);
        assert!(engine.revision() >= before + 2);
    }

    #[test]
    fn writes_to_unknown_renders_are_inert() {
        let (mut engine, render_id) = engine_with_render();
        engine.set_actor_field("nope", "stats.strength", Value::from(99i64));
        assert_eq!(
            engine.get_actor_field(&render_id, "stats.strength"),
            Value::Number(14.0)
        );
    }

    #[test]
    fn unloading_an_actor_leaves_reads_empty() {
        let (mut engine, render_id) = engine_with_render();
        assert!(engine.unload_actor("60ab0f"));
        assert!(engine.get_actor_field(&render_id, "name").is_null());
        assert!(!engine.is_actor_loaded(&render_id));
    }

    #[test]
    fn rendering_concatenates_text_and_variables() {
        let (engine, render_id) = engine_with_render();
        let expression =
            sheetxml_parser::expression::split_expression_value("Hello {{sheet.title}}");
        assert_eq!(
            engine.render_variable(&render_id, &expression, &SheetProperties::new()),
            "Hello Waals"
        );
    }

    #[test]
    fn clear_resets_all_stores() {
        let (mut engine, render_id) = engine_with_render();
        engine.clear();
        assert!(engine.get_sheet(&render_id).is_none());
        assert!(engine.get_actor_field(&render_id, "name").is_null());
    }
}
