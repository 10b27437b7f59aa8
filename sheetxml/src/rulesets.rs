use crate::values::{self, Value};
use log::trace;
use std::collections::HashMap;

/// The groups a rule variable can belong to. Only static variables exist
/// today; computed/campaign groups will slot in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    Static,
}

impl RuleGroup {
    /// The key the group's variables live under inside a ruleset document.
    fn document_key(&self) -> &'static str {
        match self {
            RuleGroup::Static => "rules",
        }
    }
}

/// Holds the rule variables of every loaded ruleset, keyed by their ref.
#[derive(Default)]
pub struct RulesetStore {
    rulesets: HashMap<String, Value>,
}

impl RulesetStore {
    pub fn new() -> Self {
        RulesetStore::default()
    }

    /// Loads the combined values of a ruleset. Reloading replaces the
    /// previous document.
    pub fn load(&mut self, ruleset_ref: &str, document: Value) {
        trace!("Loading ruleset {}", ruleset_ref);
        self.rulesets.insert(ruleset_ref.to_string(), document);
    }

    pub fn is_loaded(&self, ruleset_ref: &str) -> bool {
        self.rulesets.contains_key(ruleset_ref)
    }

    /// Unloads a single ruleset. Returns false if none was found.
    pub fn unload(&mut self, ruleset_ref: &str) -> bool {
        self.rulesets.remove(ruleset_ref).is_some()
    }

    pub fn get(&self, ruleset_ref: &str) -> Option<&Value> {
        self.rulesets.get(ruleset_ref)
    }

    /// Reads one rule variable. Unknown rulesets and unknown variables both
    /// resolve to `Null`.
    pub fn get_variable(&self, ruleset_ref: &str, group: RuleGroup, path: &str) -> Value {
        let Some(document) = self.rulesets.get(ruleset_ref) else {
            return Value::Null;
        };
        let variables = values::read(document, group.document_key());
        values::read(variables, path).clone()
    }

    pub fn clear(&mut self) {
        self.rulesets.clear();
    }
}
