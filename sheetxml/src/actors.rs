use crate::values::{self, Value};
use log::{trace, warn};
use std::collections::{BTreeMap, HashMap};

/// One loaded actor: its field document plus the repeatable content groups
/// (inventory rows and the like), lifted out of the document at load time
/// so list mutation never restructures the field tree.
#[derive(Debug, Default)]
struct ActorRecord {
    document: Value,
    content: HashMap<String, Vec<Value>>,
}

/// Holds the field data of every loaded actor, keyed by their ref.
/// Mutators on unknown refs are deliberate no-ops: render teardown races
/// are normal and the caller has already validated the render session.
#[derive(Default)]
pub struct ActorStore {
    actors: HashMap<String, ActorRecord>,
}

impl ActorStore {
    pub fn new() -> Self {
        ActorStore::default()
    }

    /// Loads an actor's values. Idempotent unless `force` is set, so the
    /// same actor arriving through multiple concurrent renders is only
    /// processed once.
    pub fn load(&mut self, actor_ref: &str, mut document: Value, force: bool) {
        if !force && self.is_loaded(actor_ref) {
            trace!("Actor {} is already loaded, skipping", actor_ref);
            return;
        }

        let content = lift_content(&mut document);
        self.actors
            .insert(actor_ref.to_string(), ActorRecord { document, content });
    }

    pub fn is_loaded(&self, actor_ref: &str) -> bool {
        self.actors.contains_key(actor_ref)
    }

    /// Unloads a single actor. Returns false if none was found.
    pub fn unload(&mut self, actor_ref: &str) -> bool {
        self.actors.remove(actor_ref).is_some()
    }

    pub fn get(&self, actor_ref: &str) -> Option<&Value> {
        self.actors.get(actor_ref).map(|record| &record.document)
    }

    /// Reads a single dotted-path field. Missing actors and missing paths
    /// both resolve to `Null`.
    pub fn get_field(&self, actor_ref: &str, path: &str) -> Value {
        match self.actors.get(actor_ref) {
            Some(record) => values::read(&record.document, path).clone(),
            None => Value::Null,
        }
    }

    pub fn set_field(&mut self, actor_ref: &str, path: &str, value: Value) {
        let Some(record) = self.actors.get_mut(actor_ref) else {
            warn!("Ignoring a field write to the unknown actor {}", actor_ref);
            return;
        };
        values::write(&mut record.document, path, value);
    }

    /// The items of a content group, in insertion order. Empty for unknown
    /// actors and unknown groups alike.
    pub fn content(&self, actor_ref: &str, group: &str) -> &[Value] {
        self.actors
            .get(actor_ref)
            .and_then(|record| record.content.get(group))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends an item to a content group, creating the group if this is
    /// its first item. Without an explicit item an empty record is added.
    pub fn push_content(&mut self, actor_ref: &str, group: &str, item: Option<Value>) {
        let Some(record) = self.actors.get_mut(actor_ref) else {
            warn!("Ignoring a content push to the unknown actor {}", actor_ref);
            return;
        };
        let item = item.unwrap_or_else(|| Value::Object(BTreeMap::new()));
        record.content.entry(group.to_string()).or_default().push(item);
    }

    /// Removes the item at `index`, shifting everything behind it down by
    /// one. The list is rebuilt, there are no holes left behind.
    pub fn delete_content(&mut self, actor_ref: &str, group: &str, index: usize) {
        let Some(items) = self
            .actors
            .get_mut(actor_ref)
            .and_then(|record| record.content.get_mut(group))
        else {
            warn!(
                "Ignoring a content delete on {} / {}: nothing is loaded there",
                actor_ref, group
            );
            return;
        };

        if index >= items.len() {
            warn!(
                "Ignoring a content delete at index {} of {} ({} items)",
                index,
                group,
                items.len()
            );
            return;
        }

        items.remove(index);
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }
}

/// Pulls the `content` object out of a raw actor document. Groups must be
/// arrays; anything else is dropped with a warning.
fn lift_content(document: &mut Value) -> HashMap<String, Vec<Value>> {
    let mut content = HashMap::new();

    let Value::Object(fields) = document else {
        return content;
    };
    let Some(raw_content) = fields.remove("content") else {
        return content;
    };
    let Value::Object(groups) = raw_content else {
        warn!("The actor's content is not a record of groups, dropping it");
        return content;
    };

    for (group, items) in groups {
        match items {
            Value::Array(items) => {
                content.insert(group, items);
            }
            _ => warn!("The content group {} is not a list, dropping it", group),
        }
    }

    content
}
