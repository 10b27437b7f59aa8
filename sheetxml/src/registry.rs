use log::trace;
use std::collections::HashMap;

/// The ref substituted when a render has no backing actor or ruleset, so
/// that downstream lookups never branch on nullability. Reads against it
/// simply miss and resolve empty.
pub const TEMP_REF: &str = "temp";

/// The three refs one on-screen sheet instance is bound to. Many renders
/// may point at the same refs; the underlying data is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderGroup {
    pub actor_ref: String,
    pub sheet_ref: String,
    pub ruleset_ref: String,
}

/// Maps an opaque render id to its ref triple, so that accessing any of
/// the three values requires only one key.
#[derive(Default)]
pub struct RenderRegistry {
    renders: HashMap<String, RenderGroup>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        RenderRegistry::default()
    }

    /// Initializes a render. The id defaults to the actor ref, falling
    /// back to the sheet ref when no actor is given — at most one live
    /// render per real actor, while a sheet can be previewed without one.
    pub fn create_render(
        &mut self,
        actor_ref: Option<&str>,
        sheet_ref: &str,
        ruleset_ref: Option<&str>,
    ) -> String {
        let id = actor_ref.unwrap_or(sheet_ref).to_string();
        let group = RenderGroup {
            actor_ref: actor_ref.unwrap_or(TEMP_REF).to_string(),
            sheet_ref: sheet_ref.to_string(),
            ruleset_ref: ruleset_ref.unwrap_or(TEMP_REF).to_string(),
        };
        trace!("Render {} bound to {:?}", id, group);
        self.renders.insert(id.clone(), group);
        id
    }

    pub fn get(&self, render_id: &str) -> Option<&RenderGroup> {
        self.renders.get(render_id)
    }

    /// Discards a render binding, e.g. when its view unmounts. The
    /// underlying stores are untouched; loads completing afterwards are
    /// simply inert.
    pub fn discard_render(&mut self, render_id: &str) -> bool {
        self.renders.remove(render_id).is_some()
    }

    pub fn clear(&mut self) {
        self.renders.clear();
    }
}
