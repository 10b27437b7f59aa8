use crate::scene::surface::{DrawSurface, PropKey};
use glam::Vec2;
use std::str::FromStr;

/// The scene's interaction mode. Exactly one mode is active at a time;
/// switching runs the outgoing mode's unset hook before the incoming
/// mode's set hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneMode {
    #[default]
    Select,
    Pan,
}

impl SceneMode {
    /// Applied when the mode becomes active.
    pub(crate) fn set(&self, surface: &mut dyn DrawSurface) {
        if let SceneMode::Pan = self {
            surface.set_button_mode(true);
        }
    }

    /// Applied when the mode is replaced. Undoes everything `set` did so
    /// modes compose cleanly in any order.
    pub(crate) fn unset(&self, surface: &mut dyn DrawSurface) {
        if let SceneMode::Pan = self {
            surface.set_button_mode(false);
        }
    }
}

impl FromStr for SceneMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(SceneMode::Select),
            "pan" => Ok(SceneMode::Pan),
            _ => Err(format!("Unknown scene mode: {}", s)),
        }
    }
}

/// An in-flight pointer drag. Dropped whenever the pointer is released
/// (inside or outside the scene) or the mode changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DragState {
    /// A prop following the pointer in Select mode. `grab_offset` keeps
    /// the point grabbed under the cursor, not the prop origin.
    Prop { key: PropKey, grab_offset: Vec2 },
    /// The viewport following the pointer in Pan mode.
    Pan {
        pointer_start: Vec2,
        viewport_start: Vec2,
    },
}
