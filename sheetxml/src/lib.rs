use thiserror::Error;

pub mod actors;
pub mod elements;
pub mod engine;
pub mod parse;
pub mod registry;
pub mod renderer;
pub mod rulesets;
pub mod sheets;
pub mod values;

pub use engine::{SheetEngine, SheetProperties};
pub use renderer::{DisplayKind, DisplayNode, RenderWatcher, render_sheet};
pub use values::Value;

/// Errors produced while loading a sheet. Everything past loading is
/// deliberately infallible: a missing value resolves to an empty string so
/// that a partially loaded sheet still renders.
#[derive(Error, Debug)]
pub enum SheetError {
    /// The markup is not structurally valid XML. This is the only condition
    /// that fails a whole sheet; every per-element problem degrades to a
    /// Void node instead.
    #[error("Failed to parse sheet markup: {0}")]
    Markup(String),

    /// A required attribute was absent on an element. Fails the parse of
    /// that element only and ends up as the reason on its Void node.
    #[error("The element {element} requires the attribute {attribute}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}
