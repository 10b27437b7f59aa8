use crate::SheetError;
use crate::elements::{ElementKind, SheetNode};
use crate::parse::parse_sheet;
use crate::values::{self, Value};
use log::trace;
use std::collections::{BTreeMap, HashMap};

/// One loaded sheet: the immutable node tree plus the sheet-local
/// variables its markup declared.
struct SheetRecord {
    root: SheetNode,
    variables: Value,
}

/// Holds the parsed node tree of every loaded sheet, keyed by their ref.
#[derive(Default)]
pub struct SheetStore {
    sheets: HashMap<String, SheetRecord>,
}

impl SheetStore {
    pub fn new() -> Self {
        SheetStore::default()
    }

    /// Parses and loads a sheet's markup. Reloading replaces the whole
    /// tree; nothing is patched incrementally.
    pub fn load(&mut self, sheet_ref: &str, markup: &str) -> Result<(), SheetError> {
        let root = parse_sheet(markup)?;
        let variables = lift_variables(&root);
        trace!("Loaded sheet {} ({} nodes)", sheet_ref, count_nodes(&root));

        self.sheets
            .insert(sheet_ref.to_string(), SheetRecord { root, variables });
        Ok(())
    }

    pub fn is_loaded(&self, sheet_ref: &str) -> bool {
        self.sheets.contains_key(sheet_ref)
    }

    /// Unloads a single sheet. Returns false if none was found.
    pub fn unload(&mut self, sheet_ref: &str) -> bool {
        self.sheets.remove(sheet_ref).is_some()
    }

    pub fn get_sheet(&self, sheet_ref: &str) -> Option<&SheetNode> {
        self.sheets.get(sheet_ref).map(|record| &record.root)
    }

    /// Reads one sheet-local variable. Unknown sheets and undeclared
    /// variables both resolve to `Null`.
    pub fn get_variable(&self, sheet_ref: &str, path: &str) -> Value {
        match self.sheets.get(sheet_ref) {
            Some(record) => values::read(&record.variables, path).clone(),
            None => Value::Null,
        }
    }

    pub fn clear(&mut self) {
        self.sheets.clear();
    }
}

/// Collects every `<Variable name value/>` declaration in the tree.
/// Values are coerced: numbers and booleans parse, everything else stays a
/// string.
fn lift_variables(root: &SheetNode) -> Value {
    let mut variables = BTreeMap::new();
    collect_variables(root, &mut variables);
    Value::Object(variables)
}

fn collect_variables(node: &SheetNode, variables: &mut BTreeMap<String, Value>) {
    if node.kind == ElementKind::Variable {
        if let (Some(name), Some(value)) = (
            node.static_attribute("name"),
            node.static_attribute("value"),
        ) {
            variables.insert(name, coerce_scalar(&value));
        }
        return;
    }

    for child in &node.children {
        collect_variables(child, variables);
    }
}

fn coerce_scalar(raw: &str) -> Value {
    if let Ok(number) = raw.parse::<f64>() {
        return Value::Number(number);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn count_nodes(node: &SheetNode) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}
