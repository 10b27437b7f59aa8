use itertools::Itertools;
use log::warn;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A generic tree of scalars and records. Actor, ruleset and sheet
/// documents all arrive as this shape; dotted-path reads and writes
/// traverse it with defined behavior on every miss.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub const NULL: Value = Value::Null;

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The user-visible form of a value. Missing data renders empty, which
    /// is what keeps partially loaded sheets displayable.
    pub fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(value) => value.to_string(),
            Value::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Value::String(value) => value.clone(),
            Value::Array(items) => items.iter().map(Value::display).join(", "),
            // Records have no sensible scalar form; sheets address leaves.
            Value::Object(_) => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Follows a dotted path into a value. Numeric segments index arrays. Any
/// missing segment resolves to `Null` rather than failing.
pub fn read<'a>(value: &'a Value, path: &str) -> &'a Value {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            return &Value::NULL;
        }
        current = match current {
            Value::Object(fields) => match fields.get(segment) {
                Some(next) => next,
                None => return &Value::NULL,
            },
            Value::Array(items) => {
                match segment.parse::<usize>().ok().and_then(|index| items.get(index)) {
                    Some(next) => next,
                    None => return &Value::NULL,
                }
            }
            _ => return &Value::NULL,
        };
    }
    current
}

/// Writes a value at a dotted path, creating intermediate records as
/// needed. Refuses to descend through scalars; a write cannot restructure
/// data it does not own.
pub fn write(target: &mut Value, path: &str, new_value: Value) {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        warn!("Refusing to write to the malformed path {:?}", path);
        return;
    }

    let segments: Vec<&str> = path.split('.').collect();
    write_segments(target, &segments, new_value, path);
}

fn write_segments(current: &mut Value, segments: &[&str], new_value: Value, path: &str) {
    let segment = segments[0];
    let last = segments.len() == 1;

    // Empty slots grow into records on demand.
    if current.is_null() {
        *current = Value::Object(BTreeMap::new());
    }

    match current {
        Value::Object(fields) => {
            if last {
                fields.insert(segment.to_string(), new_value);
                return;
            }
            let next = fields
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(BTreeMap::new()));
            write_segments(next, &segments[1..], new_value, path);
        }
        Value::Array(items) => {
            let Some(index) = segment.parse::<usize>().ok().filter(|i| *i < items.len()) else {
                warn!("Index {} is out of bounds while writing {}", segment, path);
                return;
            };
            if last {
                items[index] = new_value;
                return;
            }
            write_segments(&mut items[index], &segments[1..], new_value, path);
        }
        _ => {
            warn!("Refusing to write through a scalar at {} of {}", segment, path);
        }
    }
}
