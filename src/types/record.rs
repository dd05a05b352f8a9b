// src/types/record.rs
//! Exportable record rows

use serde_json::{Map, Value};

/// One exportable row: field name -> scalar value, in insertion order.
pub type Record = Map<String, Value>;

/// Render a field value the way it appears in a CSV cell.
/// Null and absent fields are empty; nested values fall back to compact JSON.
pub fn field_to_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Field names of a record in their natural order
pub fn field_names(record: &Record) -> Vec<String> {
    record.keys().cloned().collect()
}
