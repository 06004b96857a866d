pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys (`terms.principal`) so that
/// presets and comparison entries fit in one row.
pub(crate) fn flatten_row(value: &Value) -> Map<String, Value> {
    let mut row = Map::new();
    if let Value::Object(map) = value {
        flatten_into(&mut row, "", map);
    }
    row
}

pub(crate) fn flatten_into(row: &mut Map<String, Value>, prefix: &str, map: &Map<String, Value>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(row, &name, inner),
            other => {
                row.insert(name, other.clone());
            }
        }
    }
}

/// Render a scalar for text output. Nulls become the supplied placeholder.
pub(crate) fn scalar_text(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
