use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_into, flatten_row, scalar_text};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go into a Field/Value table. Row arrays such as
/// schedule entries get their own table underneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result_table(result, map),
            None => print_field_table(map),
        },
        Value::Array(rows) => print_row_table(rows),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            let (rows, fields): (Vec<_>, Vec<_>) =
                res_map.iter().partition(|(_, v)| v.is_array());

            let mut scalars = Map::new();
            for (key, val) in fields {
                match val {
                    Value::Object(inner) => flatten_into(&mut scalars, key, inner),
                    _ => {
                        scalars.insert(key.clone(), val.clone());
                    }
                }
            }
            print_field_table(&scalars);

            for (key, val) in rows {
                if let Value::Array(items) = val {
                    println!("\n{}:", key);
                    print_row_table(items);
                }
            }
        }
        other => println!("{}", scalar_text(other, "null")),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &scalar_text(val, "null")]);
    }
    println!("{}", Table::from(builder));
}

fn print_row_table(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let flat: Vec<Map<String, Value>> = rows.iter().map(flatten_row).collect();
    let Some(first) = flat.first().filter(|r| !r.is_empty()) else {
        for item in rows {
            println!("{}", scalar_text(item, "null"));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in &flat {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(|v| scalar_text(v, "")).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}
