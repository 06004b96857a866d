use serde_json::Value;
use std::io::{self, Write};

use super::{flatten_row, scalar_text};

/// Write output as CSV to stdout.
///
/// A result carrying `entries` (schedules, comparisons) is written one row
/// per entry; any other result becomes a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let _ = write_csv(stdout.lock(), value);
}

fn write_csv<W: Write>(out: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match result.get("entries") {
                Some(Value::Array(entries)) => write_rows(&mut wtr, entries)?,
                _ => write_fields(&mut wtr, &Value::Object(result.clone()))?,
            },
            _ => write_fields(&mut wtr, value)?,
        },
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        _ => wtr.write_record([scalar_text(value, "")])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_fields<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> Result<(), csv::Error> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten_row(value) {
        wtr.write_record([key, scalar_text(&val, "")])?;
    }
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let flat: Vec<_> = rows.iter().map(flatten_row).collect();
    let Some(first) = flat.first() else {
        return Ok(());
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    wtr.write_record(&headers)?;
    for row in &flat {
        wtr.write_record(
            headers
                .iter()
                .map(|h| row.get(h).map(|v| scalar_text(v, "")).unwrap_or_default()),
        )?;
    }
    Ok(())
}
