use serde_json::Value;

use super::scalar_text;

/// Headline figure of each command, in lookup order.
const PRIORITY_KEYS: [&str; 5] = [
    "monthly_installment",
    "interest_saved",
    "percent_complete",
    "summary.savings_amount",
    "outstanding_balance",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_text(value));
}

fn minimal_text(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = lookup(result_obj, key).filter(|v| !v.is_null()) {
                return scalar_text(val, "null");
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar_text(val, "null"));
        }
    }

    scalar_text(result_obj, "null")
}

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |node, part| node.as_object()?.get(part))
}
