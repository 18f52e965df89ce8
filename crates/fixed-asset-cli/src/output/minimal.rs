use serde_json::Value;

use super::format_value;

/// Result fields worth printing on their own, in priority order.
const PRIORITY_KEYS: [&str; 4] = [
    "monthly_estimate",
    "book_value",
    "remaining_useful_life_months",
    "totals",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, descending into
/// an object that carries the same key (`book_value.book_value`), then falls
/// back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    let inner = val.get(key).unwrap_or(val);
                    println!("{}", format_value(inner));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}
