pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Paths (under `result`) of the row collections each command produces:
/// schedule entries for `schedule`, register lines for `register`.
const ROW_PATHS: [&[&str]; 2] = [&["schedule", "entries"], &["lines"]];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The per-period or per-asset rows inside a result object, if any.
pub(crate) fn primary_rows(result: &Value) -> Option<&Vec<Value>> {
    ROW_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(result, |v, key| v.get(*key))
            .and_then(Value::as_array)
    })
}

/// Render a scalar for display; nested values fall back to compact JSON.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_rows_finds_schedule_entries() {
        let result = json!({ "schedule": { "entries": [{ "period_index": 1 }] } });
        assert_eq!(primary_rows(&result).map(Vec::len), Some(1));
    }

    #[test]
    fn test_primary_rows_finds_register_lines() {
        let result = json!({ "lines": [{ "asset_id": "FA-1" }, { "asset_id": "FA-2" }] });
        assert_eq!(primary_rows(&result).map(Vec::len), Some(2));
    }

    #[test]
    fn test_primary_rows_absent() {
        assert!(primary_rows(&json!({ "book_value": "10.00" })).is_none());
    }
}
