use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_value, primary_rows};

/// Format output as tables: a field/value summary of the result, then the
/// schedule entries or register lines as their own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result(result, map),
            None => print_fields(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            print_fields(&scalar_fields(res_map));
            if let Some(rows) = primary_rows(result) {
                println!();
                print_rows(rows);
            }
        }
        Value::Null => println!("(no result)"),
        other => println!("{}", format_value(other)),
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

/// Top-level scalars, plus the scalars of nested single objects flattened
/// as `parent.child` (e.g. `book_value.book_value`).
fn scalar_fields(map: &Map<String, Value>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, val) in map {
        match val {
            Value::Array(_) => {}
            Value::Object(inner) => {
                for (child, child_val) in inner {
                    if !child_val.is_array() && !child_val.is_object() {
                        fields.insert(format!("{key}.{child}"), child_val.clone());
                    }
                }
            }
            scalar => {
                fields.insert(key.clone(), scalar.clone());
            }
        }
    }
    fields
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_value(item));
        }
        if arr.is_empty() {
            println!("(empty)");
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}
