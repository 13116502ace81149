use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of a result go into a Field/Value table; every list of
/// records (projection years, deposit scenarios, installment tiers) gets a
/// table of its own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if map.values().any(|v| v.get("result").is_some()) {
                // Lot report: one envelope per calculator.
                for (name, section) in map {
                    println!("== {} ==", name);
                    print_table(section);
                    println!();
                }
            } else {
                print_object(map, None);
            }
        }
        Value::Array(arr) => print_records(arr, None),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map, None),
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

fn print_object(map: &Map<String, Value>, title: Option<&str>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut has_rows = false;
    for (key, val) in map {
        if is_nested(val) {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
        has_rows = true;
    }
    if has_rows {
        if let Some(t) = title {
            println!("\n{}", t);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        let label = match title {
            Some(t) => format!("{} / {}", t, key),
            None => key.clone(),
        };
        match val {
            Value::Array(arr) if arr.iter().any(Value::is_object) => print_records(arr, Some(&label)),
            Value::Object(inner) => print_object(inner, Some(&label)),
            _ => {}
        }
    }
}

fn print_records(arr: &[Value], title: Option<&str>) {
    if let Some(t) = title {
        println!("\n{}", t);
    }
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first
            .iter()
            .filter(|(_, v)| !is_record_list(v))
            .map(|(k, _)| k.clone())
            .collect();
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

        // Nested record lists, e.g. each scenario's yearly breakdown.
        for item in arr {
            if let Value::Object(map) = item {
                let name = map
                    .get("key")
                    .or_else(|| map.get("tier"))
                    .map(format_value)
                    .unwrap_or_default();
                for (k, v) in map {
                    if let Value::Array(inner) = v {
                        if is_record_list(v) {
                            let label = match title {
                                Some(t) => format!("{} / {} / {}", t, name, k),
                                None => format!("{} / {}", name, k),
                            };
                            print_records(inner, Some(&label));
                        }
                    }
                }
            }
        }
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn is_record_list(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if arr.iter().any(Value::is_object))
}

fn is_nested(value: &Value) -> bool {
    value.is_object() || is_record_list(value)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
