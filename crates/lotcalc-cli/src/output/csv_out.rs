use serde_json::{Map, Value};
use std::io;

/// Write output as CSV to stdout.
///
/// The first list of records found in the result is written one row per
/// record; installment plans are written one row per tier with the plan's
/// months in front. Results without records become field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            let rows = record_rows(map);
            if rows.is_empty() {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            } else {
                write_rows(&mut wtr, &rows);
            }
        }
        Value::Array(arr) => {
            let rows: Vec<(Option<String>, &Map<String, Value>)> =
                arr.iter().filter_map(Value::as_object).map(|m| (None, m)).collect();
            write_rows(&mut wtr, &rows);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(result)]);
        }
    }

    let _ = wtr.flush();
}

/// Records in the result, each tagged with the group it came from.
fn record_rows(map: &Map<String, Value>) -> Vec<(Option<String>, &Map<String, Value>)> {
    if let Some(arr) = map.values().find_map(as_records) {
        return arr.iter().filter_map(Value::as_object).map(|m| (None, m)).collect();
    }

    let mut rows = Vec::new();
    for (key, val) in map {
        if let Value::Object(inner) = val {
            let group = inner
                .get("months")
                .map(format_csv_value)
                .unwrap_or_else(|| key.clone());
            if let Some(arr) = inner.values().find_map(as_records) {
                rows.extend(
                    arr.iter()
                        .filter_map(Value::as_object)
                        .map(|m| (Some(group.clone()), m)),
                );
            }
        }
    }
    rows
}

fn as_records(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(arr) if arr.iter().any(Value::is_object) => Some(arr),
        _ => None,
    }
}

fn write_rows(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    rows: &[(Option<String>, &Map<String, Value>)],
) {
    let Some((group, first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first
        .iter()
        .filter(|(_, v)| as_records(v).is_none())
        .map(|(k, _)| k.as_str())
        .collect();
    let mut header_row: Vec<&str> = Vec::with_capacity(headers.len() + 1);
    if group.is_some() {
        header_row.push("group");
    }
    header_row.extend(&headers);
    let _ = wtr.write_record(&header_row);

    for (group, map) in rows {
        let mut row: Vec<String> = Vec::with_capacity(header_row.len());
        if let Some(g) = group {
            row.push(g.clone());
        }
        row.extend(
            headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default()),
        );
        let _ = wtr.write_record(&row);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_csv_value).collect::<Vec<_>>().join(";"),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
