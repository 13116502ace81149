use lotcalc_core::rounding::{format_money, format_pct};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Print just the key answers.
///
/// ROI prints the total return, deposits one line per scenario, installment
/// plans one line per tier. Anything else falls back to the first field.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(value) {
        println!("{}", line);
    }
}

fn minimal_lines(value: &Value) -> Vec<String> {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result_obj else {
        return vec![format_minimal(result_obj)];
    };

    if let Some(roi) = map.get("roi_pct") {
        return vec![pct(roi)];
    }

    if let Some(Value::Array(scenarios)) = map.get("scenarios") {
        return scenarios
            .iter()
            .filter_map(Value::as_object)
            .map(|s| {
                format!(
                    "{}: {} ({})",
                    text(s, "key"),
                    money(s.get("total_net_interest").unwrap_or(&Value::Null)),
                    pct(s.get("total_roi_pct").unwrap_or(&Value::Null))
                )
            })
            .collect();
    }

    if map.contains_key("short") && map.contains_key("long") {
        let mut lines = Vec::new();
        for horizon in ["short", "long"] {
            let Some(Value::Object(h)) = map.get(horizon) else {
                continue;
            };
            let months = format_minimal(h.get("months").unwrap_or(&Value::Null));
            if let Some(Value::Array(tiers)) = h.get("tiers") {
                for t in tiers.iter().filter_map(Value::as_object) {
                    lines.push(format!(
                        "{}m {}%: down {}, total {}",
                        months,
                        format_minimal(t.get("tier").unwrap_or(&Value::Null)),
                        money(t.get("down_payment").unwrap_or(&Value::Null)),
                        money(t.get("financed_total").unwrap_or(&Value::Null)),
                    ));
                }
            }
        }
        return lines;
    }

    // Lot reports bundle several envelopes; summarise each in turn.
    let nested: Vec<String> = ["roi", "installment", "deposit"]
        .iter()
        .filter_map(|k| map.get(*k))
        .flat_map(minimal_lines)
        .collect();
    if !nested.is_empty() {
        return nested;
    }

    match map.iter().next() {
        Some((key, val)) => vec![format!("{}: {}", key, format_minimal(val))],
        None => Vec::new(),
    }
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn money(value: &Value) -> String {
    decimal(value).map(format_money).unwrap_or_else(|| format_minimal(value))
}

fn pct(value: &Value) -> String {
    decimal(value).map(format_pct).unwrap_or_else(|| format_minimal(value))
}

fn text(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).map(format_minimal).unwrap_or_default()
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
