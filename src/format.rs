use crate::interpreter::Scope;
use crate::Value;
use serde_json::{Map, Number};

/// Largest magnitude an `f64` can hold while every integer below it is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => serde_json::Value::String(s.to_string()),
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // `as` maps -0.0 to 0
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

pub fn globals_to_json(globals: &Scope) -> serde_json::Value {
    let object: Map<String, serde_json::Value> = globals
        .iter()
        .map(|(name, value)| (name.clone(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(object)
}

/// Renders the global scope as a JSON object, keys in definition order.
pub fn globals_to_json_string(globals: &Scope, compact: bool) -> String {
    let json = globals_to_json(globals);
    let rendered = if compact {
        serde_json::to_string(&json)
    } else {
        serde_json::to_string_pretty(&json)
    };
    rendered.unwrap_or_else(|_| "{}".to_string())
}
