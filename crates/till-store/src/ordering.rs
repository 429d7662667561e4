//! Ordering of JSON field values.
//!
//! Follows the PostgreSQL `jsonb` sort order so both backends return the same
//! sequence for the same query: null < string < number < boolean < array <
//! object. Arrays and objects with more entries sort after those with fewer;
//! equal-sized objects compare pair by pair in key storage order (shorter
//! keys first).

use std::cmp::Ordering;

use serde_json::{Map, Value};

use till_core::timestamp::parse_instant;

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compares two JSON values in `jsonb` order.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y)
                .map(|(x, y)| compare_values(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()).then_with(|| {
            storage_order(x)
                .into_iter()
                .zip(storage_order(y))
                .map(|((xk, xv), (yk, yv))| {
                    compare_keys(xk, yk).then_with(|| compare_values(xv, yv))
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn storage_order(object: &Map<String, Value>) -> Vec<(&str, &Value)> {
    let mut pairs: Vec<(&str, &Value)> = object.iter().map(|(k, v)| (k.as_str(), v)).collect();
    pairs.sort_by(|(a, _), (b, _)| compare_keys(a, b));
    pairs
}

/// Compares two field values by the instants they denote, earliest first.
/// Values that are not instants sort after every instant and tie with each
/// other.
#[must_use]
pub fn compare_instants(a: &Value, b: &Value) -> Ordering {
    match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
