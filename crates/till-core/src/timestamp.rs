//! Wire forms of instants stored in documents.
//!
//! An instant is stored either as an RFC 3339 string (any offset) or as a
//! native timestamp object with integral `seconds` and optional
//! `nanoseconds` since the Unix epoch. Underscore-prefixed field names
//! (`_seconds`, `_nanoseconds`) are accepted too.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Reads an instant from its wire form. Anything else, including bare
/// numbers and date-only strings, yields `None`.
#[must_use]
pub fn parse_instant(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Object(fields) => {
            let seconds = field(fields, "seconds")?.as_i64()?;
            let nanos = match field(fields, "nanoseconds") {
                Some(n) => u32::try_from(n.as_u64()?).ok()?,
                None => 0,
            };
            if nanos >= 1_000_000_000 {
                return None;
            }
            DateTime::from_timestamp(seconds, nanos)
        }
        _ => None,
    }
}

fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields
        .get(name)
        .or_else(|| fields.get(&format!("_{name}")))
}
