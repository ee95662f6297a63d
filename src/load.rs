//! Loading records from the corpus' flat JSON objects.
//!
//! Each object maps field names to values. Known attribute keys are read when they hold a JSON
//! number; any other value (string, null, bool) leaves the attribute missing. `categories` may be
//! an array of strings, a single string, or the sentinel `"nan"`, which means "no categories".
//! Unknown keys are ignored.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::record::{Attribute, Record};

/// Sentinel the corpus uses for "no categories".
pub const NO_CATEGORIES: &str = "nan";

impl Record {
    /// Build a record from one JSON object.
    pub fn from_json(value: &Value) -> Result<Record> {
        let obj = value.as_object().ok_or_else(|| {
            Error::InvalidRecord(format!("expected an object, found {}", kind(value)))
        })?;

        let mut record = Record::new(string_field(obj, "title"), string_field(obj, "abstract"))
            .with_categories(categories(obj.get("categories")));

        for attr in Attribute::ALL {
            if let Some(v) = obj.get(attr.name()).and_then(Value::as_f64) {
                record = record.with_value(attr, v);
            }
        }
        Ok(record)
    }
}

/// Parse a JSON array of record objects.
pub fn records_from_json(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text)?;
    records_from_value(&value)
}

/// Interpret an already-parsed JSON array of record objects.
pub fn records_from_value(value: &Value) -> Result<Vec<Record>> {
    let items = value.as_array().ok_or_else(|| {
        Error::InvalidRecord(format!("expected an array of records, found {}", kind(value)))
    })?;
    let records = items.iter().map(Record::from_json).collect::<Result<Vec<_>>>()?;
    tracing::debug!(n_records = records.len(), "loaded records");
    Ok(records)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn categories(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| *s != NO_CATEGORIES)
            .map(str::to_owned)
            .collect(),
        Some(Value::String(s)) if s != NO_CATEGORIES && !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
