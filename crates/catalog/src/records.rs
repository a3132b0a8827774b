use anyhow::{bail, Result};
use rihla_core::RawPlace;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub places: Vec<RawPlace>,
    pub skipped: usize,
}

/// Accepts a JSON array of places or an object with a `places` array.
/// Entries that do not deserialize are counted and dropped.
pub fn parse_records(raw: &str) -> Result<ParsedRecords> {
    let document: Value = serde_json::from_str(raw)?;
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("places") {
            Some(Value::Array(entries)) => entries,
            _ => bail!("expected a `places` array"),
        },
        _ => bail!("expected an array of places"),
    };

    let mut parsed = ParsedRecords::default();
    for entry in entries {
        match serde_json::from_value::<RawPlace>(entry) {
            Ok(place) => parsed.places.push(place),
            Err(_) => parsed.skipped += 1,
        }
    }

    Ok(parsed)
}
