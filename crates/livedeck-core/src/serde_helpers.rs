//! Lenient field decoders for producer payloads.
//!
//! The producer fills gaps with `null` (after sanitizing) and is loose about
//! scalar types, so these helpers fold such values into sensible defaults.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeSet;

/// Decodes `null` as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes any scalar as a display string; `null` and empty strings become `None`.
pub fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Like [`scalar_as_string`] but required: missing scalars become an empty string.
pub fn scalar_as_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_as_string(deserializer)?.unwrap_or_default())
}

/// Decodes a list of optional strings into a set, dropping nulls and blanks.
pub fn string_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .flatten()
        .filter(|item| !item.trim().is_empty())
        .collect())
}

/// Decodes an optional float, treating non-numbers as absent.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}
