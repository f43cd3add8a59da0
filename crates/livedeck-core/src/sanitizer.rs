//! Payload sanitizer.
//!
//! The producing service serializes missing numeric values as bare `NaN`
//! (and occasionally `Infinity`), which is not valid JSON. Those tokens are
//! rewritten to `null` before decoding. String literals are left untouched.

use crate::error::{LivedeckError, Result};
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Non-JSON numeric sentinels, signed forms first so the sign is consumed too.
const SENTINELS: [&str; 4] = ["-Infinity", "-NaN", "Infinity", "NaN"];

/// Rewrites non-JSON numeric sentinels outside string literals to `null`.
///
/// Returns the input unchanged (borrowed) when nothing needed repair.
pub fn sanitize(raw: &str) -> Cow<'_, str> {
    if !SENTINELS.iter().any(|token| raw.contains(token)) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = raw;

    while let Some(ch) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            rest = &rest[1..];
            continue;
        }

        let preceded_by_word = out
            .chars()
            .next_back()
            .is_some_and(|prev| prev.is_ascii_alphanumeric() || prev == '_' || prev == '.');

        if !preceded_by_word
            && let Some(token) = SENTINELS.iter().find(|token| rest.starts_with(**token))
        {
            let after = &rest[token.len()..];
            let followed_by_word = after
                .chars()
                .next()
                .is_some_and(|next| next.is_ascii_alphanumeric() || next == '_');
            if !followed_by_word {
                out.push_str("null");
                rest = after;
                continue;
            }
        }

        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    Cow::Owned(out)
}

/// Sanitizes and decodes a payload into `T`.
///
/// Any failure is returned as a payload-class error so the caller can drop the
/// single event and keep reading.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = sanitize(raw);
    serde_json::from_str(&cleaned).map_err(|err| {
        LivedeckError::payload(format!("undecodable payload ({err}): {}", preview(raw)))
    })
}

fn preview(raw: &str) -> String {
    const LIMIT: usize = 120;
    if raw.chars().count() <= LIMIT {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(LIMIT).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn clean_payload_is_borrowed() {
        let raw = r#"{"current_users": 3}"#;
        assert!(matches!(sanitize(raw), Cow::Borrowed(_)));
    }

    #[test]
    fn bare_nan_becomes_null() {
        let value: Value = decode(r#"{"traffic_rate": NaN, "current_users": 4}"#).unwrap();
        assert_eq!(value, json!({"traffic_rate": null, "current_users": 4}));
    }

    #[test]
    fn infinities_become_null() {
        let value: Value = decode(r#"[Infinity, -Infinity, 1]"#).unwrap();
        assert_eq!(value, json!([null, null, 1]));
    }

    #[test]
    fn signed_nan_becomes_null() {
        let value: Value = decode(r#"{"traffic_rate": -NaN, "long_stay_ratio": NaN}"#).unwrap();
        assert_eq!(value, json!({"traffic_rate": null, "long_stay_ratio": null}));
    }

    #[test]
    fn nan_inside_string_is_preserved() {
        let value: Value = decode(r#"{"comment": "NaN is not a price", "x": NaN}"#).unwrap();
        assert_eq!(value["comment"], "NaN is not a price");
        assert_eq!(value["x"], Value::Null);
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let raw = r#"{"comment": "say \"NaN\" twice", "y": NaN}"#;
        let value: Value = decode(raw).unwrap();
        assert_eq!(value["comment"], "say \"NaN\" twice");
        assert!(value["y"].is_null());
    }

    #[test]
    fn multibyte_text_survives() {
        let value: Value = decode(r#"{"user_id": "游客_12345", "avg": NaN}"#).unwrap();
        assert_eq!(value["user_id"], "游客_12345");
        assert!(value["avg"].is_null());
    }

    #[test]
    fn other_malformation_is_payload_error() {
        let err = decode::<Value>(r#"{"current_users": }"#).unwrap_err();
        assert!(err.is_payload());
    }
}
