//! Lenient (de)serialization helpers.
//!
//! The remote service stores several columns loosely: dates may be empty
//! strings, numeric columns may hold the raw form input, flags may be
//! integers. These helpers normalise such values instead of failing the
//! whole collection.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date from `YYYY-MM-DD`, ignoring any time suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// Parse an amount typed by the operator. Blank or non-numeric input is `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// `Option<NaiveDate>` stored as `YYYY-MM-DD`. Null, blank or unparsable text reads as `None`.
pub mod date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_date))
    }

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

/// Text column that may be null.
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numeric column that may arrive as a number, a numeric string, or junk.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Like [`number`], defaulting to zero.
pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    number(deserializer).map(|v| v.unwrap_or(0.0))
}

/// Whole-day counts; fractional or negative input is discarded.
pub fn days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32))
}

/// Flags stored as `0`/`1` integers or booleans.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}

/// String lists that may be null or missing.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Optional string lists, `None` when absent or not a list.
pub fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Enumerated column parsed through `FromStr`; unknown tags become `None`.
pub fn parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|s| s.trim().parse().ok()))
}

/// Normalise an optional free-text input: trimmed, blank becomes `None`.
pub fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, with = "date")]
        when: Option<NaiveDate>,
        #[serde(default, deserialize_with = "number")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "flag")]
        scanned: bool,
        #[serde(default, deserialize_with = "string_list")]
        items: Vec<String>,
    }

    #[test]
    fn blank_dates_are_absent() {
        let row: Row = serde_json::from_str(r#"{"when": ""}"#).unwrap();
        assert_eq!(row.when, None);
        let row: Row = serde_json::from_str(r#"{"when": null}"#).unwrap();
        assert_eq!(row.when, None);
    }

    #[test]
    fn dates_ignore_time_suffix() {
        let row: Row = serde_json::from_str(r#"{"when": "2024-05-03 10:12:00"}"#).unwrap();
        assert_eq!(row.when, NaiveDate::from_ymd_opt(2024, 5, 3));
    }

    #[test]
    fn numbers_accept_numeric_strings_and_drop_junk() {
        let row: Row = serde_json::from_str(r#"{"amount": "1.5"}"#).unwrap();
        assert_eq!(row.amount, Some(1.5));
        let row: Row = serde_json::from_str(r#"{"amount": "abc"}"#).unwrap();
        assert_eq!(row.amount, None);
        let row: Row = serde_json::from_str(r#"{"amount": ""}"#).unwrap();
        assert_eq!(row.amount, None);
    }

    #[test]
    fn flags_accept_integers() {
        let row: Row = serde_json::from_str(r#"{"scanned": 1}"#).unwrap();
        assert!(row.scanned);
        let row: Row = serde_json::from_str(r#"{"scanned": 0}"#).unwrap();
        assert!(!row.scanned);
    }

    #[test]
    fn null_lists_are_empty() {
        let row: Row = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(row.items.is_empty());
    }

    #[test]
    fn amounts_accept_decimal_comma() {
        assert_eq!(parse_amount("12,50"), Some(12.5));
        assert_eq!(parse_amount("   "), None);
    }
}
