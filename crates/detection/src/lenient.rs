//! Field deserializers that never fail on a malformed value.
//!
//! A single bad field in a detection response degrades to "absent" instead of
//! rejecting the whole document.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Value<T> {
    Present(T),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Sequence<T> {
    List(Vec<Value<T>>),
    Other(IgnoredAny),
}

/// Finite number, numeric string, or `None`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Number::deserialize(deserializer)? {
        Number::Float(v) => Some(v),
        Number::Text(s) => s.trim().parse::<f64>().ok(),
        Number::Other(_) => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

pub(crate) fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?.unwrap_or(0.0))
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Text::deserialize(deserializer)? {
        Text::Text(s) => Some(s),
        Text::Other(_) => None,
    })
}

pub(crate) fn label_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string(deserializer)?.unwrap_or_else(crate::types::unnamed_label))
}

pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Value::<T>::deserialize(deserializer)? {
        Value::Present(v) => Some(v),
        Value::Other(_) => None,
    })
}

/// A list, with `null` or any non-list value read as empty. Elements that do
/// not decode as `T` are skipped individually.
pub(crate) fn sequence<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Sequence::<T>::deserialize(deserializer)? {
        Sequence::List(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Present(v) => Some(v),
                Value::Other(_) => None,
            })
            .collect(),
        Sequence::Other(_) => Vec::new(),
    })
}
