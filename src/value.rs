use std::fmt;
use std::rc::Rc;

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A property value as handed over by the host.
///
/// Hosts store metadata in all sorts of shapes: plain scalars, rich value
/// objects that only know how to print themselves, or structured wrappers
/// carrying the real payload in a nested `Data` field. Every shape gets its
/// own variant so normalization can branch on it explicitly.
#[derive(Debug, Clone)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Host value object exposing a string conversion.
    Wrapped(Rc<dyn ValueObject>),
    /// Plain structured object; field order is preserved.
    Object(Vec<(String, RawValue)>),
    Array(Vec<RawValue>),
}

/// A host value that is not plain data but can render itself as text.
pub trait ValueObject: fmt::Debug {
    fn to_text(&self) -> String;

    /// Structural form used when the value is nested inside an object or
    /// array that has to be serialized.
    fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        Ok(serde_json::Value::String(self.to_text()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("value cannot be serialized: {0}")]
pub struct ValueError(pub String);

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Find a field of an object by name, ignoring ASCII case. First match wins.
    pub fn field_ignore_case(&self, name: &str) -> Option<&RawValue> {
        match self {
            Self::Object(fields) => fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Format a number the way a JavaScript host prints it: integral values have
/// no fractional part, non-finite values use their keyword.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let word = if n > 0.0 { "Infinity" } else { "-Infinity" };
        word.to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        // -0 prints as 0
        format!("{}", n as i128)
    } else {
        format!("{n}")
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) if n.is_finite() => {
                // same integer form as `format_number`
                if *n == n.trunc() && n.abs() < 9.0e18 {
                    serializer.serialize_i64(*n as i64)
                } else if *n == n.trunc() && n.abs() < 1e21 {
                    serializer.serialize_i128(*n as i128)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            // Non-finite numbers have no JSON form.
            Self::Number(_) => serializer.serialize_unit(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Wrapped(obj) => obj
                .to_json()
                .map_err(S::Error::custom)?
                .serialize(serializer),
            Self::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// TOML datetimes are value objects: they print themselves but carry no
/// nested payload.
#[derive(Debug)]
pub struct TomlDatetime(pub toml::value::Datetime);

impl ValueObject for TomlDatetime {
    fn to_text(&self) -> String {
        self.0.to_string()
    }
}

impl From<toml::Value> for RawValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::Text(s),
            toml::Value::Integer(i) => Self::Number(i as f64),
            toml::Value::Float(f) => Self::Number(f),
            toml::Value::Boolean(b) => Self::Bool(b),
            toml::Value::Datetime(dt) => Self::Wrapped(Rc::new(TomlDatetime(dt))),
            toml::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            toml::Value::Table(table) => {
                Self::Object(table.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
