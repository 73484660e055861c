//! The configuration value tree.

use indexmap::IndexMap;

/// An ordered mapping from key to [`Value`].
pub type ValueMap = IndexMap<String, Value>;

/// One node in the configuration tree.
///
/// Scalars are strings or booleans; composites are ordered lists and ordered
/// maps. Object references are carried as ordinary strings with a `"ref:"`
/// prefix and only gain meaning inside the object factory.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// Returns the string slice if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a map.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// True for string and boolean scalars, false for composites.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::String(_) | Value::Bool(_))
    }

    /// Converts a parsed TOML value into the store's value shape.
    ///
    /// Strings and booleans map directly; integers, floats and datetimes are
    /// coerced to their string representation since the store only carries
    /// string and boolean scalars.
    pub fn from_toml(value: toml::Value) -> Value {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Integer(i) => Value::String(i.to_string()),
            toml::Value::Float(f) => Value::String(f.to_string()),
            toml::Value::Datetime(d) => Value::String(d.to_string()),
            toml::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_toml).collect())
            }
            toml::Value::Table(table) => Value::Map(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Value::from_toml(value)))
                    .collect(),
            ),
        }
    }

    /// Converts back into a TOML value, used when writing cache artifacts and
    /// when deserializing a section into a typed struct.
    pub fn to_toml(&self) -> toml::Value {
        match self {
            Value::String(s) => toml::Value::String(s.clone()),
            Value::Bool(b) => toml::Value::Boolean(*b),
            Value::List(items) => toml::Value::Array(items.iter().map(Value::to_toml).collect()),
            Value::Map(entries) => toml::Value::Table(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_toml()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}
