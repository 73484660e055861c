//! Runtime values produced by recursive value construction.

use std::fmt;

use indexmap::IndexMap;

use super::ObjectHandle;

/// A fully constructed injection value: a descriptor's value description
/// after placeholder resolution, boolean coercion and `ref:` expansion.
#[derive(Clone)]
pub enum PropertyValue {
    Str(String),
    Bool(bool),
    List(Vec<PropertyValue>),
    Map(IndexMap<String, PropertyValue>),
    Object(ObjectHandle),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            PropertyValue::Object(handle) => Some(handle),
            _ => None,
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            PropertyValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            PropertyValue::List(items) => f.debug_tuple("List").field(items).finish(),
            PropertyValue::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            PropertyValue::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyValue::Str(a), PropertyValue::Str(b)) => a == b,
            (PropertyValue::Bool(a), PropertyValue::Bool(b)) => a == b,
            (PropertyValue::List(a), PropertyValue::List(b)) => a == b,
            (PropertyValue::Map(a), PropertyValue::Map(b)) => a == b,
            // Object identity, not structural equality.
            (PropertyValue::Object(a), PropertyValue::Object(b)) => std::rc::Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}
