//! Object descriptor extraction.

use std::collections::HashMap;

use crate::config::{Value, ValueMap};

const KEY_ID: &str = "id";
const KEY_CLASS: &str = "class";
const KEY_SINGLETON: &str = "singleton";
const KEY_CONSTRUCTOR_ARGS: &str = "constructor-args";

/// The declarative recipe for one constructible object.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub id: String,
    pub class: String,
    pub singleton: bool,
    pub constructor_args: ValueMap,
    pub properties: ValueMap,
}

/// Scans a configuration section for object descriptors, indexed by id.
///
/// An entry qualifies only when it declares a class; the id defaults to the
/// class name. Every key that is not reserved becomes a property description.
pub(crate) fn load_descriptors(section: &ValueMap) -> HashMap<String, Descriptor> {
    let mut descriptors = HashMap::new();
    for entry in section.values() {
        let Some(entry) = entry.as_map() else {
            continue;
        };
        let Some(class) = entry.get(KEY_CLASS).and_then(Value::as_str) else {
            continue;
        };

        let id = entry
            .get(KEY_ID)
            .and_then(Value::as_str)
            .unwrap_or(class)
            .to_string();
        let singleton = match entry.get(KEY_SINGLETON) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !(s == "0" || s.eq_ignore_ascii_case("false")),
            _ => true,
        };
        // Constructor arguments may be a named mapping or a positional list;
        // a list becomes index-keyed entries.
        let constructor_args = match entry.get(KEY_CONSTRUCTOR_ARGS) {
            Some(Value::Map(args)) => args.clone(),
            Some(Value::List(args)) => args
                .iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value.clone()))
                .collect(),
            _ => ValueMap::new(),
        };
        let mut properties = ValueMap::new();
        for (key, value) in entry {
            if key != KEY_ID
                && key != KEY_CLASS
                && key != KEY_SINGLETON
                && key != KEY_CONSTRUCTOR_ARGS
            {
                properties.insert(key.clone(), value.clone());
            }
        }

        descriptors.insert(
            id.clone(),
            Descriptor {
                id,
                class: class.to_string(),
                singleton,
                constructor_args,
                properties,
            },
        );
    }
    descriptors
}
