//! Capability-based construction registry.
//!
//! The runtime has no reflection, so "class" names from configuration are
//! bound through an explicit table: each registered class carries its ordered
//! constructor parameters and a construction closure. Alternate object
//! factory implementations are registered the same way under their own table.

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::ConfigStore;

use super::error::FactoryError;
use super::property::PropertyValue;
use super::{ObjectFactory, ObjectHandle};

type ConstructFn = Box<dyn Fn(Vec<PropertyValue>) -> Result<ObjectHandle, FactoryError>>;

/// Constructor for an alternate object-factory implementation, keyed by the
/// `class` entry of the `objectFactory` section.
pub type FactoryCtor = Box<dyn Fn(Rc<ConfigStore>, Rc<ClassRegistry>) -> Box<dyn ObjectFactory>>;

/// One declared constructor parameter.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    default: Option<PropertyValue>,
}

impl Param {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> Option<&PropertyValue> {
        self.default.as_ref()
    }
}

/// The construction recipe for one class: ordered parameters plus a closure
/// that turns bound parameter values into an instance.
pub struct ClassSpec {
    params: Vec<Param>,
    construct: ConstructFn,
}

impl ClassSpec {
    /// A spec whose closure receives the bound parameter values in
    /// declaration order. A spec without declared parameters is always called
    /// with an empty vector.
    pub fn new(
        construct: impl Fn(Vec<PropertyValue>) -> Result<ObjectHandle, FactoryError> + 'static,
    ) -> Self {
        Self {
            params: Vec::new(),
            construct: Box::new(construct),
        }
    }

    /// Declares a required parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Declares a parameter with a default, used when neither a named nor a
    /// positional argument is supplied.
    #[must_use]
    pub fn param_default(mut self, name: impl Into<String>, default: PropertyValue) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: Some(default),
        });
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn construct(&self, args: Vec<PropertyValue>) -> Result<ObjectHandle, FactoryError> {
        (self.construct)(args)
    }
}

impl std::fmt::Debug for ClassSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassSpec")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Name-to-constructor tables for objects and factories.
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassSpec>,
    factories: HashMap<String, FactoryCtor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructible class under `name`.
    pub fn register(&mut self, name: impl Into<String>, spec: ClassSpec) {
        self.classes.insert(name.into(), spec);
    }

    /// Registers an alternate object-factory implementation under `name`.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(Rc<ConfigStore>, Rc<ClassRegistry>) -> Box<dyn ObjectFactory> + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(ctor));
    }

    pub fn class(&self, name: &str) -> Option<&ClassSpec> {
        self.classes.get(name)
    }

    pub fn factory(&self, name: &str) -> Option<&FactoryCtor> {
        self.factories.get(name)
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
