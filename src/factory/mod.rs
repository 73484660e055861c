//! Declarative object construction and wiring.
//!
//! The factory reads object descriptors out of one configuration section and
//! builds instances on demand, recursively resolving `ref:` values through
//! itself and placeholder values through the owning store. Construction is
//! capability-based: class names bind through a [`ClassRegistry`], and
//! property injection goes through the [`Injectable`] trait so that an
//! unknown property is a checked no-op rather than a runtime probe.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

mod default;
mod descriptor;
mod error;
mod property;
mod registry;

pub use default::{build_factory, DefaultFactory};
pub use descriptor::Descriptor;
pub use error::FactoryError;
pub use property::PropertyValue;
pub use registry::{ClassRegistry, ClassSpec, FactoryCtor, Param};

use crate::config::{ConfigStore, ValueMap};

/// A shared handle to a constructed object.
pub type ObjectHandle = Rc<RefCell<dyn Injectable>>;

/// Wraps a value into an [`ObjectHandle`], the shape construction closures
/// return.
pub fn handle<T: Injectable>(value: T) -> ObjectHandle {
    Rc::new(RefCell::new(value))
}

/// Implemented by every constructible type.
///
/// The default method bodies make both injection points opt-in: a property
/// with no matching binding is silently skipped, and only types that care
/// about the owning store observe [`set_configuration`](Self::set_configuration).
pub trait Injectable: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Binds one named property. Unknown names are ignored.
    fn set_property(&mut self, name: &str, value: &PropertyValue) {
        let _ = (name, value);
    }

    /// Supplies the owning configuration store after construction.
    fn set_configuration(&mut self, store: &Rc<ConfigStore>) {
        let _ = store;
    }
}

impl dyn Injectable {
    pub fn downcast_ref<T: Injectable>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Injectable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// The object factory contract: construction by descriptor id, by class name
/// with an ad-hoc descriptor override probe, and direct instantiation.
///
/// Factories are themselves [`Injectable`] so the reserved `objectFactory`
/// configuration section can set properties on them.
pub trait ObjectFactory: Injectable {
    /// Builds (or returns the cached singleton for) the descriptor `id`.
    fn create(&mut self, id: &str) -> Result<ObjectHandle, FactoryError>;

    /// Builds an instance for a bare class name. A descriptor whose id equals
    /// the class name transparently overrides the supplied arguments.
    fn create_by_class(
        &mut self,
        class: &str,
        args: &ValueMap,
        singleton: bool,
    ) -> Result<ObjectHandle, FactoryError>;

    /// Direct construction with constructor-argument binding and no
    /// descriptor, property injection or caching.
    fn new_instance(&mut self, class: &str, args: &ValueMap) -> Result<ObjectHandle, FactoryError>;
}
