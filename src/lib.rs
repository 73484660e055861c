//! Layered configuration resolution and declarative object wiring.
//!
//! A [`ConfigLoader`] turns an entry file — structured markup with import
//! directives, or a native TOML source — into a [`ConfigStore`]: an ordered,
//! section-keyed value tree with placeholder expansion and a compiled-cache
//! layer validated against source modification times. A [`ClassRegistry`]
//! plus the store's reserved sections then drive an [`ObjectFactory`] that
//! builds and wires objects described entirely in configuration.
//!
//! ## Example
//!
//! ```no_run
//! use std::any::Any;
//! use std::rc::Rc;
//!
//! use conwire::{
//!     build_factory, handle, ClassRegistry, ClassSpec, ConfigLoader, Injectable, PropertyValue,
//! };
//!
//! #[derive(Default)]
//! struct Service {
//!     host: String,
//! }
//!
//! impl Injectable for Service {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//!
//!     fn set_property(&mut self, name: &str, value: &PropertyValue) {
//!         if name == "host" {
//!             if let Some(host) = value.as_str() {
//!                 self.host = host.to_string();
//!             }
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), conwire::Error> {
//!     let mut loader = ConfigLoader::new().with_base_dir("/srv/app");
//!     let store = loader.load("conf/app.xml")?;
//!
//!     let mut registry = ClassRegistry::new();
//!     registry.register("Service", ClassSpec::new(|_| Ok(handle(Service::default()))));
//!     let registry = Rc::new(registry);
//!
//!     let mut factory = build_factory(&store, &registry)?;
//!     let service = factory.create("service")?;
//!     let service = service.borrow();
//!     let service: &Service = service.downcast_ref().expect("registered as Service");
//!     println!("{}", service.host);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod factory;
mod error;

pub use config::{ConfigError, ConfigLoader, ConfigStore, Value, ValueMap};
pub use error::Error;
pub use factory::{
    build_factory, handle, ClassRegistry, ClassSpec, Descriptor, FactoryError, Injectable,
    ObjectFactory, ObjectHandle, PropertyValue,
};
