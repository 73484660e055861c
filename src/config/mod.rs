//! Configuration loading, merging and resolution.

mod cache;
mod error;
mod loader;
mod markup;
mod native;
mod resolve;
mod store;
mod value;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use store::{ConfigStore, GLOBAL_SECTION, OBJECT_FACTORY_SECTION};
pub use value::{Value, ValueMap};
