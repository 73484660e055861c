use crate::config::ConfigError;
use crate::factory::FactoryError;
use thiserror::Error;

/// Top-level error type for the conwire library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("object factory error: {0}")]
    Factory(#[from] FactoryError),
}
