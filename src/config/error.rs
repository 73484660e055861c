use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("configuration source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("unsupported configuration source: {0}")]
    UnsupportedSourceType(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse markup file '{path}': {source}")]
    MarkupError {
        path: PathBuf,
        source: roxmltree::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to deserialize section '{section}': {source}")]
    DeserializeError {
        section: String,
        source: toml::de::Error,
    },

    #[error("failed to write cache file '{path}': {source}")]
    CacheWriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode cache file '{path}': {source}")]
    CacheEncodeError {
        path: PathBuf,
        source: toml::ser::Error,
    },
}
