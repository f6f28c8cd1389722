use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while locating or parsing a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("invalid config file {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("unsupported config file format: {0}")]
    UnsupportedFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
