use std::io;

use thiserror::Error;

/// Errors raised while building or validating core values.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
