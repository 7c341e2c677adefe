use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MilelogError {
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Logbook {0} contains errors")]
    Logbook(String),

    #[error("Invalid value '{value}' for --{name}: expected {expected}")]
    Argument {
        name: &'static str,
        value: String,
        expected: String,
    },

    #[error("Invalid period '{0}'")]
    Period(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MilelogError>;
