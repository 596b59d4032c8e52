//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Temp file allocation error: {0}")]
    Allocate(#[source] std::io::Error),

    #[error("Upload read error: {0}")]
    Read(#[source] std::io::Error),

    #[error("Temp file write error: {0}")]
    Write(#[source] std::io::Error),

    #[error("Temp file release error: {0}")]
    Release(#[source] std::io::Error),

    #[error("Path is not inside the temp directory: {}", .0.display())]
    OutsideTempDir(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

impl Error {
    /// True for failures raised while persisting an upload.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Allocate(_) | Error::Read(_) | Error::Write(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
