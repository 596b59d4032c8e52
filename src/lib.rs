//! Persists uploaded files to temporary paths on disk
//!
//! An upload's bytes are written to a uniquely named file inside a configured
//! temp directory, and the path is handed to the caller. Files are never left
//! behind when persisting fails.

pub mod config;
pub mod error;
pub mod persist;
pub mod sanitize;
pub mod upload;

pub use error::{Error, Result};
