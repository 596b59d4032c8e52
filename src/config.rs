//! Runtime configuration for the temp-file persister.
//!
//! Built once at startup and treated as read-only afterwards.

use crate::{Error, Result};
use std::path::PathBuf;

pub const DEFAULT_PREFIX: &str = "tmp";
pub const DEFAULT_RAND_BYTES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory that receives persisted uploads.
    pub temp_dir: PathBuf,
    pub prefix: String,
    /// Number of random characters in each generated file name.
    pub rand_bytes: usize,
}

impl Config {
    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            rand_bytes: DEFAULT_RAND_BYTES,
        }
    }

    pub fn from_env() -> Result<Self> {
        load_env_file(dotenvy::dotenv())?;

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let temp_dir = lookup("UPLOAD_TEMP_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let prefix = lookup("UPLOAD_TEMP_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        validate_prefix(&prefix)?;

        let rand_bytes = match lookup("UPLOAD_TEMP_RAND_BYTES") {
            Some(raw) => parse_rand_bytes(&raw)?,
            None => DEFAULT_RAND_BYTES,
        };

        Ok(Self {
            temp_dir,
            prefix,
            rand_bytes,
        })
    }
}

/// A missing `.env` is fine, a malformed one is not.
fn load_env_file<T>(result: dotenvy::Result<T>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Rejects prefixes that could move generated files out of the temp directory.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.contains(['/', '\\'])
        || prefix.contains("..")
        || prefix.chars().any(char::is_control)
    {
        return Err(Error::Config(format!(
            "UPLOAD_TEMP_PREFIX must be a plain name, got '{}'",
            prefix.escape_debug()
        )));
    }
    Ok(())
}

fn parse_rand_bytes(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::Config(format!(
            "UPLOAD_TEMP_RAND_BYTES must be a positive integer, got '{}'",
            raw
        ))),
    }
}
