//! Persisting uploads to temporary files
//!
//! Turns an [`Upload`] into a fully written file inside a dedicated temp
//! directory so downstream handlers can open it by path. The returned file
//! belongs to the caller, who is responsible for deleting it.

pub mod temp;

pub use temp::TempUploadPersister;

use crate::upload::Upload;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait UploadPersister: Send + Sync {
    /// Write the upload's content to a new temp file and return its absolute path.
    ///
    /// On failure no file created by this call remains on disk.
    async fn persist(&self, upload: &mut dyn Upload) -> Result<PathBuf>;
}
