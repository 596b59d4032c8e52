//! Temp-directory backed implementation of [`UploadPersister`].

use super::UploadPersister;
use crate::config::{self, Config};
use crate::sanitize;
use crate::upload::Upload;
use crate::{Error, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub struct TempUploadPersister {
    temp_dir: PathBuf,
    prefix: String,
    rand_bytes: usize,
}

impl TempUploadPersister {
    /// Creates the configured directory if needed and pins it as an absolute path.
    pub fn new(config: &Config) -> Result<Self> {
        config::validate_prefix(&config.prefix)?;

        let display = config.temp_dir.display();
        std::fs::create_dir_all(&config.temp_dir).map_err(|e| {
            Error::Config(format!("Cannot create temp directory {}: {}", display, e))
        })?;
        let temp_dir = config.temp_dir.canonicalize().map_err(|e| {
            Error::Config(format!("Cannot resolve temp directory {}: {}", display, e))
        })?;

        Ok(Self {
            temp_dir,
            prefix: config.prefix.clone(),
            rand_bytes: config.rand_bytes,
        })
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Delete a file previously returned by [`UploadPersister::persist`].
    ///
    /// Only paths directly inside the temp directory are accepted. A file that
    /// is already gone counts as released.
    pub fn release(&self, path: &Path) -> Result<()> {
        if path.parent() != Some(self.temp_dir.as_path()) || path.file_name().is_none() {
            return Err(Error::OutsideTempDir(path.to_path_buf()));
        }

        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Released temp file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Release(e)),
        }
    }

    fn allocate(&self, suffix: &str) -> Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(&self.prefix)
            .suffix(suffix)
            .rand_bytes(self.rand_bytes)
            .tempfile_in(&self.temp_dir)
            .map_err(Error::Allocate)
    }
}

fn write_fully(file: &mut File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()
}

// Writes the content and hands the file over, or removes it.
fn commit<F>(mut temp: NamedTempFile, content: &[u8], write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut File, &[u8]) -> std::io::Result<()>,
{
    if let Err(e) = write(temp.as_file_mut(), content) {
        discard(temp);
        return Err(Error::Write(e));
    }

    let (_, path) = temp.keep().map_err(|e| Error::Write(e.error))?;
    Ok(path)
}

// Best effort; the caller's error matters more than a failed unlink.
fn discard(temp: NamedTempFile) {
    let path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        warn!("Failed to remove temp file {}: {}", path.display(), e);
    }
}

#[async_trait]
impl UploadPersister for TempUploadPersister {
    async fn persist(&self, upload: &mut dyn Upload) -> Result<PathBuf> {
        let suffix = sanitize::suffix_for(upload.filename());

        // Dropping the guard deletes the file, which also covers a cancelled read.
        let temp = self.allocate(&suffix)?;
        debug!("Allocated temp file {}", temp.path().display());

        let content = match upload.read_all().await {
            Ok(content) => content,
            Err(e) => {
                discard(temp);
                return Err(Error::Read(e));
            }
        };

        let path = commit(temp, &content, write_fully)?;
        info!("Persisted {} bytes to {}", content.len(), path.display());

        Ok(path)
    }
}
