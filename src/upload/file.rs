use super::Upload;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Upload backed by a file on the local filesystem.
pub struct FileUpload {
    path: PathBuf,
    filename: Option<String>,
}

impl FileUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Self { path, filename }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Upload for FileUpload {
    fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    async fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}
