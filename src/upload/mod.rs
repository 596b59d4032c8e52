//! Upload sources
//!
//! An upload is anything that exposes a client-supplied filename and can hand
//! over its full byte content asynchronously.

pub mod file;
pub mod mock;

pub use file::FileUpload;
pub use mock::MockUpload;

use async_trait::async_trait;

#[async_trait]
pub trait Upload: Send {
    /// Untrusted filename as sent by the client, if any.
    fn filename(&self) -> Option<&str>;

    async fn read_all(&mut self) -> std::io::Result<Vec<u8>>;
}
