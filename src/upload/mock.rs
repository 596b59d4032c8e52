use super::Upload;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct MockUpload {
    filename: Option<String>,
    content: Vec<u8>,
    delay: Option<Duration>,
    should_fail: Arc<Mutex<bool>>,
    read_count: Arc<Mutex<usize>>,
}

impl MockUpload {
    pub fn new() -> Self {
        Self {
            filename: Some("upload.bin".to_string()),
            content: Vec::new(),
            delay: None,
            should_fail: Arc::new(Mutex::new(false)),
            read_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.content = content;
        self
    }

    /// Sleep this long before yielding the content.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_read_count(&self) -> usize {
        *self.read_count.lock().unwrap()
    }
}

impl Default for MockUpload {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upload for MockUpload {
    fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    async fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        *self.read_count.lock().unwrap() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if *self.should_fail.lock().unwrap() {
            return Err(std::io::Error::other("Mock read failure"));
        }

        Ok(self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_upload_read() {
        let mut upload = MockUpload::new()
            .with_filename(Some("photo.png".to_string()))
            .with_content(b"png bytes".to_vec());

        assert_eq!(upload.filename(), Some("photo.png"));
        assert_eq!(upload.read_all().await.unwrap(), b"png bytes");
        assert_eq!(upload.get_read_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_upload_failure() {
        let mut upload = MockUpload::new().with_failure(true);

        let err = upload.read_all().await.unwrap_err();
        assert!(err.to_string().contains("Mock read failure"));
        assert_eq!(upload.get_read_count(), 1);
    }

    #[test]
    fn test_mock_upload_without_filename() {
        let upload = MockUpload::new().with_filename(None);
        assert_eq!(upload.filename(), None);
    }

    #[tokio::test]
    async fn test_mock_upload_delay() {
        let mut upload = MockUpload::new()
            .with_content(b"late".to_vec())
            .with_delay(Duration::from_millis(20));

        let started = std::time::Instant::now();
        let content = upload.read_all().await.unwrap();

        assert_eq!(content, b"late");
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
