use std::io;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};

/// Supplies the raw bytes of a selected file.
///
/// Each preview request calls [`ByteSource::read`] at most once.
#[async_trait]
pub trait ByteSource: Send + Sync {
    async fn read(&self) -> io::Result<Vec<u8>>;
}

#[async_trait]
impl ByteSource for Vec<u8> {
    async fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.clone())
    }
}

/// Reads the whole file at `path` when asked.
#[derive(Clone, Debug)]
pub struct PathSource {
    path: Utf8PathBuf,
}

impl PathSource {
    pub fn new(path: &Utf8Path) -> Self {
        PathSource { path: path.to_path_buf() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait]
impl ByteSource for PathSource {
    async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}
