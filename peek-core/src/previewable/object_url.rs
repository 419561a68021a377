use std::io;

use async_trait::async_trait;
use camino::Utf8PathBuf;

/// Errors that can occur while creating or revoking object URLs.
#[derive(thiserror::Error, Debug)]
pub enum ObjectUrlError {
    /// The backing storage for an object URL could not be written or removed.
    #[error("Error interacting with object URL storage at {path}")]
    IO { path: Utf8PathBuf, #[source] source: io::Error },

    /// The URL was not created by this registry, or was already revoked.
    #[error("Unknown object URL: {url}")]
    Unknown { url: String },
}

/// Owns revocable URLs that reference in-process binary payloads.
///
/// Every URL handed out by [`ObjectUrls::create`] stays live until passed to
/// [`ObjectUrls::revoke`].
#[async_trait]
pub trait ObjectUrls: Send + Sync {
    /// Registers `bytes` tagged with `media_type` and returns a URL referencing them.
    async fn create(&self, bytes: Vec<u8>, media_type: &str) -> Result<String, ObjectUrlError>;

    /// Releases the payload behind `url`.
    fn revoke(&self, url: &str) -> Result<(), ObjectUrlError>;

    /// Number of URLs created and not yet revoked.
    fn live_count(&self) -> usize;
}

/// File extension used for a payload of the given media type.
pub(crate) fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        _ => "bin",
    }
}

pub use disk::DiskObjectUrls;
pub use memory::MemoryObjectUrls;

mod disk;
mod memory;
