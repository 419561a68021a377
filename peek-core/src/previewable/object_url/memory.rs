use std::{collections::HashMap, sync::{Arc, Mutex, MutexGuard, PoisonError}};

use async_trait::async_trait;
use uuid::Uuid;

use crate::previewable::object_url::{ObjectUrlError, ObjectUrls};

/// A registered payload and the media type it was tagged with.
#[derive(Clone, Debug)]
pub struct Blob {
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

/// Keeps payloads in memory under `blob:peek/<uuid>` URLs.
#[derive(Debug, Default)]
pub struct MemoryObjectUrls {
    blobs: Mutex<HashMap<String, Blob>>,
}

impl MemoryObjectUrls {
    pub fn new() -> Self {
        MemoryObjectUrls::default()
    }

    /// Looks up the payload behind a live URL, as an embedded viewer would.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.blobs().get(url).cloned()
    }

    fn blobs(&self) -> MutexGuard<'_, HashMap<String, Blob>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ObjectUrls for MemoryObjectUrls {
    async fn create(&self, bytes: Vec<u8>, media_type: &str) -> Result<String, ObjectUrlError> {
        let url = format!("blob:peek/{}", Uuid::new_v4());
        self.blobs().insert(url.clone(), Blob {
            media_type: media_type.to_string(),
            bytes: bytes.into(),
        });
        Ok(url)
    }

    fn revoke(&self, url: &str) -> Result<(), ObjectUrlError> {
        self.blobs().remove(url)
            .map(|_| ())
            .ok_or_else(|| ObjectUrlError::Unknown { url: url.to_string() })
    }

    fn live_count(&self) -> usize {
        self.blobs().len()
    }
}
