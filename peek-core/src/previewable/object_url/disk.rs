use std::{collections::HashSet, fs, sync::{Mutex, MutexGuard, PoisonError}};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use uuid::Uuid;

use crate::{app_config::{self, AppConfigError}, previewable::object_url::{extension_for, ObjectUrlError, ObjectUrls}};

/// Writes payloads into a directory and hands out `file://` URLs, so external viewers can open
/// them. Revoking a URL deletes its file.
#[derive(Debug)]
pub struct DiskObjectUrls {
    directory: Utf8PathBuf,
    live: Mutex<HashSet<Utf8PathBuf>>,
}

impl DiskObjectUrls {
    pub fn new(directory: impl Into<Utf8PathBuf>) -> Self {
        DiskObjectUrls { directory: directory.into(), live: Mutex::new(HashSet::new()) }
    }

    /// Uses the blob directory configured in `peek.toml`.
    pub fn from_config() -> Result<Self, AppConfigError> {
        Ok(DiskObjectUrls::new(app_config::get_default_blob_directory()?))
    }

    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Maps a URL handed out by this registry back to its file.
    pub fn path_of(url: &str) -> Option<&Utf8Path> {
        url.strip_prefix("file://").map(Utf8Path::new)
    }

    fn live(&self) -> MutexGuard<'_, HashSet<Utf8PathBuf>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ObjectUrls for DiskObjectUrls {
    async fn create(&self, bytes: Vec<u8>, media_type: &str) -> Result<String, ObjectUrlError> {
        let path = self.directory.join(format!("{}.{}", Uuid::new_v4(), extension_for(media_type)));
        tokio::fs::write(&path, &bytes).await
            .map_err(|e| ObjectUrlError::IO { path: path.clone(), source: e })?;

        debug!("Wrote {} bytes of {} to {}", bytes.len(), media_type, path);
        let url = format!("file://{}", path);
        self.live().insert(path);
        Ok(url)
    }

    fn revoke(&self, url: &str) -> Result<(), ObjectUrlError> {
        let unknown = || ObjectUrlError::Unknown { url: url.to_string() };
        let path = DiskObjectUrls::path_of(url).ok_or_else(unknown)?;
        // only files this registry wrote are ever removed
        if !self.live().remove(path) {
            return Err(unknown());
        }

        fs::remove_file(path).map_err(|e| ObjectUrlError::IO { path: path.to_path_buf(), source: e })
    }

    fn live_count(&self) -> usize {
        self.live().len()
    }
}
