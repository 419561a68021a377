use std::{fmt, io, sync::Arc};

use camino::Utf8Path;
use log::{debug, warn};

use crate::previewable::{object_url::ObjectUrls, source::{ByteSource, PathSource}};

/// Message shown for every decode failure, whatever the cause.
pub const UNREADABLE_MESSAGE: &str = "File content is not readable.";
/// Message shown when the upload action is triggered with nothing selected.
pub const NO_SELECTION_MESSAGE: &str = "Please select a file first.";

/// A loosely typed spreadsheet cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    String(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Empty => Ok(()),
        }
    }
}

/// The preview currently presented for the selected file. Exactly one variant is active.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PreviewState {
    /// No file chosen, or a decode is still pending
    #[default]
    Empty,
    /// An inline image, as a base64 data URL
    Image { data_url: String },
    /// A document shown through an embedded viewer. `blob_url` must be revoked once replaced.
    Embed { blob_url: String, media_type: String },
    /// The first sheet of a workbook, as a rectangular grid of rows
    Table { rows: Vec<Vec<CellValue>> },
    /// Plain text or XML
    Text { content: String },
    /// A user facing error message
    Error { message: String },
}

impl PreviewState {
    pub fn error(message: &str) -> Self {
        PreviewState::Error { message: message.to_string() }
    }

    pub fn unreadable() -> Self {
        PreviewState::error(UNREADABLE_MESSAGE)
    }

    /// The object URL held by this state, if it holds one.
    pub fn blob_url(&self) -> Option<&str> {
        match self {
            PreviewState::Embed { blob_url, .. } => Some(blob_url),
            _ => None,
        }
    }
}

/// A file chosen by the user.
///
/// The declared type is trusted as-is and never checked against the bytes. Cloning a handle is
/// cheap and shares the underlying byte source, which is read once per preview request.
#[derive(Clone)]
pub struct FileHandle {
    name: String,
    declared_type: String,
    source: Arc<dyn ByteSource>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, source: impl ByteSource + 'static) -> Self {
        FileHandle {
            name: name.into(),
            declared_type: declared_type.into(),
            source: Arc::new(source),
        }
    }

    pub fn from_bytes(name: impl Into<String>, declared_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        FileHandle::new(name, declared_type, bytes.into())
    }

    /// Creates a handle reading from a file on disk. The display name is the path's file name.
    pub fn from_path(path: &Utf8Path, declared_type: impl Into<String>) -> Self {
        let name = path.file_name().unwrap_or(path.as_str()).to_string();
        FileHandle::new(name, declared_type, PathSource::new(path))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub(crate) async fn read(&self) -> io::Result<Vec<u8>> {
        self.source.read().await
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}

/// How a declared type is read and interpreted. Computed once per request so the read and the
/// interpretation can never disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Image,
    Embed { media_type: String },
    Table,
    Text,
    Unreadable,
}

pub const PDF_TYPE: &str = "application/pdf";
pub const SPREADSHEET_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];
pub const WORD_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];
pub const TEXT_TYPES: [&str; 3] = ["text/plain", "application/xml", "text/xml"];

/// Classifies a declared media type. The first matching rule wins.
pub fn classify(declared_type: &str) -> Classification {
    if declared_type.starts_with("image/") {
        Classification::Image
    } else if declared_type == PDF_TYPE {
        Classification::Embed { media_type: PDF_TYPE.to_string() }
    } else if SPREADSHEET_TYPES.contains(&declared_type) {
        Classification::Table
    } else if WORD_TYPES.contains(&declared_type) {
        // Not every viewer can render every Word format, the embed is produced regardless.
        Classification::Embed { media_type: declared_type.to_string() }
    } else if TEXT_TYPES.contains(&declared_type) {
        Classification::Text
    } else {
        Classification::Unreadable
    }
}

/// Classifies `handle` and runs the matching decode strategy.
///
/// Never fails: every error collapses to [`PreviewState::Error`] with [`UNREADABLE_MESSAGE`]. An
/// `Embed` result owns an object URL registered in `urls`, which the caller must revoke once the
/// state is replaced.
pub async fn classify_and_decode(handle: &FileHandle, urls: &dyn ObjectUrls) -> PreviewState {
    let decoded = prepare(handle).await;
    claim(handle.name(), decoded, urls).await
}

/// Classifies `handle` and runs the matching decode strategy without registering an object URL.
pub(crate) async fn prepare(handle: &FileHandle) -> Decoded {
    let classification = classify(handle.declared_type());
    debug!("Classified {} ({}) as {:?}", handle.name(), handle.declared_type(), classification);

    decode::decode(handle, &classification).await
        .unwrap_or_else(|e| Decoded::Ready(unreadable(handle.name(), e)))
}

/// Turns a prepared result into its final state, registering a document's object URL.
pub(crate) async fn claim(name: &str, decoded: Decoded, urls: &dyn ObjectUrls) -> PreviewState {
    decoded.into_state(name, urls).await
        .unwrap_or_else(|e| unreadable(name, e))
}

fn unreadable(name: &str, e: DecodeError) -> PreviewState {
    warn!("Could not preview {}: {:#}", name, anyhow::Error::from(e));
    PreviewState::unreadable()
}

pub use error::*;
pub(crate) use decode::Decoded;

pub mod error;
pub mod object_url;
pub mod source;

mod decode;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_rule_order() {
        assert_eq!(classify("image/png"), Classification::Image);
        assert_eq!(classify("image/svg+xml"), Classification::Image);
        assert_eq!(classify("application/pdf"), Classification::Embed { media_type: "application/pdf".to_string() });
        assert_eq!(classify("application/vnd.ms-excel"), Classification::Table);
        assert_eq!(
            classify("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            Classification::Table,
        );
        assert_eq!(classify("application/msword"), Classification::Embed { media_type: "application/msword".to_string() });
        assert_eq!(classify("text/plain"), Classification::Text);
        assert_eq!(classify("text/xml"), Classification::Text);
        assert_eq!(classify("application/xml"), Classification::Text);
    }

    #[test]
    fn unknown_types_are_unreadable() {
        assert_eq!(classify("application/json"), Classification::Unreadable);
        assert_eq!(classify(""), Classification::Unreadable);
        assert_eq!(classify("text/html"), Classification::Unreadable);
        // exact matches only
        assert_eq!(classify("text/plain; charset=utf-8"), Classification::Unreadable);
        assert_eq!(classify("Application/PDF"), Classification::Unreadable);
    }

    #[test]
    fn failure_log_carries_the_source() {
        let e = DecodeError::Read {
            name: "a.txt".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };

        assert_eq!(format!("{:#}", anyhow::Error::from(e)), "Error reading file a.txt: gone");
    }

    #[tokio::test]
    async fn direct_decode_registers_documents() {
        let urls = object_url::MemoryObjectUrls::new();
        let handle = FileHandle::from_bytes("doc.pdf", PDF_TYPE, b"%PDF".to_vec());

        let state = classify_and_decode(&handle, &urls).await;

        assert!(matches!(state, PreviewState::Embed { media_type, .. } if media_type == PDF_TYPE));
        assert_eq!(urls.live_count(), 1);
    }
}
