use log::debug;

use crate::previewable::{object_url::ObjectUrls, Classification, DecodeError, FileHandle, PreviewState};

/// A decoded preview that has not registered any object URL yet.
///
/// Documents keep their bytes until [`Decoded::into_state`] registers them, so a result that
/// turns out to be stale never claims a URL.
pub(crate) enum Decoded {
    Ready(PreviewState),
    Document { bytes: Vec<u8>, media_type: String },
}

impl Decoded {
    pub(crate) fn is_document(&self) -> bool {
        matches!(self, Decoded::Document { .. })
    }

    /// Registers a document's bytes with `urls`. Other results pass through unchanged.
    pub(crate) async fn into_state(self, name: &str, urls: &dyn ObjectUrls) -> Result<PreviewState, DecodeError> {
        match self {
            Decoded::Ready(state) => Ok(state),
            Decoded::Document { bytes, media_type } => Ok(PreviewState::Embed {
                blob_url: embed::object_url(name, bytes, &media_type, urls).await?,
                media_type,
            }),
        }
    }
}

/// Reads `handle` once and interprets the bytes according to `classification`.
///
/// Unsupported types fail without touching the byte source.
pub(crate) async fn decode(handle: &FileHandle, classification: &Classification) -> Result<Decoded, DecodeError> {
    let name = handle.name();
    let decoded = match classification {
        Classification::Unreadable => {
            return Err(DecodeError::Unsupported { declared_type: handle.declared_type().to_string() });
        },
        Classification::Image => Decoded::Ready(PreviewState::Image {
            data_url: image::data_url(name, read(handle).await?, handle.declared_type()).await?,
        }),
        Classification::Embed { media_type } => Decoded::Document {
            bytes: read(handle).await?,
            media_type: media_type.clone(),
        },
        Classification::Table => Decoded::Ready(PreviewState::Table {
            rows: table::first_sheet_rows(name, read(handle).await?).await?,
        }),
        Classification::Text => Decoded::Ready(PreviewState::Text {
            content: text::content(&read(handle).await?),
        }),
    };

    Ok(decoded)
}

async fn read(handle: &FileHandle) -> Result<Vec<u8>, DecodeError> {
    let bytes = handle.read().await
        .map_err(|e| DecodeError::Read { name: handle.name().to_string(), source: e })?;
    debug!("Read {} bytes from {}", bytes.len(), handle.name());
    Ok(bytes)
}

mod embed;
mod image;
mod table;
mod text;
