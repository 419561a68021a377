use std::io;

use crate::previewable::object_url::ObjectUrlError;

/// Errors that can occur while decoding a file into a preview.
///
/// These never reach the render surface. The dispatcher logs them and shows a fixed message.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The declared type matched no decode strategy.
    #[error("No preview available for declared type {declared_type:?}")]
    Unsupported { declared_type: String },

    /// The byte source could not be read.
    #[error("Error reading file {name}")]
    Read { name: String, #[source] source: io::Error },

    /// The bytes were read but could not be interpreted.
    #[error("Error parsing file {name}")]
    Parse { name: String, #[source] source: anyhow::Error },

    /// A workbook was parsed but declared no sheets.
    #[error("Workbook {name} has no sheets")]
    EmptyWorkbook { name: String },

    /// No object URL could be created for the bytes.
    #[error("Error creating object URL for {name}")]
    ObjectUrl { name: String, #[source] source: ObjectUrlError },

    /// A blocking decode task panicked or was cancelled.
    #[error("Decode task for {name} did not complete")]
    Task { name: String, #[source] source: tokio::task::JoinError },
}
