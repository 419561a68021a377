pub mod app_config;
pub mod dispatcher;
pub mod previewable;

// Re-export the types a file source and render surface need
pub use dispatcher::PreviewDispatcher;
pub use previewable::{classify, classify_and_decode, CellValue, Classification, FileHandle, PreviewState};
