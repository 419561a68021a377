use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use peek_core::{FileHandle, PreviewDispatcher, PreviewState};

use crate::render::render;

pub struct PreviewArgs {
    /// File to preview. Without one the preview reports that nothing was selected.
    pub path: Option<Utf8PathBuf>,
    /// Declared media type, guessed from the extension when absent
    pub declared_type: Option<String>,
    /// Leave the backing file of a document preview in place after exiting
    pub keep: bool,
}

/// Selects and uploads a single file, prints the resulting preview and returns it.
pub async fn preview(dispatcher: &PreviewDispatcher, args: PreviewArgs) -> PreviewState {
    let handle = args.path.as_deref().map(|path| {
        let declared_type = args.declared_type.clone().unwrap_or_else(|| guess_type(path));
        FileHandle::from_path(path, declared_type)
    });

    dispatcher.select(handle);
    dispatcher.upload().await;
    let state = dispatcher.state();
    print_state(&state);

    if !args.keep {
        // releases any document backing file
        dispatcher.select(None);
    }
    state
}

/// Declared type for a path, from its extension.
pub fn guess_type(path: &Utf8Path) -> String {
    let guessed = mime_guess::from_path(path).first_raw().unwrap_or(FALLBACK_TYPE);
    debug!("Guessed {} for {}", guessed, path);
    guessed.to_string()
}

pub fn print_state(state: &PreviewState) {
    match (state, render(state)) {
        (PreviewState::Error { .. }, Some(out)) => eprintln!("{}", out),
        (_, Some(out)) => println!("{}", out),
        (_, None) => {},
    }
}

const FALLBACK_TYPE: &str = "application/octet-stream";
