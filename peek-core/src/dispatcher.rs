use std::{future::Future, sync::{Arc, Mutex, MutexGuard, PoisonError}};

use log::{debug, info, warn};
use tokio::sync::watch;

use crate::previewable::{claim, object_url::ObjectUrls, prepare, Decoded, FileHandle, PreviewState, NO_SELECTION_MESSAGE};

/// Owns the preview state for a single file picker.
///
/// The file source calls [`PreviewDispatcher::select`] when the user picks a file and
/// [`PreviewDispatcher::upload`] when they confirm it. The render surface reads the state through
/// [`PreviewDispatcher::subscribe`]. Every `select` and `upload` starts a new request, and a decode
/// only changes the state if its request is still the latest one when it finishes.
///
/// Object URLs held by an `Embed` state are revoked as soon as that state is replaced. A document's
/// URL is only registered once its request is known to be current and the previous one is gone,
/// so at most one is live at a time.
#[derive(Clone)]
pub struct PreviewDispatcher {
    shared: Arc<Shared>,
}

struct Shared {
    urls: Arc<dyn ObjectUrls>,
    session: Mutex<Session>,
    state: watch::Sender<PreviewState>,
    // Held while a result claims its object URL and is published
    claiming: tokio::sync::Mutex<()>,
}

#[derive(Default)]
struct Session {
    selected: Option<FileHandle>,
    request: u64,
}

impl PreviewDispatcher {
    pub fn new(urls: Arc<dyn ObjectUrls>) -> Self {
        let (state, _) = watch::channel(PreviewState::Empty);
        PreviewDispatcher {
            shared: Arc::new(Shared {
                urls,
                session: Mutex::new(Session::default()),
                state,
                claiming: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Records the user's selection and resets the preview to `Empty`.
    ///
    /// Any decode still in flight becomes stale and its result will be dropped. Passing `None`
    /// clears the selection.
    pub fn select(&self, handle: Option<FileHandle>) {
        let mut session = self.shared.session();
        session.request += 1;
        match &handle {
            Some(h) => debug!("Selected {} ({}) as request {}", h.name(), h.declared_type(), session.request),
            None => debug!("Selection cleared at request {}", session.request),
        }
        session.selected = handle;
        self.shared.publish(PreviewState::Empty);
    }

    /// Starts previewing the selected file.
    ///
    /// The request is tagged immediately; the returned future performs the decode and resolves to
    /// `true` if its result was applied, or `false` if a newer request superseded it. With nothing
    /// selected the state becomes an error right away and the future resolves to `false`.
    pub fn upload(&self) -> impl Future<Output = bool> + Send + 'static {
        let shared = self.shared.clone();
        let pending = {
            let mut session = shared.session();
            session.request += 1;
            match session.selected.clone() {
                Some(handle) => Some((session.request, handle)),
                None => {
                    shared.publish(PreviewState::error(NO_SELECTION_MESSAGE));
                    None
                }
            }
        };

        async move {
            let Some((request, handle)) = pending else {
                return false;
            };
            debug!("Decoding {} for request {}", handle.name(), request);
            let decoded = prepare(&handle).await;
            shared.apply(request, handle.name(), decoded).await
        }
    }

    /// The currently selected file, if any.
    pub fn selected(&self) -> Option<FileHandle> {
        self.shared.session().selected.clone()
    }

    /// A snapshot of the current preview state.
    pub fn state(&self) -> PreviewState {
        self.shared.state.borrow().clone()
    }

    /// Receives every state transition, including resets to `Empty`.
    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.shared.state.subscribe()
    }

    pub fn object_urls(&self) -> &Arc<dyn ObjectUrls> {
        &self.shared.urls
    }
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The session guard, if `request` is still the latest one.
    fn current(&self, request: u64) -> Option<MutexGuard<'_, Session>> {
        let session = self.session();
        if session.request == request {
            Some(session)
        } else {
            debug!("Dropping result of stale request {} (latest is {})", request, session.request);
            None
        }
    }

    async fn apply(&self, request: u64, name: &str, decoded: Decoded) -> bool {
        let _claiming = self.claiming.lock().await;
        {
            let Some(_session) = self.current(request) else {
                return false;
            };
            // the previous document is released before the next one is registered
            if decoded.is_document() && self.state.borrow().blob_url().is_some() {
                self.publish(PreviewState::Empty);
            }
        }

        let state = claim(name, decoded, self.urls.as_ref()).await;

        let Some(_session) = self.current(request) else {
            if let Some(url) = state.blob_url() {
                self.revoke(url);
            }
            return false;
        };
        info!("Request {} finished: {}", request, describe(&state));
        self.publish(state);
        true
    }

    // Callers hold the session lock so publishing is ordered with request tagging
    fn publish(&self, state: PreviewState) {
        let previous = self.state.send_replace(state);
        if let Some(url) = previous.blob_url() {
            if self.state.borrow().blob_url() != Some(url) {
                self.revoke(url);
            }
        }
    }

    fn revoke(&self, url: &str) {
        match self.urls.revoke(url) {
            Ok(()) => debug!("Revoked {}", url),
            Err(e) => warn!("Could not revoke {}: {}", url, e),
        }
    }
}

fn describe(state: &PreviewState) -> String {
    match state {
        PreviewState::Empty => "empty".to_string(),
        PreviewState::Image { data_url } => format!("image ({} byte data url)", data_url.len()),
        PreviewState::Embed { media_type, .. } => format!("embed ({})", media_type),
        PreviewState::Table { rows } => format!("table ({} rows)", rows.len()),
        PreviewState::Text { content } => format!("text ({} chars)", content.chars().count()),
        PreviewState::Error { message } => format!("error ({})", message),
    }
}
