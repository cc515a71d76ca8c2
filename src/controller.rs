//! State and transitions of the download form, independent of how it is drawn.

use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::{FETCH_FAILED_MESSAGE, FetchError, INVALID_URL_MESSAGE},
    model::{DownloadRequest, MediaKind, QueryResult},
};

/// Coarse view of the form used to decide what to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No result yet (possibly showing an error)
    Idle,
    /// Metadata request in flight
    Loading,
    /// A result is present; selectors and download are available
    Ready,
}

#[derive(Debug, Default)]
pub struct FormController {
    /// Raw text of the URL field
    pub url_input: String,
    pub download_type: MediaKind,
    pub selected_video_quality: String,
    pub selected_audio_quality: String,
    loading: bool,
    error: String,
    result: Option<QueryResult>,
}

/// Path of `raw` without its leading `/`, or `None` when `raw` is not an absolute URL.
///
/// The query string is ignored, so `https://youtube.com/watch?v=XYZ` yields `watch`.
pub fn extract_video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let path = parsed.path();
    Some(path.strip_prefix('/').unwrap_or(path).to_string())
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current error message; empty when there is none.
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading() {
            Phase::Loading
        } else if self.result.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    /// Extracts the identifier from the URL field, flagging "Invalid URL" on failure.
    pub fn extract_video_id(&mut self) -> String {
        match extract_video_id(&self.url_input) {
            Some(id) => id,
            None => {
                debug!(input = %self.url_input, "input is not an absolute URL");
                self.error = INVALID_URL_MESSAGE.to_string();
                String::new()
            }
        }
    }

    /// Starts a submission and returns the identifier to fetch.
    ///
    /// Returns `None` while a previous request is still in flight.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.loading {
            debug!("submit ignored, request already in flight");
            return None;
        }
        self.error.clear();
        let video_id = self.extract_video_id();
        self.loading = true;
        Some(video_id)
    }

    /// Settles the in-flight request. Loading always ends here.
    pub fn finish_submit(&mut self, outcome: Result<QueryResult, FetchError>) {
        match outcome {
            Ok(result) => {
                info!(title = %result.title, "metadata ready");
                self.error.clear();
                self.result = Some(result);
            }
            Err(err) => {
                warn!(error = %err, "metadata fetch failed");
                self.error = FETCH_FAILED_MESSAGE.to_string();
            }
        }
        self.loading = false;
    }

    /// Looks up the selected variant. `None` when nothing matches; state is untouched either way.
    pub fn resolve_download(&self) -> Option<DownloadRequest> {
        let result = self.result.as_ref()?;
        let url = match self.download_type {
            MediaKind::Video => result
                .videos
                .items
                .iter()
                .find(|item| item.quality == self.selected_video_quality)
                .map(|item| item.url.clone()),
            MediaKind::Audio => result
                .audios
                .items
                .iter()
                .find(|item| item.size_text == self.selected_audio_quality)
                .map(|item| item.url.clone()),
        };

        match url {
            Some(url) => Some(DownloadRequest {
                url,
                file_name: format!("{}.{}", result.title, self.download_type.extension()),
            }),
            None => {
                debug!(kind = ?self.download_type, "no variant matches the selection");
                None
            }
        }
    }
}
