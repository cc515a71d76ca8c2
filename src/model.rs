use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata returned by the video API for a single identifier.
///
/// The body is kept as received; `title`, `videos` and `audios` are typed views
/// over it. Serializing a `QueryResult` gives back the original body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct QueryResult {
    /// Video title, used as the stem of the downloaded file name
    pub title: String,
    /// Video (muxed) variants
    pub videos: Collection<VideoItem>,
    /// Audio-only variants
    pub audios: Collection<AudioItem>,
    body: Value,
}

#[derive(Deserialize)]
struct Fields {
    title: String,
    videos: Collection<VideoItem>,
    audios: Collection<AudioItem>,
}

impl QueryResult {
    /// Response body exactly as the API sent it.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl TryFrom<Value> for QueryResult {
    type Error = serde_json::Error;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let Fields { title, videos, audios } = Fields::deserialize(&body)?;
        Ok(Self { title, videos, audios, body })
    }
}

impl From<QueryResult> for Value {
    fn from(result: QueryResult) -> Self {
        result.body
    }
}

/// Wrapper matching the API's `{ "items": [...] }` shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub quality: String,
    pub size_text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioItem {
    pub size_text: String,
    pub url: String,
}

/// Which collection the download selector points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// File extension given to downloads of this kind.
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Video => "Download Video",
            MediaKind::Audio => "Download Audio",
        }
    }
}

/// A resolved variant: where to fetch it from and what to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
}

/// Message sent from a running download back to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadUpdate {
    Progress(f32),
    Finished(PathBuf),
    Failed(String),
}

/// Represents the current state of a download
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadStatus {
    /// Download is in progress
    Downloading,
    /// Download has completed successfully
    Done,
    /// Download stopped with an error
    Failed(String),
}

/// Data structure for tracking a download task in the UI
pub struct DownloadTask {
    /// Unique id for this download, used to route progress updates
    pub id: u64,
    /// File name the download is written to
    pub file_name: String,
    /// Final location on disk
    pub path: PathBuf,
    /// Current status of the download
    pub status: DownloadStatus,
    /// Progress fraction (0.0 to 1.0)
    pub progress: f32,
}
