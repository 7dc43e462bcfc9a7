//! Error taxonomy shared by the archive pipeline.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The first user-listing request was rejected. Usually an expired token.
    #[error("user listing rejected with status {status}; is your API token still valid?")]
    FatalAuth { status: StatusCode },

    #[error("failed to fetch user page {page}: {reason}")]
    PartialDirectoryFailure { page: u32, reason: String },

    #[error("failed to list recordings for {user} ({from} to {to}): {reason}")]
    CatalogFailure {
        user: String,
        from: String,
        to: String,
        reason: String,
    },

    #[error("download of {url} failed: {reason}")]
    DownloadFailure { url: String, reason: String },

    #[error("upload of {} failed: {reason}", .path.display())]
    UploadFailure { path: PathBuf, reason: String },

    #[error("unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
