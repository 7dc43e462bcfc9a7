//! Streams recording files to disk.
//!
//! Bytes are written to a `.part` file as they arrive and the file is renamed
//! to its target name once the body is complete. A failed transfer leaves the
//! `.part` file on disk; callers only mark a meeting complete on success, so
//! the next run overwrites it.

use crate::error::{ArchiveError, ArchiveResult};
use reqwest::{Client, Url};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error};

mod naming;
mod progress;

pub use naming::{display_name, target_path};
pub use progress::{NoProgress, ProgressBarObserver, ProgressObserver};

pub const CHUNK_SIZE: usize = 32 * 1024;
const LOGGED_URL_LEN: usize = 64;
const PARTIAL_SUFFIX: &str = ".part";

pub struct DownloadEngine {
    client: Client,
}

impl DownloadEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` into `target`. Failures are logged and reported as
    /// `false`; nothing is retried.
    pub async fn download(
        &self,
        url: &Url,
        target: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> bool {
        match self.try_download(url, target, observer).await {
            Ok(bytes) => {
                debug!("Wrote {} bytes to {}", bytes, target.display());
                true
            }
            Err(err) => {
                error!("Download to {} failed: {}", target.display(), err);
                false
            }
        }
    }

    pub async fn try_download(
        &self,
        url: &Url,
        target: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> ArchiveResult<u64> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::DownloadFailure {
                url: truncate_url(url.as_str()),
                reason: format!("server responded with {}", status),
            });
        }

        let total = response.content_length().unwrap_or(0);
        let label = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        observer.on_start(&label, total);

        let partial = partial_path(target);
        let result = async {
            let file = fs::File::create(&partial).await?;
            let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
            let mut received: u64 = 0;
            let streamed = loop {
                match response.chunk().await {
                    Ok(Some(chunk)) => {
                        if let Err(err) = writer.write_all(&chunk).await {
                            break Err(ArchiveError::from(err));
                        }
                        received += chunk.len() as u64;
                        observer.on_progress(received);
                    }
                    Ok(None) => break Ok(received),
                    Err(err) => break Err(ArchiveError::from(err)),
                }
            };
            // Whatever arrived stays in the .part file, even on failure.
            let flushed = writer.flush().await;
            let received = streamed?;
            flushed?;
            fs::rename(&partial, target).await?;
            Ok::<u64, ArchiveError>(received)
        }
        .await;

        observer.on_finish(result.is_ok());
        result
    }
}

/// In-progress downloads are written next to their target with a `.part`
/// suffix and only renamed once the whole body arrived.
pub fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(OsString::from).unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    target.with_file_name(name)
}

/// Shorten a URL for log lines, dropping its query so tokens never leak.
pub fn truncate_url(raw: &str) -> String {
    let without_query = raw.split('?').next().unwrap_or(raw);
    if without_query.chars().count() <= LOGGED_URL_LEN {
        return without_query.to_string();
    }
    let head: String = without_query.chars().take(LOGGED_URL_LEN).collect();
    format!("{}...", head)
}
