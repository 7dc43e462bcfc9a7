//! Re-uploads archived recordings to the media host.

use crate::download::display_name;
use crate::error::{ArchiveError, ArchiveResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

mod vimeo;

pub use vimeo::VimeoUploader;

#[async_trait]
pub trait MediaUploader: Send + Sync {
    fn name(&self) -> &'static str;

    /// Upload the file and return the remote resource identifier.
    async fn upload(&self, path: &Path, display_name: Option<&str>) -> ArchiveResult<String>;
}

/// Upload with a display name; if that is refused, try once more without it.
pub async fn upload_with_fallback(
    uploader: &dyn MediaUploader,
    path: &Path,
    display_name: Option<&str>,
) -> ArchiveResult<String> {
    if let Some(name) = display_name {
        match uploader.upload(path, Some(name)).await {
            Ok(uri) => {
                info!("Uploaded {} as {} named {}", path.display(), uri, name);
                return Ok(uri);
            }
            Err(err) => warn!(
                "{} rejected named upload of {}: {}; retrying without a name",
                uploader.name(),
                path.display(),
                err
            ),
        }
    }

    match uploader.upload(path, None).await {
        Ok(uri) => {
            info!("Uploaded {} as {} without a name", path.display(), uri);
            Ok(uri)
        }
        Err(err) => Err(ArchiveError::UploadFailure {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub download_dir: PathBuf,
    pub uploaded_dir: PathBuf,
    /// Keep the staging directory instead of removing it after the pass.
    pub keep_uploaded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<PathBuf>,
}

/// Archived videos live one directory below the download root.
pub fn collect_videos(download_dir: &Path) -> Vec<PathBuf> {
    let mut videos: Vec<PathBuf> = WalkDir::new(download_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("mp4"))
                .unwrap_or(false)
        })
        .collect();
    videos.sort();
    videos
}

/// Upload every archived video, moving each one into the staging directory
/// once it is on the media host. Failed uploads stay where they are.
pub async fn run_upload_pass(
    uploader: &dyn MediaUploader,
    options: &UploadOptions,
) -> Result<UploadReport> {
    let mut report = UploadReport::default();
    let videos = collect_videos(&options.download_dir);
    info!("Found {} video(s) to upload", videos.len());
    if videos.is_empty() {
        return Ok(report);
    }

    std::fs::create_dir_all(&options.uploaded_dir).with_context(|| {
        format!(
            "Failed to create staging directory {}",
            options.uploaded_dir.display()
        )
    })?;

    for video in videos {
        let name = display_name(&video);
        info!("Uploading {}", name.as_deref().unwrap_or("video"));
        match upload_with_fallback(uploader, &video, name.as_deref()).await {
            Ok(uri) => {
                stage(&video, &options.uploaded_dir)?;
                report.uploaded.push(uri);
            }
            Err(err) => {
                warn!("{}", err);
                report.failed.push(video);
            }
        }
    }

    if !options.keep_uploaded {
        std::fs::remove_dir_all(&options.uploaded_dir).with_context(|| {
            format!(
                "Failed to remove staging directory {}",
                options.uploaded_dir.display()
            )
        })?;
    }

    Ok(report)
}

fn stage(video: &Path, uploaded_dir: &Path) -> Result<()> {
    let file_name = video
        .file_name()
        .context("Uploaded video has no file name")?;
    let destination = uploaded_dir.join(file_name);
    info!("Moving {} to {}", video.display(), uploaded_dir.display());
    std::fs::rename(video, &destination)
        .or_else(|_| {
            std::fs::copy(video, &destination)?;
            std::fs::remove_file(video)
        })
        .with_context(|| format!("Failed to move {}", video.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Refuses named uploads, or everything when `always_fail` is set.
    struct FakeUploader {
        always_fail: bool,
        calls: Mutex<Vec<Option<String>>>,
    }

    impl FakeUploader {
        fn new(always_fail: bool) -> Self {
            Self {
                always_fail,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaUploader for FakeUploader {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn upload(&self, _path: &Path, display_name: Option<&str>) -> ArchiveResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push(display_name.map(str::to_string));
            if self.always_fail || display_name.is_some() {
                return Err(ArchiveError::Status {
                    status: StatusCode::BAD_REQUEST,
                    url: "fake".to_string(),
                });
            }
            Ok("/videos/1".to_string())
        }
    }

    #[tokio::test]
    async fn test_named_failure_falls_back_to_unnamed() {
        let uploader = FakeUploader::new(false);
        let uri = upload_with_fallback(&uploader, Path::new("a.mp4"), Some("A"))
            .await
            .unwrap();

        assert_eq!(uri, "/videos/1");
        assert_eq!(
            *uploader.calls.lock().unwrap(),
            vec![Some("A".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_second_failure_is_upload_failure() {
        let uploader = FakeUploader::new(true);
        let err = upload_with_fallback(&uploader, Path::new("a.mp4"), Some("A"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::UploadFailure { .. }));
        assert_eq!(uploader.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upload_pass_stages_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("downloads");
        let meeting = downloads.join("Class - 2024.01.01 - 09.00 AM UTC");
        std::fs::create_dir_all(&meeting).unwrap();
        std::fs::write(meeting.join("t - Class - Active Speaker - f1.mp4"), b"v").unwrap();
        std::fs::write(meeting.join("notes.txt"), b"n").unwrap();
        std::fs::write(downloads.join("stray.mp4"), b"v").unwrap();

        let options = UploadOptions {
            download_dir: downloads.clone(),
            uploaded_dir: dir.path().join("uploaded"),
            keep_uploaded: false,
        };
        let uploader = FakeUploader::new(false);
        let report = run_upload_pass(&uploader, &options).await.unwrap();

        assert_eq!(report.uploaded, vec!["/videos/1".to_string()]);
        assert!(report.failed.is_empty());
        assert!(!meeting.join("t - Class - Active Speaker - f1.mp4").exists());
        assert!(meeting.join("notes.txt").exists());
        assert!(downloads.join("stray.mp4").exists());
        assert!(!options.uploaded_dir.exists());
    }

    #[test]
    fn test_unfinished_downloads_are_not_collected() {
        let dir = tempfile::tempdir().unwrap();
        let meeting = dir.path().join("m");
        std::fs::create_dir_all(&meeting).unwrap();
        std::fs::write(meeting.join("b - f2.mp4.part"), b"v").unwrap();
        std::fs::write(meeting.join("a - f1.mp4"), b"v").unwrap();

        assert_eq!(collect_videos(dir.path()), vec![meeting.join("a - f1.mp4")]);
    }

    #[tokio::test]
    async fn test_failed_upload_stays_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let meeting = dir.path().join("downloads").join("m");
        std::fs::create_dir_all(&meeting).unwrap();
        let video = meeting.join("x - f1.mp4");
        std::fs::write(&video, b"v").unwrap();

        let options = UploadOptions {
            download_dir: dir.path().join("downloads"),
            uploaded_dir: dir.path().join("uploaded"),
            keep_uploaded: true,
        };
        let report = run_upload_pass(&FakeUploader::new(true), &options)
            .await
            .unwrap();

        assert_eq!(report.failed, vec![video.clone()]);
        assert!(video.exists());
    }
}
