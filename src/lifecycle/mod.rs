//! Drives one archive run: accounts → recordings → files → completed log.
//!
//! Everything runs sequentially. A meeting is written to the completed log
//! only after its downloads satisfy the configured [`SuccessPolicy`], so an
//! interrupted run simply redoes the in-flight meeting next time.

use crate::completed::CompletedSetStore;
use crate::config::{Config, SuccessPolicy};
use crate::download::{target_path, truncate_url, DownloadEngine, NoProgress, ProgressObserver};
use crate::zoom::{select_files, DateRange, RecordingCatalog, RecordingEntry, Selection, UserDirectory, ZoomClient};
use anyhow::Result;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod report;

pub use report::{MeetingOutcome, RunReport};

#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    pub download_dir: PathBuf,
    pub range: DateRange,
    pub window_days: u32,
    pub page_size: u32,
    pub success_policy: SuccessPolicy,
    pub delete_remote: bool,
}

impl LifecycleOptions {
    pub fn from_config(config: &Config, range: DateRange) -> Self {
        Self {
            download_dir: config.storage.download_dir.clone(),
            range,
            window_days: config.zoom.window_days,
            page_size: config.zoom.page_size,
            success_policy: config.behavior.success_policy,
            delete_remote: config.behavior.delete_remote,
        }
    }
}

pub struct RecordingLifecycleController {
    zoom: ZoomClient,
    engine: DownloadEngine,
    store: CompletedSetStore,
    options: LifecycleOptions,
    cancel: CancellationToken,
    observer: Box<dyn ProgressObserver>,
}

impl RecordingLifecycleController {
    pub fn new(
        zoom: ZoomClient,
        store: CompletedSetStore,
        options: LifecycleOptions,
        cancel: CancellationToken,
    ) -> Self {
        let engine = DownloadEngine::new(zoom.http().clone());
        Self {
            zoom,
            engine,
            store,
            options,
            cancel,
            observer: Box::new(NoProgress),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn store(&self) -> &CompletedSetStore {
        &self.store
    }

    pub fn into_store(self) -> CompletedSetStore {
        self.store
    }

    /// Archive every account's recordings in directory order.
    ///
    /// Only a rejected user listing or a failure to persist a completion
    /// aborts the run; per-account and per-file problems are logged and
    /// counted in the report.
    pub async fn run(&mut self) -> Result<RunReport> {
        let mut report = RunReport::default();

        info!("Getting user accounts...");
        let listing = UserDirectory::new(&self.zoom, self.options.page_size)
            .list_accounts()
            .await?;
        report.skipped_user_pages = listing.failed_pages.len();

        'accounts: for account in &listing.accounts {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            report.accounts += 1;
            info!("Getting recording list for {}", account.display_name());

            let catalog = RecordingCatalog::new(
                &self.zoom,
                self.options.range,
                self.options.window_days,
                self.options.page_size,
            );
            let entries = match catalog.list_recordings(account).await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Skipping {}: {}", account.email, err);
                    report.catalog_failures.push(account.email.clone());
                    continue;
                }
            };
            let total = entries.len();
            info!("==> Found {} recordings", total);

            for (index, entry) in entries.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    break 'accounts;
                }
                let outcome = self.process_meeting(index, total, entry).await?;
                report.record(outcome);
                if outcome == MeetingOutcome::Cancelled {
                    break 'accounts;
                }
            }
        }

        if report.cancelled {
            warn!("Run interrupted; unfinished meetings will be retried next time");
        }
        Ok(report)
    }

    async fn process_meeting(
        &mut self,
        index: usize,
        total: usize,
        entry: &RecordingEntry,
    ) -> Result<MeetingOutcome> {
        let uuid = entry.meeting_uuid.as_str();
        if self.store.contains(uuid) {
            info!("==> Skipping already downloaded meeting: {}", uuid);
            return Ok(MeetingOutcome::Skipped);
        }

        let files = match select_files(entry) {
            Selection::Files(files) => files,
            Selection::Incomplete { file_ids } => {
                warn!(
                    "### Incomplete Recording ({} of {}) for {}: {}",
                    index + 1,
                    total,
                    uuid,
                    file_ids.join(", ")
                );
                return Ok(MeetingOutcome::Incomplete);
            }
            Selection::Empty => {
                info!(
                    "==> No video files ({} of {}) for meeting {}",
                    index + 1,
                    total,
                    uuid
                );
                return Ok(MeetingOutcome::NothingToDownload);
            }
        };

        let mut downloaded = 0;
        let mut failed = 0;
        for file in &files {
            if self.cancel.is_cancelled() {
                return Ok(MeetingOutcome::Cancelled);
            }

            let url = match self.zoom.authorized_download_url(&file.download_url) {
                Ok(url) => url,
                Err(err) => {
                    error!("Cannot download {} of meeting {}: {}", file.file_id, uuid, err);
                    failed += 1;
                    continue;
                }
            };
            let target = target_path(&self.options.download_dir, entry, file);
            info!(
                "==> Downloading ({} of {}) as {}: {}: {}",
                index + 1,
                total,
                file.recording_type,
                file.file_id,
                truncate_url(&file.download_url)
            );

            let ok = tokio::select! {
                ok = self.engine.download(&url, &target, self.observer.as_mut()) => ok,
                _ = self.cancel.cancelled() => {
                    self.observer.on_finish(false);
                    warn!("Download of {} interrupted", target.display());
                    return Ok(MeetingOutcome::Cancelled);
                }
            };
            if ok {
                downloaded += 1;
            } else {
                failed += 1;
            }
        }

        if self
            .options
            .success_policy
            .is_satisfied(downloaded, downloaded + failed)
        {
            self.store.mark_complete(uuid)?;
            // The log entry is durable before anything is removed remotely.
            if self.options.delete_remote && failed == 0 {
                match self.zoom.delete_meeting_recordings(uuid).await {
                    Ok(status) => info!("Delete request for meeting {} returned {}", uuid, status),
                    Err(err) => warn!("Delete request for meeting {} failed: {}", uuid, err),
                }
            }
            Ok(MeetingOutcome::Completed { downloaded, failed })
        } else {
            warn!(
                "Meeting {} not marked complete ({} of {} files downloaded)",
                uuid,
                downloaded,
                downloaded + failed
            );
            Ok(MeetingOutcome::Failed { downloaded, failed })
        }
    }
}
