use crate::completed::CompletedSetStore;
use crate::config::{Config, SuccessPolicy};
use crate::download::ProgressBarObserver;
use crate::lifecycle::{LifecycleOptions, RecordingLifecycleController, RunReport};
use crate::upload::{run_upload_pass, UploadOptions, UploadReport, VimeoUploader};
use crate::zoom::{DateRange, ZoomClient};
use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub mod args;

pub use args::{Cli, CliCommand, DownloadCliArgs, SyncCliArgs, UploadCliArgs};

pub async fn handle_download_command(config: &Config, args: DownloadCliArgs) -> Result<RunReport> {
    let range = resolve_range(config, args.from, args.to, Local::now().date_naive())?;

    let mut options = LifecycleOptions::from_config(config, range);
    if let Some(dir) = args.download_dir {
        options.download_dir = dir;
    }
    if args.delete_remote {
        options.delete_remote = true;
    }
    if args.require_all {
        options.success_policy = SuccessPolicy::AllSucceeded;
    }

    let zoom = ZoomClient::new(config)?;
    let store = CompletedSetStore::load(config.completed_log_path()?)?;
    let download_dir = options.download_dir.clone();
    println!(
        "Listing recordings from {} to {} into {}",
        range.start,
        range.end,
        download_dir.display()
    );

    let mut controller =
        RecordingLifecycleController::new(zoom, store, options, cancel_on_ctrl_c());
    if config.behavior.show_progress && !args.no_progress {
        controller = controller.with_observer(Box::new(ProgressBarObserver::new()));
    }

    let report = controller.run().await?;
    print_run_report(&report);

    let save_location = std::fs::canonicalize(&download_dir).unwrap_or(download_dir);
    println!("Recordings have been saved to: {}", save_location.display());
    Ok(report)
}

pub async fn handle_upload_command(config: &Config, args: UploadCliArgs) -> Result<UploadReport> {
    let uploader = VimeoUploader::new(config)?;
    let options = UploadOptions {
        download_dir: args
            .download_dir
            .unwrap_or_else(|| config.storage.download_dir.clone()),
        uploaded_dir: config.storage.uploaded_dir.clone(),
        keep_uploaded: args.keep,
    };

    let report = run_upload_pass(&uploader, &options).await?;
    println!(
        "Uploaded {} video(s), {} failed",
        report.uploaded.len(),
        report.failed.len()
    );
    for path in &report.failed {
        println!("  not uploaded: {}", path.display());
    }
    Ok(report)
}

pub async fn handle_sync_command(config: &Config, args: SyncCliArgs) -> Result<()> {
    let download_dir = args.download.download_dir.clone();
    let report = handle_download_command(config, args.download).await?;
    if report.cancelled {
        warn!("Skipping upload because the download run was interrupted");
        return Ok(());
    }
    handle_upload_command(
        config,
        UploadCliArgs {
            download_dir,
            keep: args.keep,
        },
    )
    .await?;
    Ok(())
}

pub fn handle_status_command(config: &Config) -> Result<()> {
    let store = CompletedSetStore::load(config.completed_log_path()?)?;
    println!("Completed log: {}", store.path().display());
    if store.is_first_run() {
        println!("No meetings archived yet.");
    } else {
        println!("Archived meetings: {}", store.len());
    }
    Ok(())
}

/// Explicit dates win; otherwise look back `lookback_days` from `today`.
fn resolve_range(
    config: &Config,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange> {
    let default = DateRange::lookback(to.unwrap_or(today), config.zoom.lookback_days);
    let range = DateRange::new(from.unwrap_or(default.start), default.end);
    if range.start > range.end {
        bail!(
            "--from ({}) must not be after --to ({})",
            range.start,
            range.end
        );
    }
    Ok(range)
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current download");
            trigger.cancel();
        }
    });
    token
}

fn print_run_report(report: &RunReport) {
    println!();
    println!("*** All done! ***");
    println!(
        "Accounts: {} | Meetings: {} | Completed: {} | Failed: {} | Skipped: {} | Incomplete: {}",
        report.accounts,
        report.meetings,
        report.completed,
        report.failed,
        report.skipped,
        report.incomplete
    );
    println!(
        "Files downloaded: {} | Files failed: {}",
        report.files_downloaded, report.files_failed
    );
    if report.skipped_user_pages > 0 {
        println!("User pages skipped: {}", report.skipped_user_pages);
    }
    if !report.catalog_failures.is_empty() {
        println!(
            "Could not list recordings for: {}",
            report.catalog_failures.join(", ")
        );
    }
    if report.cancelled {
        println!("Run was interrupted; remaining meetings will be picked up next time.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom::date_windows;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_range_is_yesterday_to_today() {
        let range = resolve_range(&Config::default(), None, None, day(2024, 5, 10)).unwrap();
        assert_eq!(range, DateRange::new(day(2024, 5, 9), day(2024, 5, 10)));
    }

    #[test]
    fn test_explicit_range() {
        let range = resolve_range(
            &Config::default(),
            Some(day(2024, 1, 1)),
            Some(day(2024, 4, 5)),
            day(2024, 5, 10),
        )
        .unwrap();
        assert_eq!(range, DateRange::new(day(2024, 1, 1), day(2024, 4, 5)));
    }

    #[test]
    fn test_same_day_range_lists_that_day() {
        let day_only = day(2024, 3, 5);
        let range =
            resolve_range(&Config::default(), Some(day_only), Some(day_only), day_only).unwrap();
        assert_eq!(
            date_windows(range.start, range.end, 30),
            vec![(day_only, day_only)]
        );

        let mut config = Config::default();
        config.zoom.lookback_days = 0;
        let range = resolve_range(&config, None, None, day_only).unwrap();
        assert_eq!(date_windows(range.start, range.end, 30).len(), 1);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(resolve_range(
            &Config::default(),
            Some(day(2024, 5, 1)),
            Some(day(2024, 4, 1)),
            day(2024, 5, 10),
        )
        .is_err());
    }
}
