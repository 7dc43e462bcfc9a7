use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zoom-archiver")]
#[command(about = "Archive Zoom cloud recordings and re-upload them to Vimeo", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Download new recordings for every account
    Download(DownloadCliArgs),
    /// Upload downloaded recordings to Vimeo
    Upload(UploadCliArgs),
    /// Download, then upload (default)
    Sync(SyncCliArgs),
    /// Show the completed-meetings log
    Status,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct DownloadCliArgs {
    /// First day to list recordings for (YYYY-MM-DD, default: yesterday)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day to list recordings for (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Override the download directory
    #[arg(long)]
    pub download_dir: Option<PathBuf>,
    /// Delete cloud recordings once all their files are downloaded
    #[arg(long)]
    pub delete_remote: bool,
    /// Only mark a meeting complete when every file downloaded
    #[arg(long)]
    pub require_all: bool,
    /// Hide download progress bars
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct UploadCliArgs {
    /// Override the download directory to upload from
    #[arg(long)]
    pub download_dir: Option<PathBuf>,
    /// Keep uploaded files in the staging directory
    #[arg(long)]
    pub keep: bool,
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct SyncCliArgs {
    #[command(flatten)]
    pub download: DownloadCliArgs,
    /// Keep uploaded files in the staging directory
    #[arg(long)]
    pub keep: bool,
}
