use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use zoom_archiver::{
    cli::{
        handle_download_command, handle_status_command, handle_sync_command,
        handle_upload_command, Cli, CliCommand, SyncCliArgs,
    },
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Some(CliCommand::Version) = cli.command {
        println!("zoom-archiver {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(CliCommand::Download(args)) => {
            handle_download_command(&config, args).await?;
        }
        Some(CliCommand::Upload(args)) => {
            handle_upload_command(&config, args).await?;
        }
        Some(CliCommand::Sync(args)) => handle_sync_command(&config, args).await?,
        Some(CliCommand::Status) => handle_status_command(&config)?,
        Some(CliCommand::Version) => {}
        None => handle_sync_command(&config, SyncCliArgs::default()).await?,
    }

    Ok(())
}
