//! gpsync - mirror a Google Photos library into a local directory
//!
//! ```text
//! gpsync --albums -d ~/Pictures/google --delete-files --delete-dirs
//! gpsync --photos -z 2048 2048 --no-update
//! ```

mod token;

use anyhow::{Context, Result};
use bridge_desktop::{ReqwestHttpClient, SystemZone, TokioFileSystem};
use bridge_traits::{FileSystemAccess, HttpClient, LocalZone, MediaLibrary};
use clap::{Args, Parser, ValueEnum};
use core_runtime::config::{MirrorConfig, SizeSelector, SyncMode};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use core_sync::{MirrorCoordinator, SyncReport};
use provider_google_photos::GooglePhotosConnector;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gpsync", version)]
#[command(about = "One-way mirror of a Google Photos library onto the local filesystem")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// Destination directory
    #[arg(short = 'd', long, default_value = ".")]
    destination_dir: PathBuf,

    /// Directory holding the .gp_token credential file [default: HOME]
    #[arg(short = 't', long)]
    token_dir: Option<PathBuf>,

    /// Bound still images to WIDTH x HEIGHT. A zero width downloads nothing;
    /// negative edges (-1 -1) or omitting the flag download full size.
    #[arg(
        short = 'z',
        long,
        num_args = 2,
        value_names = ["WIDTH", "HEIGHT"],
        allow_negative_numbers = true
    )]
    size: Option<Vec<i32>>,

    /// List actions only, change nothing
    #[arg(short = '0', long)]
    no_update: bool,

    /// Delete local files not found remotely
    #[arg(long)]
    delete_files: bool,

    /// Delete local directories not matching an album (album modes only)
    #[arg(long)]
    delete_dirs: bool,

    /// Skip files or albums matching this glob. Excluded names are not
    /// protected from --delete-files / --delete-dirs.
    #[arg(short = 'x', long)]
    exclude: Option<String>,

    /// Only report failures
    #[arg(short = 'q', long)]
    quiet: bool,

    #[arg(long, value_enum, default_value_t = LogFormatArg::Compact)]
    log_format: LogFormatArg,

    /// Bearer token, bypassing the credential file
    #[arg(long, env = "GPSYNC_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ModeArgs {
    /// Sync by albums
    #[arg(short = 'a', long)]
    albums: bool,

    /// Sync by shared albums
    #[arg(short = 's', long)]
    shared_albums: bool,

    /// Sync every photo, flat
    #[arg(short = 'p', long)]
    photos: bool,
}

impl ModeArgs {
    fn mode(&self) -> SyncMode {
        if self.albums {
            SyncMode::Albums
        } else if self.shared_albums {
            SyncMode::SharedAlbums
        } else {
            SyncMode::Items
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    fn size(&self) -> SizeSelector {
        match self.size.as_deref() {
            Some(&[0, _]) => SizeSelector::Skip,
            Some(&[width, height]) => match (u32::try_from(width), u32::try_from(height)) {
                (Ok(width), Ok(height)) => SizeSelector::from_dimensions(width, height),
                _ => SizeSelector::Full,
            },
            _ => SizeSelector::Full,
        }
    }

    fn mirror_config(&self) -> Result<MirrorConfig> {
        let config = MirrorConfig::builder()
            .mode(self.mode.mode())
            .target_root(&self.destination_dir)
            .size(self.size())
            .dry_run(self.no_update)
            .delete_files(self.delete_files)
            .delete_directories(self.delete_dirs)
            .exclude_opt(self.exclude.clone())
            .quiet(self.quiet)
            .build()?;
        Ok(config)
    }

    fn logging_config(&self) -> LoggingConfig {
        let base = if self.quiet {
            LoggingConfig::quiet()
        } else {
            LoggingConfig::default()
        };
        base.with_format(self.log_format.into())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.logging_config()) {
        eprintln!("gpsync: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(report) => {
            if report.has_failures() {
                warn!(
                    failures = report.failures.len(),
                    "Finished with per-item failures"
                );
                for failure in &report.failures {
                    debug!(path = ?failure.path, reason = %failure.kind, "Failed entry");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<SyncReport> {
    let config = cli.mirror_config()?;
    let token_dir = token::token_dir(cli.token_dir.clone())?;
    let access_token = token::resolve_access_token(cli.access_token.clone(), &token_dir).await?;
    debug!(
        token = %redact_if_sensitive("access_token", &access_token),
        token_dir = %token_dir.display(),
        "Access token loaded"
    );

    info!(
        mode = %config.mode,
        root = %config.target_root().display(),
        dry_run = config.dry_run,
        "Starting gpsync"
    );

    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::new().context("Failed to build HTTP client")?);
    let library: Arc<dyn MediaLibrary> = Arc::new(GooglePhotosConnector::new(http, access_token));
    let fs: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new());
    let zone: Arc<dyn LocalZone> = Arc::new(SystemZone::new());

    let coordinator = MirrorCoordinator::new(config, library, fs, zone);
    let report = coordinator.run().await.context("Mirror run failed")?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "gpsync", "-a", "-d", "/srv/photos", "-z", "800", "600", "-0", "--delete-files",
            "--delete-dirs", "-x", "priv*", "-q",
        ])
        .unwrap();

        let config = cli.mirror_config().unwrap();
        assert_eq!(config.mode, SyncMode::Albums);
        assert_eq!(config.target_root, PathBuf::from("/srv/photos"));
        assert_eq!(
            config.size,
            SizeSelector::Bounded {
                width: 800,
                height: 600
            }
        );
        assert!(config.dry_run && config.delete_files && config.delete_directories && config.quiet);
        assert_eq!(config.exclude_str(), Some("priv*"));
    }

    #[test]
    fn test_exactly_one_mode_is_required() {
        assert!(Cli::try_parse_from(["gpsync"]).is_err());
        assert!(Cli::try_parse_from(["gpsync", "-a", "-p"]).is_err());
    }

    #[test]
    fn test_zero_width_skips_downloads() {
        let cli = Cli::try_parse_from(["gpsync", "-p", "-z", "0", "0"]).unwrap();
        assert_eq!(cli.size(), SizeSelector::Skip);
    }

    #[test]
    fn test_negative_size_means_full() {
        let cli = Cli::try_parse_from(["gpsync", "-a", "-z", "-1", "-1"]).unwrap();
        assert_eq!(cli.size(), SizeSelector::Full);
        assert_eq!(cli.mirror_config().unwrap().size, SizeSelector::Full);

        let cli = Cli::try_parse_from(["gpsync", "-a", "--size", "1024", "-1"]).unwrap();
        assert_eq!(cli.size(), SizeSelector::Full);

        let cli = Cli::try_parse_from(["gpsync", "-a"]).unwrap();
        assert_eq!(cli.size(), SizeSelector::Full);
    }

    #[test]
    fn test_delete_dirs_rejected_in_photos_mode() {
        let cli = Cli::try_parse_from(["gpsync", "-p", "--delete-dirs"]).unwrap();
        assert!(cli.mirror_config().is_err());
    }
}
