//! wledmark — discover WLED controllers via mDNS and bookmark them in Firefox.
//!
//! Thin CLI layer: argument parsing, logging setup, the interactive profile
//! chooser, and the export file. All discovery and store logic lives in the
//! library.

use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wledmark::app::{Session, SessionConfig};
use wledmark::types::device::ExportDocument;
use wledmark::types::errors::{ProfileError, SessionError};

/// Exit code when no usable Firefox profile was found.
const EXIT_NO_PROFILE: u8 = 2;
/// Exit code when the scan discovered zero devices.
const EXIT_NO_DEVICES: u8 = 3;
/// Exit code when some, but not all, devices could be bookmarked.
const EXIT_PARTIAL: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "wledmark", version, about = "Bookmark WLED controllers discovered on the local network")]
struct Cli {
    /// Discovery duration in seconds.
    #[arg(long, default_value_t = 30)]
    duration: u64,

    /// Remove the bookmarks previously added by this tool instead of scanning.
    #[arg(long, conflicts_with = "duration")]
    restore: bool,

    /// Output JSON file for the discovered-device list.
    #[arg(long, default_value = "discovered_services.json")]
    output: PathBuf,

    /// Path to a Firefox places.sqlite, bypassing profile discovery.
    #[arg(long)]
    profile_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let search_root = home_dir();
    let ledger_path = ledger_path();
    let mut config = SessionConfig::new(search_root, ledger_path);
    config.duration = Duration::from_secs(cli.duration);
    config.profile_path = cli.profile_path.clone();

    let mut session = Session::new(config);
    let chooser = |options: &[String]| prompt_choice(options);

    if cli.restore {
        match session.run_restore(Some(&chooser)) {
            Ok(report) => {
                info!(removed = report.removed, "Restore complete");
                ExitCode::SUCCESS
            }
            Err(e) => failure_exit(e),
        }
    } else {
        match session.run_scan(Some(&chooser)) {
            Ok(report) => {
                if report.devices.is_empty() {
                    info!("No WLED controllers found during discovery");
                    return ExitCode::from(EXIT_NO_DEVICES);
                }
                if let Err(e) = write_export(&cli.output, &report) {
                    error!(error = %e, "Failed to save discovered services");
                }
                info!(
                    devices = report.devices.len(),
                    added = report.added,
                    failed = report.failed.len(),
                    "Bookmarking complete"
                );
                if !report.failed.is_empty() {
                    for title in &report.failed {
                        error!(title = %title, "Device was not bookmarked");
                    }
                    return ExitCode::from(EXIT_PARTIAL);
                }
                ExitCode::SUCCESS
            }
            Err(e) => failure_exit(e),
        }
    }
}

fn failure_exit(e: SessionError) -> ExitCode {
    error!(error = %e, "Run failed");
    match e {
        SessionError::Profile(ProfileError::NoProfileFound(_)) => ExitCode::from(EXIT_NO_PROFILE),
        _ => ExitCode::FAILURE,
    }
}

/// Numbered stdin prompt used when several profiles are found.
fn prompt_choice(options: &[String]) -> Option<usize> {
    println!("Multiple Firefox profiles found:");
    for (i, option) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, option);
    }
    print!("Select a profile (1-{}): ", options.len());
    io::stdout().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let choice: usize = line.trim().parse().ok()?;
    choice.checked_sub(1).filter(|i| *i < options.len())
}

/// Writes the discovered-device list as JSON next to wherever the user asked.
fn write_export(path: &Path, report: &wledmark::app::SessionReport) -> io::Result<()> {
    let document = ExportDocument::from_devices(&report.devices);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &document).map_err(io::Error::other)?;
    info!(path = %path.display(), "Discovered services saved");
    Ok(())
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// The ledger lives next to the executable's working directory, mirroring
/// where the tool reads it back during restore.
fn ledger_path() -> PathBuf {
    PathBuf::from("bookmarks_added.jsonl")
}
