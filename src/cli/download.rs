//! Download command implementation

use crate::downloader::config::{DEFAULT_DATA_DIR, MAX_CONCURRENCY};
use crate::downloader::{RunConfig, RunCoordinator, RunError, RunReport};
use crate::fetcher::api_config::{
    ApiConfig, API_KEY_ENV, API_URL_ENV, DEFAULT_API_KEY, DEFAULT_API_URL,
};
use crate::shutdown::SharedShutdown;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{error, info};

use super::CliError;

/// Parse and validate concurrency value
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Rover Photo Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "rover-photo-downloader")]
#[command(about = "Download every image a Mars rover took on a given Earth date", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Earth date to download, YYYY-M-D (e.g. 2012-08-03)
    pub date: Option<String>,

    /// Base directory; images are saved under <DATA_DIR>/<DATE>/
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Photos API endpoint
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Photos API key
    #[arg(long, env = API_KEY_ENV, default_value = DEFAULT_API_KEY, hide_env_values = true)]
    pub api_key: String,

    /// Maximum simultaneous image downloads (default: one per image, uncapped)
    ///
    /// Every discovered image normally gets its own download task. Set a cap
    /// when the destination or the image host cannot keep up.
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Output format (json or human)
    #[arg(long, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

impl Cli {
    /// Run configuration built from the parsed flags
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(
            self.data_dir.clone(),
            ApiConfig::new(self.api_url.clone(), self.api_key.clone()),
        )
        .with_max_concurrent_downloads(self.concurrency)
    }

    /// Execute one download run and print its outcome
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<RunReport, CliError> {
        let coordinator = RunCoordinator::new(self.run_config()).with_shutdown(shutdown);

        info!(
            "Starting download for {}",
            self.date.as_deref().unwrap_or("<no date>")
        );

        let result = coordinator.run(self.date.as_deref()).await;

        match self.output_format {
            OutputFormat::Json => println!("{}", render_json(self.date.as_deref(), &result)),
            OutputFormat::Human => output_human(&result),
        }

        result.map_err(CliError::from)
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Render a run outcome as a single JSON object
pub fn render_json(date: Option<&str>, result: &Result<RunReport, RunError>) -> String {
    let output = match result {
        Ok(report) => serde_json::json!({
            "success": true,
            "date": report.date.to_string(),
            "directory": report.directory.display().to_string(),
            "images_discovered": report.discovered,
            "images_downloaded": report.downloaded,
            "images_failed": 0,
            "bytes_written": report.bytes_written,
            "failures": [],
            "error": null,
        }),
        Err(e) => {
            let failures: Vec<_> = e
                .failures()
                .map(|failures| {
                    failures
                        .iter()
                        .map(|f| {
                            serde_json::json!({
                                "reference": f.reference,
                                "error": f.cause.to_string(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            serde_json::json!({
                "success": false,
                "date": date,
                "images_discovered": e.discovered(),
                "images_downloaded": e.downloaded(),
                "images_failed": failures.len(),
                "failures": failures,
                "error": e.to_string(),
            })
        }
    };

    output.to_string()
}

/// Print a run outcome in human-readable form
fn output_human(result: &Result<RunReport, RunError>) {
    match result {
        Ok(report) => {
            println!("\nRequest was successful, {} images downloaded", report.downloaded);
            println!("Date: {}", report.date);
            println!("Output: {}", report.directory.display());
        }
        Err(RunError::Downloads {
            discovered,
            downloaded,
            failures,
        }) => {
            eprintln!("\nDownload failed!");
            eprintln!(
                "Discovered: {discovered}, downloaded: {downloaded}, failed: {}",
                failures.len()
            );
            for failure in failures {
                eprintln!("  - {failure}");
            }
            error!("Download failed: {} image(s) could not be saved", failures.len());
        }
        Err(e) => {
            eprintln!("\nDownload failed!");
            eprintln!("Error: {e}");
        }
    }
}
