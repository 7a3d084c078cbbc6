use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Output format for the final surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Bordered terminal block.
    Block,
}

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "labeeb",
    version,
    about = "Preload chat images off-screen and swap them in without flicker",
    long_about = None
)]
pub struct CliArgs {
    /// Image sources: the first is shown at once, the rest are requested in order.
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Alternative text for the image.
    #[arg(long, default_value = "")]
    pub alt: String,

    /// Passthrough display attribute, as key=value. Repeatable.
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,

    /// Milliseconds between successive source requests.
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: u64,

    /// Seconds to wait for outstanding preloads before printing the result.
    #[arg(long, default_value_t = 10)]
    pub settle_secs: u64,

    /// How to print the final surface.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Configuration file path. Must exist when given.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Image request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("attribute name must not be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}
