//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// aqua-speed-tools - network speed tests for specific nodes or all nodes
#[derive(Parser, Debug)]
#[command(name = "aqua-speed-tools")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to a config.yaml overriding the user configuration
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Base URL replacing raw.githubusercontent.com (skips mirror probing)
    #[arg(long, global = true, value_parser = parse_http_url)]
    pub github_raw_magic_url: Option<String>,

    /// Base URL replacing api.github.com
    #[arg(long, global = true, value_parser = parse_http_url)]
    pub github_api_magic_url: Option<String>,

    /// DNS-over-HTTPS endpoint
    #[arg(long, global = true, value_parser = parse_https_url)]
    pub doh_endpoint: Option<String>,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all available nodes
    List,

    /// Test the speed of a node, or of every node
    Test(TestArgs),

    /// Update the aqua-speed binary
    Update(UpdateArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Node ID or its number in the `list` table
    pub target: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Only report whether an update is available
    #[arg(long)]
    pub check: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_http_url(value: &str) -> Result<String, String> {
    let url = url::Url::parse(value).map_err(|e| format!("invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme '{}', expected http or https", other)),
    }
}

fn parse_https_url(value: &str) -> Result<String, String> {
    let url = url::Url::parse(value).map_err(|e| format!("invalid URL: {}", e))?;
    if url.scheme() != "https" {
        return Err("DoH endpoint must use https".to_string());
    }
    Ok(value.to_string())
}
