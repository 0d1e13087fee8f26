//! aqua-speed-tools - network speed tests against curated nodes
//!
//! Keeps the aqua-speed binary up to date, loads the node catalogue and
//! runs speed tests through the binary.

mod app;
mod cli;
mod commands;
mod output;
mod services;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet, cli.debug);

    // Commands that never touch the network
    if let Some(Commands::Version(args)) = &cli.command {
        return commands::version::run(args, &cli);
    }

    let app = App::bootstrap(&cli).await?;

    match cli.command {
        Some(Commands::Update(args)) => commands::update::run(args, &app).await,
        Some(Commands::List) => {
            app.ensure_binary().await?;
            let nodes = app.load_nodes().await?;
            commands::list::run(&nodes, &app.config)
        }
        Some(Commands::Test(args)) => {
            let binary = app.ensure_binary().await?;
            let nodes = app.load_nodes().await?;
            commands::test::run(args, &nodes, &binary)
        }
        Some(Commands::Version(_)) => Ok(()),
        None => {
            let binary = app.ensure_binary().await?;
            let nodes = app.load_nodes().await?;
            commands::interactive::run(&nodes, &binary, &app.config)
        }
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool, debug: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match (verbose, debug) {
            (0, false) => EnvFilter::new("info"),
            (0, true) | (1, _) => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
