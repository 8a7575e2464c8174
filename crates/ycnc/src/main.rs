//! ycnc - YouTube live chat channel names
//!
//! Main entry point for the ycnc CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

mod commands;

use commands::{cache, channels, config, resolve, rewrite};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// ycnc - show YouTube live chat channel names instead of @handles
#[derive(Parser)]
#[command(name = "ycnc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config directory (default: platform config dir)
    #[arg(long, global = true, env = "YCNC_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve handles to channel names
    Resolve(resolve::ResolveArgs),

    /// Rewrite chat entries read as JSON lines from stdin
    Rewrite(rewrite::RewriteArgs),

    /// Persistent name cache maintenance
    Cache(cache::CacheArgs),

    /// Channel allow-list management
    Channels(channels::ChannelsArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = ycnc_config::load_config_with_options(None, cli.config_dir.as_deref())?;
    let config_dir = cli
        .config_dir
        .clone()
        .or_else(ycnc_config::user_config_dir);

    // Console (human-readable, stderr) + optional rotating JSON file
    let filter = if cli.verbose {
        "ycnc=debug,ycnc_chat=debug,ycnc_resolver=debug,ycnc_cache=debug,warn"
    } else {
        "ycnc=info,ycnc_chat=info,ycnc_resolver=info,ycnc_cache=info,warn"
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| filter.to_string());

    let logging = loaded.config.logging();
    let (file_layer, _guard) = if logging.file {
        let log_dir = logging
            .dir
            .clone()
            .or_else(|| config_dir.as_ref().map(|d| d.join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "ycnc.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (Some(non_blocking), Some(guard))
    } else {
        (None, None)
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "ycnc=trace,ycnc_chat=trace,ycnc_resolver=trace,ycnc_cache=trace,info",
                ))
        }))
        .init();

    for warning in &loaded.warnings {
        warn!("{warning}");
    }

    let ctx = commands::Context {
        loaded,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Resolve(args) => resolve::run(args, &ctx).await,
        Commands::Rewrite(args) => rewrite::run(args, &ctx).await,
        Commands::Cache(args) => cache::run(args, &ctx).await,
        Commands::Channels(args) => channels::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
