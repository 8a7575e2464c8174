//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration and where it came from
    Show,

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;
    let dim = Style::new().dim();

    if ctx.json_output {
        let sources: Vec<String> = loaded
            .loaded_from()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let out = serde_json::json!({
            "sources": sources,
            "warnings": loaded.warnings,
            "allowed_channels": loaded.config.allowed_channels(),
            "max_concurrent_requests": loaded.config.resolver_config().max_concurrent_requests,
            "cache_path": loaded.config.cache_path().map(|p| p.display().to_string()),
            "base_url": loaded.config.fetch_config().base_url,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", style("ycnc configuration").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    for warning in &loaded.warnings {
        println!("{} {}", Style::new().yellow().apply_to("Warning:"), warning);
    }

    let config = &loaded.config;
    let fetch = config.fetch_config();
    let cache = config.cache_config();
    println!("  Base URL:       {}", style(&fetch.base_url).cyan());
    println!(
        "  Timeout:        {}",
        style(
            fetch
                .timeout
                .map(|t| format!("{}s", t.as_secs()))
                .unwrap_or_else(|| "none".to_string())
        )
        .cyan()
    );
    println!(
        "  Concurrency:    {}",
        style(config.resolver_config().max_concurrent_requests).cyan()
    );
    println!(
        "  Cache:          {}",
        style(
            config
                .cache_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string())
        )
        .cyan()
    );
    println!(
        "  Cache TTL:      {} day(s)",
        style(cache.ttl.as_secs() / 86_400).cyan()
    );
    println!("  Key prefix:     {}", style(&cache.key_prefix).cyan());

    let channels = config.allowed_channels();
    if channels.is_empty() {
        println!("  Channels:       {}", dim.apply_to("all"));
    } else {
        println!("  Channels:       {}", style(channels.join(", ")).cyan());
    }

    if ctx.verbose {
        println!();
        println!("{}", dim.apply_to(config.to_toml()?));
    }
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = ctx.user_config_path()?;
    if ctx.json_output {
        println!("{}", serde_json::json!({ "path": path.display().to_string() }));
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
