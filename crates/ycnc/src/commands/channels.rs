//! Channels command - allow-list management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use ycnc_config::{YcncConfig, read_config_file, write_config_file};

use super::Context;

/// Arguments for the channels command.
#[derive(Args, Debug)]
pub struct ChannelsArgs {
    #[command(subcommand)]
    pub command: ChannelsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ChannelsCommand {
    /// List channels where conversion runs
    List,

    /// Allow conversion on a channel
    Add {
        /// Channel handle (e.g. @example)
        handle: String,
    },

    /// Stop converting on a channel
    Remove {
        /// Channel handle
        handle: String,
    },
}

/// Run the channels command.
pub async fn run(args: ChannelsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ChannelsCommand::List => cmd_list(ctx),
        ChannelsCommand::Add { handle } => cmd_add(&handle, ctx),
        ChannelsCommand::Remove { handle } => cmd_remove(&handle, ctx),
    }
}

fn cmd_list(ctx: &Context) -> Result<()> {
    let channels = ctx.config().allowed_channels();
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(channels)?);
        return Ok(());
    }
    if channels.is_empty() {
        println!(
            "{}",
            Style::new()
                .dim()
                .apply_to("No channels listed (enabled on every channel)")
        );
        return Ok(());
    }
    for channel in channels {
        println!("{}", style(channel).cyan());
    }
    Ok(())
}

/// Edits go to the user config file only, so project-local layers are never
/// copied into it.
fn load_user_config(ctx: &Context) -> Result<(YcncConfig, std::path::PathBuf)> {
    let path = ctx.user_config_path()?;
    let config = read_config_file(&path)?.unwrap_or_default();
    Ok((config, path))
}

fn cmd_add(handle: &str, ctx: &Context) -> Result<()> {
    let (mut config, path) = load_user_config(ctx)?;
    let added = config.add_channel(handle)?;
    write_config_file(&config, &path)?;
    println!("Added {}", style(&added).cyan());
    Ok(())
}

fn cmd_remove(handle: &str, ctx: &Context) -> Result<()> {
    let (mut config, path) = load_user_config(ctx)?;
    if !config.remove_channel(handle) {
        anyhow::bail!("channel '{}' is not listed", handle.trim());
    }
    write_config_file(&config, &path)?;
    println!("Removed {}", style(handle.trim()).cyan());
    Ok(())
}
