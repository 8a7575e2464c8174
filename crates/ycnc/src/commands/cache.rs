//! Cache command - persistent name cache maintenance.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use console::{Style, style};
use serde::Serialize;
use ycnc_cache::{CacheEntry, PersistentCache};

use super::Context;

/// Arguments for the cache command.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Remove expired names
    Sweep,

    /// Remove every cached name
    Clear,

    /// Show the cached name for a handle
    Show {
        /// Channel handle
        handle: String,
    },

    /// List all cached names
    List,
}

#[derive(Debug, Serialize)]
struct EntryView {
    handle: String,
    name: String,
    updated: String,
    expired: bool,
}

impl EntryView {
    fn new(cache: &PersistentCache, entry: CacheEntry, now: i64) -> Self {
        let expired = cache.is_expired(&entry, now);
        let updated = DateTime::<Utc>::from_timestamp_millis(entry.timestamp)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| entry.timestamp.to_string());
        Self {
            handle: entry.handle,
            name: entry.name,
            updated,
            expired,
        }
    }
}

/// Run the cache command.
pub async fn run(args: CacheArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.open_cache()?;
    match args.command {
        CacheCommand::Sweep => report_count(ctx, cache.sweep_expired(), "expired"),
        CacheCommand::Clear => report_count(ctx, cache.clear(), "cached"),
        CacheCommand::Show { handle } => cmd_show(&cache, handle.trim(), ctx),
        CacheCommand::List => cmd_list(&cache, ctx),
    }
}

fn report_count(ctx: &Context, count: usize, what: &str) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::json!({ "removed": count }));
    } else {
        println!("Removed {} {} name(s)", style(count).cyan(), what);
    }
    Ok(())
}

fn cmd_show(cache: &PersistentCache, handle: &str, ctx: &Context) -> Result<()> {
    let now = cache.now();
    let entry = cache.get(handle).map(|e| EntryView::new(cache, e, now));

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }
    match entry {
        Some(view) => print_entry(&view),
        None => println!("{}", Style::new().dim().apply_to(format!("{handle}: not cached"))),
    }
    Ok(())
}

fn cmd_list(cache: &PersistentCache, ctx: &Context) -> Result<()> {
    let now = cache.now();
    let mut entries: Vec<EntryView> = cache
        .entries()
        .into_iter()
        .map(|e| EntryView::new(cache, e, now))
        .collect();
    entries.sort_by(|a, b| a.handle.cmp(&b.handle));

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("{}", Style::new().dim().apply_to("Cache is empty"));
        return Ok(());
    }
    for view in &entries {
        print_entry(view);
    }
    Ok(())
}

fn print_entry(view: &EntryView) {
    let dim = Style::new().dim();
    let status = if view.expired { " (expired)" } else { "" };
    println!(
        "{}  {}  {}",
        style(&view.handle).cyan(),
        view.name,
        dim.apply_to(format!("{}{}", view.updated, status))
    );
}
