//! Resolve command - look up channel names for handles.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use tracing::debug;
use ycnc_resolver::Handle;

use super::Context;

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Channel handles (e.g. @example)
    #[arg(required = true)]
    pub handles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Resolved {
    handle: String,
    name: Option<String>,
}

/// Run the resolve command.
pub async fn run(args: ResolveArgs, ctx: &Context) -> Result<()> {
    let mut handles = Vec::with_capacity(args.handles.len());
    for raw in &args.handles {
        match Handle::parse(raw) {
            Some(handle) => handles.push(handle),
            None => bail!("invalid handle '{raw}': handles start with '@'"),
        }
    }

    let resolver = ctx.build_resolver()?;
    let removed = resolver.sweep_expired();
    if removed > 0 {
        debug!(removed, "Expired cache entries removed");
    }
    let names = futures::future::join_all(handles.iter().map(|h| resolver.resolve(h))).await;

    let results: Vec<Resolved> = handles
        .iter()
        .zip(names)
        .map(|(handle, name)| Resolved {
            handle: handle.to_string(),
            name,
        })
        .collect();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    for result in &results {
        match &result.name {
            Some(name) => println!("{}  {}", style(&result.handle).cyan(), name),
            None => println!(
                "{}  {}",
                style(&result.handle).cyan(),
                dim.apply_to("(not found)")
            ),
        }
    }
    if ctx.verbose {
        let stats = resolver.stats();
        eprintln!(
            "{}",
            dim.apply_to(format!("{} name(s) in session cache", stats.cached))
        );
    }
    Ok(())
}
