//! Rewrite command - convert chat entries streamed as JSON lines.
//!
//! Each stdin line is one of:
//! - a chat entry: `{"author": "@handle", "tag": "...", ...}` (other fields
//!   are passed through)
//! - a bridge message: `{"type": "config_update", "handles": [...]}` or
//!   `{"type": "command", "command": "clearCache"}`
//!
//! Chat entries are written to stdout in input order, with `author` replaced
//! by the channel name and `author_handle` holding the original handle.
//! Bridge messages are applied and produce no output.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{FuturesOrdered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};
use ycnc_chat::{
    AuthorNode, BridgeMessage, ChatConverter, ChatItem, ChatNode, CurrentChannel, Dispatched,
    MessageKind, dispatch,
};
use ycnc_resolver::Handle;

use super::Context;

/// Arguments for the rewrite command.
#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Handle of the channel whose chat is being read. Needed when the
    /// allow-list is not empty.
    #[arg(long)]
    pub channel: Option<String>,
}

/// A chat entry line.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatEntry {
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author_handle: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ChatEntry {
    fn kind(&self) -> Option<MessageKind> {
        match &self.tag {
            Some(tag) => MessageKind::from_tag(tag),
            None => Some(MessageKind::Text),
        }
    }
}

enum Line {
    Entry(ChatEntry),
    Bridge(BridgeMessage),
}

fn parse_line(line: &str) -> serde_json::Result<Line> {
    let value: Value = serde_json::from_str(line)?;
    let is_bridge = matches!(
        value.get("type").and_then(Value::as_str),
        Some("config_update" | "command")
    );
    if is_bridge {
        Ok(Line::Bridge(serde_json::from_value(value)?))
    } else {
        Ok(Line::Entry(serde_json::from_value(value)?))
    }
}

/// Run the rewrite command.
pub async fn run(args: RewriteArgs, ctx: &Context) -> Result<()> {
    let identity = match args.channel.as_deref() {
        Some(raw) => match Handle::parse(raw) {
            Some(handle) => CurrentChannel::new(Some(handle)),
            None => anyhow::bail!("invalid channel handle '{raw}': handles start with '@'"),
        },
        None => CurrentChannel::default(),
    };

    let converter = Arc::new(ChatConverter::new(
        ctx.build_resolver()?,
        Arc::new(identity),
    ));
    converter.start();
    converter.apply_config(ctx.config().allowed_channels());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut pending: FuturesOrdered<BoxFuture<'static, ChatEntry>> = FuturesOrdered::new();
    let mut input_open = true;

    while input_open || !pending.is_empty() {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(Line::Bridge(message)) => {
                        if dispatch(&converter, message) == Dispatched::ConfigApplied {
                            debug!("Allow-list updated from input");
                        }
                    }
                    Ok(Line::Entry(entry)) => pending.push_back(submit(&converter, entry)),
                    Err(e) => warn!(error = %e, "Skipping malformed input line"),
                }
            }
            Some(entry) = pending.next() => {
                write_entry(&mut stdout, &entry).await?;
            }
        }
    }
    stdout.flush().await?;
    Ok(())
}

/// Start converting `entry`. The allow-list is checked now, so a later
/// config update does not affect entries read before it.
fn submit(converter: &Arc<ChatConverter>, entry: ChatEntry) -> BoxFuture<'static, ChatEntry> {
    let Some(kind) = entry.kind() else {
        return future::ready(entry).boxed();
    };
    if !converter.is_conversion_allowed() {
        return future::ready(entry).boxed();
    }

    let item = Arc::new(ChatItem::message(kind, entry.author.clone()));
    let node: Arc<dyn ChatNode> = item.clone();
    let converter = Arc::clone(converter);
    let task = tokio::spawn(async move { converter.convert_node(node).await });

    async move {
        let mut entry = entry;
        if matches!(task.await, Ok(n) if n > 0)
            && let Some(author) = item.author()
        {
            entry.author_handle = author.tooltip();
            entry.author = author.text();
        }
        entry
    }
    .boxed()
}

async fn write_entry(stdout: &mut tokio::io::Stdout, entry: &ChatEntry) -> Result<()> {
    let mut line = serde_json::to_vec(entry)?;
    line.push(b'\n');
    stdout.write_all(&line).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_keeps_extra_fields() {
        let Line::Entry(entry) =
            parse_line(r#"{"author":"@a","message":"hi","id":7}"#).unwrap()
        else {
            panic!("expected chat entry");
        };
        assert_eq!(entry.author, "@a");
        assert_eq!(entry.kind(), Some(MessageKind::Text));

        let out = serde_json::to_value(&entry).unwrap();
        assert_eq!(out["message"], "hi");
        assert_eq!(out["id"], 7);
        assert!(out.get("author_handle").is_none());
    }

    #[test]
    fn test_parse_bridge_lines() {
        assert!(matches!(
            parse_line(r#"{"type":"config_update","handles":["@a"]}"#).unwrap(),
            Line::Bridge(BridgeMessage::ConfigUpdate { .. })
        ));
        assert!(matches!(
            parse_line(r#"{"type":"command","command":"clearCache"}"#).unwrap(),
            Line::Bridge(BridgeMessage::Command { .. })
        ));
    }

    #[test]
    fn test_unknown_tag_is_not_a_message() {
        let Line::Entry(entry) =
            parse_line(r#"{"author":"@a","tag":"yt-live-chat-viewer-engagement-message-renderer"}"#)
                .unwrap()
        else {
            panic!("expected chat entry");
        };
        assert_eq!(entry.kind(), None);
    }

    #[test]
    fn test_malformed_line() {
        assert!(parse_line("not json").is_err());
        assert!(parse_line(r#"{"message":"no author"}"#).is_err());
    }
}
