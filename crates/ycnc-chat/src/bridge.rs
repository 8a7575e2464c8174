//! Messages from the settings side to the converter.
//!
//! Two kinds travel over the bridge: a configuration update carrying the
//! allow-list, and a named command. The transport is whatever delivers a
//! [`BridgeMessage`]; [`listen`] covers the common case of an mpsc channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::converter::ChatConverter;

/// A message delivered over the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    /// New allow-list. Empty means every channel.
    ConfigUpdate {
        #[serde(default)]
        handles: Vec<String>,
    },
    /// A named command, see [`Command`].
    Command { command: String },
}

impl BridgeMessage {
    pub fn config_update(handles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::ConfigUpdate {
            handles: handles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command(command: Command) -> Self {
        Self::Command {
            command: command.name().to_string(),
        }
    }
}

/// Commands the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Empty both cache layers.
    ClearCache,
}

impl Command {
    /// Look a command up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "clearCache" => Some(Self::ClearCache),
            _ => None,
        }
    }

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ClearCache => "clearCache",
        }
    }
}

/// What a dispatched message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The allow-list changed; already displayed messages should be rescanned.
    ConfigApplied,
    /// A command ran.
    CommandExecuted(Command),
    /// Unknown command name, nothing happened.
    Ignored,
}

/// Apply one bridge message to `converter`.
pub fn dispatch(converter: &ChatConverter, message: BridgeMessage) -> Dispatched {
    match message {
        BridgeMessage::ConfigUpdate { handles } => {
            converter.apply_config(handles.as_slice());
            Dispatched::ConfigApplied
        }
        BridgeMessage::Command { command } => match Command::from_name(&command) {
            Some(cmd) => {
                converter.execute_command(cmd);
                Dispatched::CommandExecuted(cmd)
            }
            None => {
                debug!(command = %command, "Ignoring unknown bridge command");
                Dispatched::Ignored
            }
        },
    }
}

/// Feed every message from `rx` to `converter` until the sender side closes.
pub async fn listen(converter: Arc<ChatConverter>, mut rx: mpsc::Receiver<BridgeMessage>) {
    while let Some(message) = rx.recv().await {
        dispatch(&converter, message);
    }
    info!("Bridge closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let update: BridgeMessage =
            serde_json::from_str(r#"{"type":"config_update","handles":["@a","@b"]}"#).unwrap();
        assert_eq!(update, BridgeMessage::config_update(["@a", "@b"]));

        let bare: BridgeMessage = serde_json::from_str(r#"{"type":"config_update"}"#).unwrap();
        assert_eq!(bare, BridgeMessage::ConfigUpdate { handles: vec![] });

        let json = serde_json::to_value(BridgeMessage::command(Command::ClearCache)).unwrap();
        assert_eq!(json["type"], "command");
        assert_eq!(json["command"], "clearCache");
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::from_name("clearCache"), Some(Command::ClearCache));
        assert_eq!(Command::from_name("ClearCache"), None);
        assert_eq!(Command::ClearCache.name(), "clearCache");
    }
}
