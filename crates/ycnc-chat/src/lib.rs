//! Live chat side of ycnc.
//!
//! [`ChatConverter`] takes chat entries from a page observer, checks the
//! channel allow-list and swaps `@handle` author names for channel names
//! once the [`Resolver`](ycnc_resolver::Resolver) has them. Settings reach
//! it as [`BridgeMessage`]s.

mod bridge;
mod converter;
mod identity;
mod node;

pub use bridge::{BridgeMessage, Command, Dispatched, dispatch, listen};
pub use converter::ChatConverter;
pub use identity::{ChannelIdentity, CurrentChannel};
pub use node::{AuthorLabel, AuthorNode, ChatItem, ChatNode, MessageKind, apply_resolved_name};
