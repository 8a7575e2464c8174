//! Chat node contracts and the author rewrite guard.
//!
//! The page observer owns the real nodes; this crate only sees them through
//! [`ChatNode`] and [`AuthorNode`].

use std::sync::Arc;

use parking_lot::Mutex;
use ycnc_resolver::Handle;

/// Kinds of chat entries whose author names get rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Plain text message.
    Text,
    /// Paid message (Super Chat).
    Paid,
    /// Membership join / milestone item.
    Membership,
}

impl MessageKind {
    pub const TEXT_TAG: &'static str = "yt-live-chat-text-message-renderer";
    pub const PAID_TAG: &'static str = "yt-live-chat-paid-message-renderer";
    pub const MEMBERSHIP_TAG: &'static str = "yt-live-chat-membership-item-renderer";

    /// Classify an element by tag name, ignoring case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case(Self::TEXT_TAG) {
            Some(Self::Text)
        } else if tag.eq_ignore_ascii_case(Self::PAID_TAG) {
            Some(Self::Paid)
        } else if tag.eq_ignore_ascii_case(Self::MEMBERSHIP_TAG) {
            Some(Self::Membership)
        } else {
            None
        }
    }

    /// Canonical lowercase tag name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => Self::TEXT_TAG,
            Self::Paid => Self::PAID_TAG,
            Self::Membership => Self::MEMBERSHIP_TAG,
        }
    }
}

/// The element that displays a message's author name.
pub trait AuthorNode: Send + Sync {
    /// Current displayed text.
    fn text(&self) -> String;
    /// Replace the displayed text.
    fn set_text(&self, text: &str);
    /// Set the hover tooltip.
    fn set_tooltip(&self, tooltip: &str);
}

/// An element added to the chat list.
pub trait ChatNode: Send + Sync {
    fn tag_name(&self) -> String;

    /// Author name element, if this node has one.
    fn author_node(&self) -> Option<Arc<dyn AuthorNode>>;

    /// Message entries nested inside this node, for nodes that arrive as a
    /// container rather than as a message.
    fn message_nodes(&self) -> Vec<Arc<dyn ChatNode>> {
        Vec::new()
    }
}

/// Show `name` in place of `handle` on `node`.
///
/// Only acts while the node still displays exactly `handle` (trimmed); a node
/// that was already rewritten or reused for another author is left alone.
/// The handle is kept as the tooltip. Returns whether the node changed.
pub fn apply_resolved_name(node: &dyn AuthorNode, handle: &Handle, name: &str) -> bool {
    if name.is_empty() || name == handle.as_str() {
        return false;
    }
    if node.text().trim() != handle.as_str() {
        return false;
    }
    node.set_text(name);
    node.set_tooltip(handle.as_str());
    true
}

/// Author element held in memory.
#[derive(Debug, Default)]
pub struct AuthorLabel {
    text: Mutex<String>,
    tooltip: Mutex<Option<String>>,
}

impl AuthorLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(text.into()),
            tooltip: Mutex::new(None),
        }
    }

    pub fn tooltip(&self) -> Option<String> {
        self.tooltip.lock().clone()
    }
}

impl AuthorNode for AuthorLabel {
    fn text(&self) -> String {
        self.text.lock().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }

    fn set_tooltip(&self, tooltip: &str) {
        *self.tooltip.lock() = Some(tooltip.to_string());
    }
}

/// Chat element held in memory: a tag, an optional author and children.
#[derive(Default)]
pub struct ChatItem {
    tag: String,
    author: Option<Arc<AuthorLabel>>,
    children: Vec<Arc<dyn ChatNode>>,
}

impl std::fmt::Debug for ChatItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatItem")
            .field("tag", &self.tag)
            .field("author", &self.author)
            .field("children", &self.children.len())
            .finish()
    }
}

impl ChatItem {
    /// A message entry of `kind` authored by `author`.
    pub fn message(kind: MessageKind, author: impl Into<String>) -> Self {
        Self {
            tag: kind.tag().to_string(),
            author: Some(Arc::new(AuthorLabel::new(author))),
            children: Vec::new(),
        }
    }

    /// A container element wrapping other nodes.
    pub fn container(tag: impl Into<String>, children: Vec<Arc<dyn ChatNode>>) -> Self {
        Self {
            tag: tag.into(),
            author: None,
            children,
        }
    }

    pub fn author(&self) -> Option<&Arc<AuthorLabel>> {
        self.author.as_ref()
    }
}

impl ChatNode for ChatItem {
    fn tag_name(&self) -> String {
        self.tag.clone()
    }

    fn author_node(&self) -> Option<Arc<dyn AuthorNode>> {
        self.author
            .as_ref()
            .map(|a| Arc::clone(a) as Arc<dyn AuthorNode>)
    }

    fn message_nodes(&self) -> Vec<Arc<dyn ChatNode>> {
        let mut found = Vec::new();
        for child in &self.children {
            if MessageKind::from_tag(&child.tag_name()).is_some() {
                found.push(Arc::clone(child));
            } else {
                found.extend(child.message_nodes());
            }
        }
        found
    }
}
