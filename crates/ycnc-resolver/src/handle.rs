//! Channel handles (`@name`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A channel handle such as `@example`.
///
/// Always starts with `@` followed by at least one character and carries no
/// surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Parse a handle from displayed author text.
    ///
    /// Returns `None` if the trimmed text is not handle-shaped, which is the
    /// normal case for authors that already show a display name.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.len() > 1 && trimmed.starts_with('@') && !trimmed.contains(char::is_whitespace)
        {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// Extract the handle from a channel owner link (`/@name` or a full URL
    /// ending in `/@name`).
    pub fn from_owner_href(href: &str) -> Option<Self> {
        let path = href.trim().trim_end_matches('/');
        let segment = path.rsplit('/').next()?;
        Self::parse(segment)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = InvalidHandle;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(InvalidHandle(value))
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl std::str::FromStr for Handle {
    type Err = InvalidHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidHandle(s.to_string()))
    }
}

/// Text that is not a valid handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid handle '{0}': handles start with '@'")]
pub struct InvalidHandle(pub String);
