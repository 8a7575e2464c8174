//! Channel allow-list policy.
//!
//! Decides whether name conversion may run on the current page at all.

use crate::handle::Handle;

/// Allow-list state as delivered by the configuration feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowList {
    /// No configuration has arrived yet. Nothing is allowed.
    #[default]
    Unloaded,
    /// Configuration arrived. Empty means every channel.
    Loaded(Vec<Handle>),
}

impl AllowList {
    /// Allow-list from a configured sequence of handles.
    pub fn loaded(handles: impl IntoIterator<Item = Handle>) -> Self {
        Self::Loaded(handles.into_iter().collect())
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Configured handles, or `None` before configuration arrives.
    pub fn handles(&self) -> Option<&[Handle]> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(handles) => Some(handles),
        }
    }

    /// See [`is_allowed`].
    pub fn allows(&self, current: Option<&Handle>) -> bool {
        is_allowed(current, self.handles())
    }

    /// Like [`allows`](Self::allows), but only asks `current` for the
    /// channel when a non-empty list makes the answer depend on it.
    pub fn allows_with(&self, current: impl FnOnce() -> Option<Handle>) -> bool {
        match self.handles() {
            Some(list) if !list.is_empty() => is_allowed(current().as_ref(), Some(list)),
            other => is_allowed(None, other),
        }
    }
}

/// Whether conversion is allowed for the channel `current`.
///
/// - `allow_list` unset: `false`, so nothing happens before configuration
///   arrives
/// - `allow_list` empty: `true` for every channel
/// - otherwise: `true` only when `current` is known and listed
pub fn is_allowed(current: Option<&Handle>, allow_list: Option<&[Handle]>) -> bool {
    match allow_list {
        None => false,
        Some([]) => true,
        Some(list) => current.is_some_and(|handle| list.contains(handle)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Handle {
        Handle::parse(s).unwrap()
    }

    #[test]
    fn test_unloaded_denies_everything() {
        assert!(!is_allowed(Some(&h("@a")), None));
        assert!(!is_allowed(None, None));
        assert!(!AllowList::Unloaded.allows(Some(&h("@a"))));
    }

    #[test]
    fn test_empty_allows_everything() {
        assert!(is_allowed(Some(&h("@a")), Some(&[])));
        assert!(is_allowed(None, Some(&[])));
    }

    #[test]
    fn test_membership() {
        let list = AllowList::loaded([h("@a")]);
        assert!(list.allows(Some(&h("@a"))));
        assert!(!list.allows(Some(&h("@b"))));
        assert!(!list.allows(None));
    }

    #[test]
    fn test_allows_with_asks_only_when_needed() {
        let never = || -> Option<Handle> { panic!("channel lookup not expected") };
        assert!(!AllowList::Unloaded.allows_with(never));
        assert!(AllowList::loaded([]).allows_with(never));

        let list = AllowList::loaded([h("@a")]);
        assert!(list.allows_with(|| Some(h("@a"))));
        assert!(!list.allows_with(|| Some(h("@b"))));
        assert!(!list.allows_with(|| None));
    }

    #[test]
    fn test_default_is_unloaded() {
        let list = AllowList::default();
        assert!(!list.is_loaded());
        assert!(list.handles().is_none());
    }
}
