//! Current channel identity.

use parking_lot::RwLock;
use ycnc_resolver::Handle;

/// Tells the converter whose channel the chat belongs to.
///
/// `None` when the owner cannot be determined (popout chat, cross-origin
/// frame, page not loaded yet). An unknown owner never matches a non-empty
/// allow-list.
pub trait ChannelIdentity: Send + Sync {
    fn current_channel(&self) -> Option<Handle>;
}

impl<F> ChannelIdentity for F
where
    F: Fn() -> Option<Handle> + Send + Sync,
{
    fn current_channel(&self) -> Option<Handle> {
        self()
    }
}

/// Identity that can be set from outside, e.g. when the page navigates.
#[derive(Debug, Default)]
pub struct CurrentChannel {
    handle: RwLock<Option<Handle>>,
}

impl CurrentChannel {
    pub fn new(handle: Option<Handle>) -> Self {
        Self {
            handle: RwLock::new(handle),
        }
    }

    /// Identity read from the owner link of the watch page (`/@handle`).
    pub fn from_owner_href(href: &str) -> Self {
        Self::new(Handle::from_owner_href(href))
    }

    pub fn set(&self, handle: Option<Handle>) {
        *self.handle.write() = handle;
    }
}

impl ChannelIdentity for CurrentChannel {
    fn current_channel(&self) -> Option<Handle> {
        self.handle.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_href() {
        let identity = CurrentChannel::from_owner_href("/@streamer");
        assert_eq!(identity.current_channel().unwrap().as_str(), "@streamer");

        identity.set(None);
        assert!(identity.current_channel().is_none());
    }

    #[test]
    fn test_closure_identity() {
        let identity = || Handle::parse("@fixed");
        assert_eq!(identity.current_channel().unwrap().as_str(), "@fixed");
    }
}
