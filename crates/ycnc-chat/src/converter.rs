//! Chat converter: policy check, resolution and rewrite for chat entries.

use std::sync::Arc;

use futures::{Stream, StreamExt, future};
use parking_lot::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use ycnc_resolver::{AllowList, Handle, Resolver};

use crate::bridge::Command;
use crate::identity::ChannelIdentity;
use crate::node::{ChatNode, MessageKind, apply_resolved_name};

/// Rewrites `@handle` author names in chat entries to channel names.
///
/// Nothing is converted until an allow-list has been applied with
/// [`ChatConverter::apply_config`].
pub struct ChatConverter {
    resolver: Resolver,
    allow_list: RwLock<AllowList>,
    identity: Arc<dyn ChannelIdentity>,
}

impl std::fmt::Debug for ChatConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConverter")
            .field("resolver", &self.resolver)
            .field("allow_list", &*self.allow_list.read())
            .finish()
    }
}

impl ChatConverter {
    pub fn new(resolver: Resolver, identity: Arc<dyn ChannelIdentity>) -> Self {
        Self {
            resolver,
            allow_list: RwLock::new(AllowList::Unloaded),
            identity,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Snapshot of the current allow-list.
    pub fn allow_list(&self) -> AllowList {
        self.allow_list.read().clone()
    }

    /// Startup housekeeping: drop expired persisted names.
    pub fn start(&self) -> usize {
        let removed = self.resolver.sweep_expired();
        if removed > 0 {
            info!(removed, "Expired cache entries removed");
        }
        removed
    }

    /// Replace the allow-list. Entries that are not valid handles are skipped.
    pub fn apply_config<S: AsRef<str>>(&self, handles: &[S]) {
        let mut parsed = Vec::with_capacity(handles.len());
        for raw in handles {
            match Handle::parse(raw.as_ref()) {
                Some(handle) => parsed.push(handle),
                None => warn!(handle = raw.as_ref(), "Skipping invalid handle in allow-list"),
            }
        }
        debug!(count = parsed.len(), "Allow-list applied");
        *self.allow_list.write() = AllowList::Loaded(parsed);
    }

    pub fn execute_command(&self, command: Command) {
        match command {
            Command::ClearCache => self.resolver.reset(),
        }
    }

    /// Whether conversion may run for the current channel right now.
    ///
    /// The identity provider is only consulted for a non-empty allow-list.
    pub fn is_conversion_allowed(&self) -> bool {
        self.allow_list
            .read()
            .allows_with(|| self.identity.current_channel())
    }

    /// Handle one node added to the chat list.
    ///
    /// Message nodes are processed directly; any other node is searched for
    /// nested messages. Returns how many author names were rewritten.
    pub async fn process_node(&self, node: Arc<dyn ChatNode>) -> usize {
        if !self.is_conversion_allowed() {
            return 0;
        }
        self.convert_node(node).await
    }

    /// [`process_node`](Self::process_node) without the allow-list check, for
    /// callers that already decided the node is in scope.
    pub async fn convert_node(&self, node: Arc<dyn ChatNode>) -> usize {
        let messages = if MessageKind::from_tag(&node.tag_name()).is_some() {
            vec![node]
        } else {
            node.message_nodes()
        };
        let rewritten =
            future::join_all(messages.iter().map(|m| self.process_message(m.as_ref()))).await;
        rewritten.into_iter().filter(|changed| *changed).count()
    }

    /// Re-apply conversion to messages already on screen, e.g. after the
    /// allow-list arrived.
    pub async fn rescan(&self, nodes: &[Arc<dyn ChatNode>]) -> usize {
        let mut total = 0;
        for node in nodes {
            total += self.process_node(Arc::clone(node)).await;
        }
        total
    }

    /// Consume a stream of added nodes until it ends.
    ///
    /// Each node is processed on its own task so a slow lookup never holds
    /// up later entries. Returns the total number of rewritten names once
    /// the stream ends and every task has finished.
    pub async fn observe<S>(self: &Arc<Self>, nodes: S) -> usize
    where
        S: Stream<Item = Arc<dyn ChatNode>>,
    {
        let mut nodes = std::pin::pin!(nodes);
        let mut tasks = JoinSet::new();
        let mut total = 0;

        while let Some(node) = nodes.next().await {
            let converter = Arc::clone(self);
            tasks.spawn(async move { converter.process_node(node).await });
            while let Some(done) = tasks.try_join_next() {
                total += done.unwrap_or(0);
            }
        }
        while let Some(done) = tasks.join_next().await {
            total += done.unwrap_or(0);
        }
        total
    }

    async fn process_message(&self, node: &dyn ChatNode) -> bool {
        if MessageKind::from_tag(&node.tag_name()).is_none() {
            return false;
        }
        let Some(author) = node.author_node() else {
            return false;
        };
        let Some(handle) = Handle::parse(&author.text()) else {
            return false;
        };

        if let Some(name) = self.resolver.cached_name(&handle) {
            return apply_resolved_name(author.as_ref(), &handle, &name);
        }
        match self.resolver.resolve(&handle).await {
            Some(name) => apply_resolved_name(author.as_ref(), &handle, &name),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ycnc_cache::{CacheConfig, ManualClock, MemoryStore, PersistentCache};
    use ycnc_resolver::{FetchError, Fetcher, ResolverConfig};

    use super::*;
    use crate::identity::CurrentChannel;
    use crate::node::{AuthorNode, ChatItem};

    struct TableFetcher {
        names: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl TableFetcher {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                names: entries
                    .iter()
                    .map(|(h, n)| (h.to_string(), n.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for TableFetcher {
        async fn fetch(&self, handle: &Handle) -> ycnc_resolver::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.names
                .get(handle.as_str())
                .cloned()
                .ok_or_else(|| FetchError::NoTitle(handle.to_string()))
        }
    }

    fn h(s: &str) -> Handle {
        Handle::parse(s).unwrap()
    }

    fn converter(
        fetcher: Arc<TableFetcher>,
        identity: Arc<dyn ChannelIdentity>,
    ) -> (Arc<ChatConverter>, PersistentCache) {
        let persistent = PersistentCache::new(Arc::new(MemoryStore::new()), CacheConfig::default())
            .with_clock(Arc::new(ManualClock::new(1_000)));
        let resolver = Resolver::new(fetcher, persistent.clone(), ResolverConfig::default());
        (Arc::new(ChatConverter::new(resolver, identity)), persistent)
    }

    fn message(author: &str) -> (Arc<ChatItem>, Arc<dyn ChatNode>) {
        let item = Arc::new(ChatItem::message(MessageKind::Text, author));
        let node: Arc<dyn ChatNode> = item.clone();
        (item, node)
    }

    fn author_text(item: &ChatItem) -> String {
        item.author().unwrap().text()
    }

    #[tokio::test]
    async fn test_nothing_happens_before_config() {
        let fetcher = Arc::new(TableFetcher::new(&[("@foo", "Foo")]));
        let (conv, _) = converter(fetcher.clone(), Arc::new(CurrentChannel::default()));
        let (item, node) = message("@foo");

        assert!(!conv.is_conversion_allowed());
        assert_eq!(conv.process_node(node).await, 0);
        assert_eq!(author_text(&item), "@foo");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_allow_list_converts_everywhere() {
        let fetcher = Arc::new(TableFetcher::new(&[("@foo", "Foo Channel")]));
        let (conv, persistent) = converter(fetcher, Arc::new(CurrentChannel::default()));
        conv.apply_config::<&str>(&[]);

        let (item, node) = message("@foo");
        assert_eq!(conv.process_node(node).await, 1);
        assert_eq!(author_text(&item), "Foo Channel");
        assert_eq!(item.author().unwrap().tooltip().as_deref(), Some("@foo"));
        assert_eq!(persistent.lookup("@foo").as_deref(), Some("Foo Channel"));
    }

    #[tokio::test]
    async fn test_allow_list_checks_current_channel() {
        let fetcher = Arc::new(TableFetcher::new(&[("@foo", "Foo")]));
        let identity = Arc::new(CurrentChannel::new(Some(h("@other"))));
        let (conv, _) = converter(fetcher, identity.clone());
        conv.apply_config(&["@streamer", "not-a-handle"]);

        assert_eq!(conv.allow_list(), AllowList::loaded([h("@streamer")]));
        assert!(!conv.is_conversion_allowed());

        identity.set(None);
        assert!(!conv.is_conversion_allowed());

        identity.set(Some(h("@streamer")));
        assert!(conv.is_conversion_allowed());
    }

    #[tokio::test]
    async fn test_non_handle_authors_untouched() {
        let fetcher = Arc::new(TableFetcher::new(&[]));
        let (conv, _) = converter(fetcher.clone(), Arc::new(CurrentChannel::default()));
        conv.apply_config::<&str>(&[]);

        let (item, node) = message("Plain Name");
        assert_eq!(conv.process_node(node).await, 0);
        assert_eq!(author_text(&item), "Plain Name");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unresolved_leaves_handle() {
        let fetcher = Arc::new(TableFetcher::new(&[]));
        let (conv, _) = converter(fetcher, Arc::new(CurrentChannel::default()));
        conv.apply_config::<&str>(&[]);

        let (item, node) = message("@ghost");
        assert_eq!(conv.process_node(node).await, 0);
        assert_eq!(author_text(&item), "@ghost");
    }

    #[tokio::test]
    async fn test_container_and_rescan() {
        let fetcher = Arc::new(TableFetcher::new(&[("@a", "Alpha"), ("@b", "Beta")]));
        let (conv, _) = converter(fetcher.clone(), Arc::new(CurrentChannel::default()));

        let (first, first_node) = message("@a");
        let paid = Arc::new(ChatItem::message(MessageKind::Paid, "@b"));
        let paid_node: Arc<dyn ChatNode> = paid.clone();
        let container: Arc<dyn ChatNode> = Arc::new(ChatItem::container("div", vec![paid_node]));
        let on_screen = vec![first_node, container];

        // Before config: rescan does nothing.
        assert_eq!(conv.rescan(&on_screen).await, 0);

        conv.apply_config::<&str>(&[]);
        assert_eq!(conv.rescan(&on_screen).await, 2);
        assert_eq!(author_text(&first), "Alpha");
        assert_eq!(author_text(&paid), "Beta");

        // Already rewritten entries stay as they are.
        assert_eq!(conv.rescan(&on_screen).await, 0);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_observe_stream() {
        let fetcher = Arc::new(TableFetcher::new(&[("@a", "Alpha")]));
        let (conv, _) = converter(fetcher.clone(), Arc::new(CurrentChannel::default()));
        conv.apply_config::<&str>(&[]);

        let items: Vec<_> = (0..6).map(|_| message("@a")).collect();
        let nodes: Vec<Arc<dyn ChatNode>> = items.iter().map(|(_, n)| Arc::clone(n)).collect();

        let total = conv.observe(futures::stream::iter(nodes)).await;
        assert_eq!(total, 6);
        assert!(items.iter().all(|(item, _)| author_text(item) == "Alpha"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_command() {
        let fetcher = Arc::new(TableFetcher::new(&[("@a", "Alpha")]));
        let (conv, persistent) = converter(fetcher.clone(), Arc::new(CurrentChannel::default()));
        conv.apply_config::<&str>(&[]);

        let (_, node) = message("@a");
        conv.process_node(node).await;
        assert!(persistent.lookup("@a").is_some());

        conv.execute_command(Command::ClearCache);
        assert!(persistent.lookup("@a").is_none());
        assert!(conv.resolver().cached_name(&h("@a")).is_none());

        let (_, node) = message("@a");
        conv.process_node(node).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_bridge_listen() {
        let fetcher = Arc::new(TableFetcher::new(&[]));
        let (conv, _) = converter(fetcher, Arc::new(CurrentChannel::default()));
        let (tx, rx) = tokio::sync::mpsc::channel(4);

        tx.send(crate::bridge::BridgeMessage::config_update(["@x"]))
            .await
            .unwrap();
        tx.send(crate::bridge::BridgeMessage::Command {
            command: "reboot".into(),
        })
        .await
        .unwrap();
        drop(tx);

        crate::bridge::listen(Arc::clone(&conv), rx).await;
        assert_eq!(conv.allow_list(), AllowList::loaded([h("@x")]));
    }
}
