//! Multiplexed search across content providers

use crate::cache::ItemCache;
use crate::providers::{ContentItem, Provider, ProviderRegistry, SearchContext, SearchKind};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Query every provider concurrently and merge what arrives before `timeout`.
///
/// One task is spawned per provider. A provider whose list has not arrived
/// by the deadline contributes nothing; its task is left to finish into a
/// channel nobody reads. The merged list interleaves providers in the order
/// they were given.
pub async fn aggregate_search(
    query: &str,
    providers: &[Arc<dyn Provider>],
    timeout: Duration,
    ctx: &SearchContext,
) -> Vec<ContentItem> {
    if providers.is_empty() {
        return Vec::new();
    }

    let expected = providers.len();
    let (tx, mut rx) = mpsc::channel::<(usize, Vec<ContentItem>)>(expected);

    for (index, provider) in providers.iter().enumerate() {
        let provider = provider.clone();
        let tx = tx.clone();
        let query = query.to_string();
        let ctx = ctx.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            let items = provider.search(&query, &ctx).await;
            debug!(
                "Provider {} returned {} items in {:?}",
                provider.name(),
                items.len(),
                start.elapsed()
            );

            // Channel is sized to the provider count; only a closed window fails
            if tx.try_send((index, items)).is_err() {
                debug!("Search window closed, dropping {} results", provider.name());
            }
        });
    }
    drop(tx);

    let mut lists: Vec<Option<Vec<ContentItem>>> = (0..expected).map(|_| None).collect();
    let mut received = 0;

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    while received < expected {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some((index, items)) => {
                    lists[index] = Some(items);
                    received += 1;
                }
                None => break,
            },
            _ = &mut deadline => {
                debug!("Search timed out with {} of {} providers", received, expected);
                break;
            }
        }
    }

    interleave(lists.into_iter().flatten().collect())
}

/// Round-robin merge: the first element of every list, then the second, ...
///
/// No de-duplication across lists.
pub fn interleave<T>(lists: Vec<Vec<T>>) -> Vec<T> {
    let total = lists.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    let mut iters: Vec<_> = lists.into_iter().map(Vec::into_iter).collect();

    while merged.len() < total {
        for iter in iters.iter_mut() {
            if let Some(item) = iter.next() {
                merged.push(item);
            }
        }
    }

    merged
}

/// Search executor over the registered providers
pub struct Search {
    /// Provider registry
    registry: Arc<ProviderRegistry>,
    /// Where returned items are kept for later lookup
    cache: ItemCache,
    /// Aggregation window
    timeout: Duration,
}

impl Search {
    /// Create a new search executor
    pub fn new(registry: Arc<ProviderRegistry>, cache: ItemCache) -> Self {
        Self {
            registry,
            cache,
            timeout: Duration::from_millis(15000),
        }
    }

    /// Set the aggregation window
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a search of `kind` and cache every returned item
    pub async fn search(&self, kind: SearchKind, query: &str, ctx: &SearchContext) -> Vec<ContentItem> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let providers = self.registry.for_kind(kind);
        info!(
            "Executing {:?} search '{}' on {} providers",
            kind,
            query,
            providers.len()
        );

        let items = aggregate_search(query, &providers, self.timeout, ctx).await;
        self.cache.insert_all(&items).await;
        debug!("Item cache holds about {} items", self.cache.size());

        items
    }

    /// Look up an item returned by an earlier search
    pub async fn item(&self, id: &str) -> Option<ContentItem> {
        self.cache.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MediaKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns fixed item texts after a delay
    struct FakeProvider {
        name: &'static str,
        media: MediaKind,
        delay: Duration,
        texts: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, delay_ms: u64, texts: &[&'static str]) -> Arc<Self> {
            Self::with_media(name, MediaKind::Video, delay_ms, texts)
        }

        fn with_media(
            name: &'static str,
            media: MediaKind,
            delay_ms: u64,
            texts: &[&'static str],
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                media,
                delay: Duration::from_millis(delay_ms),
                texts: texts.to_vec(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn media(&self) -> MediaKind {
            self.media
        }

        async fn search(&self, _query: &str, ctx: &SearchContext) -> Vec<ContentItem> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.texts
                .iter()
                .map(|t| ContentItem::new(t, ctx, *t, format!("http://x/{}", t), self.media))
                .collect()
        }
    }

    fn texts(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    #[test]
    fn test_interleave() {
        let merged = interleave(vec![vec!["a1", "a2", "a3"], vec!["b1"], vec![]]);
        assert_eq!(merged, vec!["a1", "b1", "a2", "a3"]);

        let merged = interleave(vec![vec![1], vec![2, 3, 4], vec![5, 6]]);
        assert_eq!(merged, vec![1, 2, 5, 3, 6, 4]);

        assert!(interleave::<u8>(vec![]).is_empty());
    }

    #[tokio::test]
    async fn test_merge_fairness() {
        let providers: Vec<Arc<dyn Provider>> = vec![
            FakeProvider::new("a", 30, &["a1", "a2", "a3"]),
            FakeProvider::new("b", 5, &["b1"]),
            FakeProvider::new("c", 10, &[]),
        ];

        let items = aggregate_search(
            "q",
            &providers,
            Duration::from_secs(2),
            &SearchContext::new("p1"),
        )
        .await;

        assert_eq!(texts(&items), vec!["a1", "b1", "a2", "a3"]);
        assert!(items.iter().all(|i| i.pid == "p1"));
    }

    #[tokio::test]
    async fn test_hanging_provider_contributes_nothing() {
        let providers: Vec<Arc<dyn Provider>> = vec![
            FakeProvider::new("a", 10, &["a1", "a2"]),
            FakeProvider::new("stuck", 60_000, &["s1", "s2"]),
            FakeProvider::new("c", 20, &["c1", "c2"]),
        ];

        let start = std::time::Instant::now();
        let items = aggregate_search(
            "q",
            &providers,
            Duration::from_millis(150),
            &SearchContext::default(),
        )
        .await;

        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(texts(&items), vec!["a1", "c1", "a2", "c2"]);
    }

    #[tokio::test]
    async fn test_late_provider_task_finishes() {
        let late = FakeProvider::new("late", 100, &["l1", "l2"]);
        let providers: Vec<Arc<dyn Provider>> = vec![
            FakeProvider::new("a", 5, &["a1"]),
            late.clone(),
        ];

        let items = aggregate_search(
            "q",
            &providers,
            Duration::from_millis(30),
            &SearchContext::default(),
        )
        .await;
        drop(providers);

        assert_eq!(texts(&items), vec!["a1"]);

        // The late list is dropped on the closed channel and its task ends
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(late.calls.load(Ordering::SeqCst), 1);
        assert_eq!(Arc::strong_count(&late), 1);
    }

    #[tokio::test]
    async fn test_no_providers_returns_immediately() {
        let start = std::time::Instant::now();
        let items = aggregate_search("q", &[], Duration::from_secs(10), &SearchContext::default()).await;

        assert!(items.is_empty());
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_search_filters_kind_and_caches() {
        let video = FakeProvider::with_media("tube", MediaKind::Video, 5, &["v1"]);
        let event = FakeProvider::with_media("gigs", MediaKind::Event, 5, &["e1"]);

        let mut registry = ProviderRegistry::new();
        registry.register(video.clone());
        registry.register(event.clone());

        let search = Search::new(Arc::new(registry), ItemCache::new(60, 100))
            .with_timeout(Duration::from_secs(1));

        let items = search
            .search(SearchKind::Event, "jazz", &SearchContext::default())
            .await;

        assert_eq!(texts(&items), vec!["e1"]);
        assert_eq!(video.calls.load(Ordering::SeqCst), 0);
        assert_eq!(search.item(&items[0].id).await, Some(items[0].clone()));
    }

    #[tokio::test]
    async fn test_blank_query_skips_providers() {
        let video = FakeProvider::new("tube", 5, &["v1"]);
        let mut registry = ProviderRegistry::new();
        registry.register(video.clone());

        let search = Search::new(Arc::new(registry), ItemCache::default());
        let items = search
            .search(SearchKind::Items, "   ", &SearchContext::default())
            .await;

        assert!(items.is_empty());
        assert_eq!(video.calls.load(Ordering::SeqCst), 0);
    }
}
