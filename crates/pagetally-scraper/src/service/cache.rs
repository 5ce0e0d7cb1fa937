use std::sync::Arc;

use pagetally_core::AggregateResult;
use tokio::sync::RwLock;

/// Process-wide latest order scrape.
///
/// Starts empty; each successful scrape replaces the whole value. Readers get
/// a shared handle and never mutate it.
#[derive(Debug, Default)]
pub struct ResultCache {
    latest: RwLock<Option<Arc<AggregateResult>>>,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<AggregateResult>> {
        self.latest.read().await.clone()
    }

    pub async fn replace(&self, result: AggregateResult) -> Arc<AggregateResult> {
        let shared = Arc::new(result);
        *self.latest.write().await = Some(Arc::clone(&shared));
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        assert!(ResultCache::new().get().await.is_none());
    }

    #[tokio::test]
    async fn replace_swaps_whole_value() {
        let cache = ResultCache::new();
        cache.replace(AggregateResult::failed("first")).await;
        cache.replace(AggregateResult::default()).await;
        let current = cache.get().await.unwrap();
        assert!(current.error.is_none());
    }

    #[tokio::test]
    async fn readers_keep_their_snapshot() {
        let cache = ResultCache::new();
        cache.replace(AggregateResult::failed("old")).await;
        let held = cache.get().await.unwrap();
        cache.replace(AggregateResult::default()).await;
        assert_eq!(held.error.as_deref(), Some("old"));
    }
}
