use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::models::{news::NewsResult, search::RequestSignature};

#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Utc::now(),
        }
    }
}

/// Upstream responses keyed by request signature. Entries live until the process
/// exits; there is no eviction and no size bound.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<RequestSignature, CacheEntry<NewsResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a signature and counts the outcome as a hit or a miss.
    pub fn get(&self, signature: &RequestSignature) -> Option<NewsResult> {
        match self.entries.get(signature) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    "cache hit for {} (stored at {})",
                    signature,
                    entry.stored_at.to_rfc3339()
                );
                Some(entry.value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("cache miss for {}", signature);
                None
            }
        }
    }

    /// Last write wins when two misses for the same signature race.
    pub fn put(&self, signature: RequestSignature, response: NewsResult) {
        self.entries.insert(signature, CacheEntry::new(response));
    }

    pub fn contains(&self, signature: &RequestSignature) -> bool {
        self.entries.contains_key(signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::{Category, SearchRequest};
    use reqwest::Url;

    fn signature(term: &str) -> RequestSignature {
        let endpoint = Url::parse("https://newsapi.org/v2/top-headlines").unwrap();
        SearchRequest::new(Some(Category::General), None, Some(term)).signature(&endpoint)
    }

    fn result(status: &str) -> NewsResult {
        NewsResult {
            status: status.to_string(),
            total_results: Some(0),
            articles: vec![],
        }
    }

    #[test]
    fn get_counts_hits_and_misses() {
        let cache = ResponseCache::new();
        let sig = signature("rust");

        assert!(cache.get(&sig).is_none());
        cache.put(sig.clone(), result("ok"));
        assert_eq!(cache.get(&sig), Some(result("ok")));

        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn later_put_replaces_entry() {
        let cache = ResponseCache::new();
        let sig = signature("rust");

        cache.put(sig.clone(), result("first"));
        cache.put(sig.clone(), result("second"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&sig).map(|r| r.status), Some("second".to_string()));
    }

    #[test]
    fn contains_does_not_touch_counters() {
        let cache = ResponseCache::new();
        let sig = signature("rust");

        assert!(!cache.contains(&sig));
        assert!(cache.is_empty());
        assert_eq!(cache.hits() + cache.misses(), 0);
    }
}
