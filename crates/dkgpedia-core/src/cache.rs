//! Scoped answer cache keyed by topic.
//!
//! Holds the [`AnswerData`] of recently viewed topics with a time-to-live and
//! a capacity bound. Entries are removed explicitly when a view closes.

use moka::sync::Cache;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::model::{cache_key, AnswerData};

/// Default time an answer stays cached.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Default number of cached answers.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// TTL-bounded answer cache.
#[derive(Clone)]
pub struct AnswerCache {
    entries: Cache<String, AnswerData>,
}

impl Default for AnswerCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_CAPACITY)
    }
}

impl AnswerCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity.max(1) as u64)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_ttl(), config.cache_capacity)
    }

    /// Store an answer under `answer_{topic}`, replacing any previous one.
    pub fn put(&self, data: AnswerData) {
        let key = data.cache_key();
        debug!(%key, "Caching answer");
        self.entries.insert(key, data);
    }

    /// Cached answer for `topic`, if present and not expired.
    pub fn get(&self, topic: &str) -> Option<AnswerData> {
        self.entries.get(&cache_key(topic))
    }

    /// Drop the answer for `topic`. Returns whether one was cached.
    pub fn remove(&self, topic: &str) -> bool {
        self.entries.remove(&cache_key(topic)).is_some()
    }

    /// Run pending evictions and return roughly how many entries went away.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.entry_count();
        self.entries.run_pending_tasks();
        let after = self.entries.entry_count();
        before.saturating_sub(after) as usize
    }

    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisResult;

    fn answer(topic: &str) -> AnswerData {
        AnswerData {
            original_content: format!("{} original", topic),
            corrected_content: format!("{} corrected", topic),
            analysis_result: AnalysisResult::default(),
            topic: topic.to_string(),
        }
    }

    #[test]
    fn test_put_get_remove() {
        let cache = AnswerCache::new(Duration::from_secs(60), 4);
        cache.put(answer("Cattle"));
        assert_eq!(cache.get("Cattle").unwrap().corrected_content, "Cattle corrected");
        assert!(cache.get("Bison").is_none());
        assert!(cache.remove("Cattle"));
        assert!(!cache.remove("Cattle"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_not_returned() {
        let cache = AnswerCache::new(Duration::from_millis(50), 4);
        cache.put(answer("Cattle"));
        std::thread::sleep(Duration::from_millis(120));
        assert!(cache.get("Cattle").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_purge_expired() {
        let cache = AnswerCache::new(Duration::from_millis(50), 8);
        cache.put(answer("Cattle"));
        cache.put(answer("Bison"));
        std::thread::sleep(Duration::from_millis(120));
        cache.purge_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = AnswerCache::new(Duration::from_secs(60), 2);
        for topic in ["Cattle", "Bison", "Yak", "Zebu"] {
            cache.put(answer(topic));
        }
        assert!(cache.len() <= 2);
    }

    #[test]
    fn test_put_overwrites_same_topic() {
        let cache = AnswerCache::new(Duration::from_secs(60), 1);
        cache.put(answer("Cattle"));
        let mut updated = answer("Cattle");
        updated.corrected_content = "newer".to_string();
        cache.put(updated);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Cattle").unwrap().corrected_content, "newer");
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = AnswerCache::default();
        let other = cache.clone();
        cache.put(answer("Cattle"));
        assert!(other.get("Cattle").is_some());
    }
}
