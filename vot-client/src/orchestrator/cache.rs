//! In-memory TTL caches owned by the orchestrator
//!
//! Expired entries are logically absent and are dropped on lookup; there is
//! no background sweep.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use vot_common::time::expiry_after;

/// Composite cache key shared by translations and subtitles
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub video_id: String,
    pub from_lang: String,
    pub to_lang: String,
    pub model_variant: bool,
}

impl CacheKey {
    pub fn new(
        video_id: impl Into<String>,
        from_lang: impl Into<String>,
        to_lang: impl Into<String>,
        model_variant: bool,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            from_lang: from_lang.into(),
            to_lang: to_lang.into(),
            model_variant,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Map with one live entry per key and a fixed lifetime per entry
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<CacheKey, Entry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key` as of `now`
    pub fn get_at(&mut self, key: &CacheKey, now: DateTime<Utc>) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        self.get_at(key, vot_common::time::now())
    }

    /// Store `value`, replacing any previous entry for `key`; returns the expiry
    pub fn insert_at(&mut self, key: CacheKey, value: V, now: DateTime<Utc>) -> DateTime<Utc> {
        let expires_at = expiry_after(now, self.ttl);
        self.entries.insert(key, Entry { value, expires_at });
        expires_at
    }

    pub fn insert(&mut self, key: CacheKey, value: V) -> DateTime<Utc> {
        self.insert_at(key, value, vot_common::time::now())
    }

    pub fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until looked up
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cached on-demand translation
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTranslation {
    pub url: String,
    pub duration_secs: Option<f64>,
    pub translation_id: Option<String>,
}

/// Parsed cues and the track URL they were fetched from
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSubtitles {
    pub source_url: String,
    pub document: crate::subtitles::SubtitleDocument,
}

pub type TranslationCache = TtlCache<CachedTranslation>;
pub type SubtitleCache = TtlCache<CachedSubtitles>;
