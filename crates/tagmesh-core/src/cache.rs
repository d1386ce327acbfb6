use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::{Item, ItemDocument};

#[derive(Debug, Clone)]
struct CachedItem {
    item: Item,
    etag: String,
}

#[derive(Debug, Clone)]
struct CachedContent {
    bytes: Arc<[u8]>,
    /// `None` pins the entry: it has no backing document to re-fetch from.
    stored_at: Option<Instant>,
}

/// Parsed items keyed by id, plus their raw content.
///
/// Item metadata never expires: every indexed id must resolve here. Content bytes are a
/// memo over the content store and are dropped once older than the configured TTL.
#[derive(Debug, Clone, Default)]
pub struct ItemCache {
    items: HashMap<String, CachedItem>,
    content: HashMap<String, CachedContent>,
    content_ttl: Option<Duration>,
}

#[must_use]
pub fn content_etag(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn is_expired(cached: &CachedContent, ttl: Option<Duration>, now: Instant) -> bool {
    match (ttl, cached.stored_at) {
        (Some(ttl), Some(stored_at)) => now.saturating_duration_since(stored_at) > ttl,
        _ => false,
    }
}

impl ItemCache {
    #[must_use]
    pub fn new(content_ttl: Option<Duration>) -> Self {
        Self {
            content_ttl,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id).map(|cached| &cached.item)
    }

    #[must_use]
    pub fn document(&self, id: &str) -> Option<ItemDocument> {
        self.items.get(id).map(|cached| ItemDocument {
            item: cached.item.clone(),
            etag: cached.etag.clone(),
        })
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn put(&mut self, item: Item, content: &[u8]) {
        self.put_at(item, content, Instant::now());
    }

    pub(crate) fn put_at(&mut self, item: Item, content: &[u8], now: Instant) {
        self.store_item(item, content, Some(now));
    }

    /// Caches an item whose content is not backed by the content store; it never expires.
    pub fn put_pinned(&mut self, item: Item, content: &[u8]) {
        self.store_item(item, content, None);
    }

    fn store_item(&mut self, item: Item, content: &[u8], stored_at: Option<Instant>) {
        let id = item.id.clone();
        self.items.insert(
            id.clone(),
            CachedItem {
                item,
                etag: content_etag(content),
            },
        );
        self.content.insert(
            id,
            CachedContent {
                bytes: Arc::from(content),
                stored_at,
            },
        );
    }

    /// Refreshes the content memo of an already cached item.
    pub fn put_content(&mut self, id: &str, content: &[u8]) {
        self.put_content_at(id, content, Instant::now());
    }

    pub(crate) fn put_content_at(&mut self, id: &str, content: &[u8], now: Instant) {
        if !self.items.contains_key(id) {
            return;
        }
        self.content.insert(
            id.to_string(),
            CachedContent {
                bytes: Arc::from(content),
                stored_at: Some(now),
            },
        );
    }

    #[must_use]
    pub fn content(&self, id: &str) -> Option<Arc<[u8]>> {
        self.content_at(id, Instant::now())
    }

    pub(crate) fn content_at(&self, id: &str, now: Instant) -> Option<Arc<[u8]>> {
        let cached = self.content.get(id)?;
        if is_expired(cached, self.content_ttl, now) {
            return None;
        }
        Some(Arc::clone(&cached.bytes))
    }

    /// Drops expired content entries; item metadata is untouched.
    pub fn evict_expired(&mut self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    pub(crate) fn evict_expired_at(&mut self, now: Instant) -> usize {
        let ttl = self.content_ttl;
        let before = self.content.len();
        self.content.retain(|_, cached| !is_expired(cached, ttl, now));
        before - self.content.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values().map(|cached| &cached.item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
