use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::error::{Result, TagMeshError};
use crate::models::{Item, ItemDocument};
use crate::parse::MetadataParser;
use crate::slug::{derive_display_name, is_valid_item_id, sanitize_filename};
use crate::taxonomy::validate_tags;

use super::{EngineState, TagMesh};

const MAX_FUTURE_SKEW_HOURS: i64 = 24;

/// Unvalidated item fields as they arrive from a caller or a parsed document.
struct ItemDraft<'a, S> {
    id: &'a str,
    raw_tags: &'a [S],
    updated_at: DateTime<Utc>,
    name: Option<&'a str>,
    published: bool,
    description: Option<String>,
}

fn build_item<S: AsRef<str>>(draft: ItemDraft<'_, S>) -> Result<Item> {
    if !is_valid_item_id(draft.id) {
        return Err(TagMeshError::Validation(format!(
            "invalid item id '{}'",
            draft.id
        )));
    }
    let tags = validate_tags(draft.raw_tags)?;
    let horizon = Utc::now() + TimeDelta::hours(MAX_FUTURE_SKEW_HOURS);
    if draft.updated_at > horizon {
        return Err(TagMeshError::Validation(format!(
            "updated timestamp {} is too far in the future",
            draft.updated_at.to_rfc3339()
        )));
    }
    let name = draft
        .name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| derive_display_name(draft.id), ToString::to_string);

    Ok(Item {
        id: draft.id.to_string(),
        name,
        tags: tags.into_iter().collect::<BTreeSet<_>>(),
        updated_at: draft.updated_at,
        published: draft.published,
        description: draft.description,
    })
}

/// Parses and validates one stored document into an item keyed by `id`.
pub(super) fn prepare_document(
    parser: &dyn MetadataParser,
    id: &str,
    bytes: &[u8],
) -> Result<Item> {
    let metadata = parser.parse(bytes)?;
    build_item(ItemDraft {
        id,
        raw_tags: metadata.tags.as_slice(),
        updated_at: metadata.updated_at,
        name: metadata.name.as_deref(),
        published: metadata.published,
        description: metadata.description,
    })
}

/// Where an item's content lives once it is committed.
pub(super) enum ItemBody<'a> {
    /// Backed by a document in the content store; the cached copy may expire.
    Stored(&'a [u8]),
    /// No stored document; the cached (empty) body is the only copy and never expires.
    Detached,
}

fn conflict(id: &str) -> TagMeshError {
    TagMeshError::Conflict(format!("item already exists: {id}"))
}

impl EngineState {
    /// Claims `id` for a publish in flight so no other writer can store the same document.
    fn reserve(&mut self, id: &str) -> Result<()> {
        if self.cache.contains(id) || !self.pending.insert(id.to_string()) {
            return Err(conflict(id));
        }
        Ok(())
    }

    /// The single commit point: index, cache and graph accumulation change together.
    pub(super) fn insert(&mut self, item: Item, body: ItemBody<'_>) -> Result<()> {
        if self.cache.contains(&item.id) {
            return Err(conflict(&item.id));
        }
        self.index.index_item(&item.id, &item.tags);
        if let Some(builder) = self.graph.builder_mut() {
            builder.on_item_created(self.index.as_ref(), &item);
        }
        match body {
            ItemBody::Stored(content) => self.cache.put(item, content),
            ItemBody::Detached => self.cache.put_pinned(item, &[]),
        }
        Ok(())
    }
}

impl TagMesh {
    /// Validates and indexes a new item without a stored document. Items are created once;
    /// an existing id fails with [`TagMeshError::Conflict`].
    pub fn create_item<S: AsRef<str>>(
        &self,
        raw_tags: &[S],
        id: &str,
        updated_at: DateTime<Utc>,
        name: &str,
    ) -> Result<Item> {
        let item = build_item(ItemDraft {
            id,
            raw_tags,
            updated_at,
            name: Some(name),
            published: true,
            description: None,
        })?;
        self.commit(item, ItemBody::Detached)
    }

    /// Derives the id from `filename`, validates the document, writes it through the content
    /// store and indexes it. New documents must carry a `description` (or `lead`).
    ///
    /// The id is reserved under the write lock before the store write, so a concurrent publish
    /// of the same id fails with [`TagMeshError::Conflict`] without touching the store.
    pub fn publish_document(&self, filename: &str, bytes: &[u8]) -> Result<Item> {
        let id = sanitize_filename(filename);
        let item = prepare_document(self.parser.as_ref(), &id, bytes)?;
        if item.description.is_none() {
            return Err(TagMeshError::Validation(format!(
                "document {id} needs a description or lead"
            )));
        }
        self.write_state()?.reserve(&id)?;

        let written = self.store.put_raw(&id, bytes);
        let mut state = self.write_state()?;
        state.pending.remove(&id);
        written?;
        state.insert(item.clone(), ItemBody::Stored(bytes))?;
        debug!(item_id = %item.id, tags = item.tags.len(), "document published");
        Ok(item)
    }

    fn commit(&self, item: Item, body: ItemBody<'_>) -> Result<Item> {
        let mut state = self.write_state()?;
        if state.pending.contains(&item.id) {
            return Err(conflict(&item.id));
        }
        state.insert(item.clone(), body)?;
        debug!(item_id = %item.id, tags = item.tags.len(), "item created");
        Ok(item)
    }

    pub fn get_item(&self, id: &str) -> Result<ItemDocument> {
        self.read_state()?
            .cache
            .document(id)
            .ok_or_else(|| TagMeshError::NotFound(id.to_string()))
    }

    /// Raw document bytes, served from the cache until their TTL lapses and then re-read from
    /// the content store.
    pub fn item_content(&self, id: &str) -> Result<Arc<[u8]>> {
        {
            let state = self.read_state()?;
            if !state.cache.contains(id) {
                return Err(TagMeshError::NotFound(id.to_string()));
            }
            if let Some(bytes) = state.cache.content(id) {
                debug!(item_id = id, "content cache hit");
                return Ok(bytes);
            }
        }

        debug!(item_id = id, "content cache miss");
        let bytes = self.store.fetch_raw(id)?;
        let mut state = self.write_state()?;
        state.cache.evict_expired();
        state.cache.put_content(id, &bytes);
        Ok(Arc::from(bytes))
    }

    /// Rebuilds the tag index from the cached items and drops any graph accumulation.
    pub fn rebuild_index(&self) -> Result<usize> {
        let mut guard = self.write_state()?;
        let state = &mut *guard;
        let items = state.cache.items().collect::<Vec<_>>();
        state.index.rebuild(&items);
        if let Some(builder) = state.graph.builder_mut() {
            builder.invalidate();
        }
        debug!(items = items.len(), "tag index rebuilt");
        Ok(items.len())
    }
}
