use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::cache::ItemCache;
use crate::config::EngineConfig;
use crate::error::{Result, TagMeshError};
use crate::graph::GraphSupport;
use crate::index::{InMemoryTagIndex, TagIndexStore};
use crate::parse::{FrontMatterParser, MetadataParser};
use crate::store::{ContentStore, LocalContentStore};

mod graph_service;
mod item_service;
mod query_service;

use self::item_service::ItemBody;

/// Index, cache and graph accumulation move together under one lock so a reader never sees an
/// item in one structure but not the others.
#[derive(Debug)]
struct EngineState {
    index: Box<dyn TagIndexStore>,
    cache: ItemCache,
    graph: GraphSupport,
    /// Ids reserved by publishes whose store write is still in flight.
    pending: HashSet<String>,
}

#[derive(Clone)]
pub struct TagMesh {
    store: Arc<dyn ContentStore>,
    parser: Arc<dyn MetadataParser>,
    config: EngineConfig,
    state: Arc<RwLock<EngineState>>,
}

impl std::fmt::Debug for TagMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagMesh")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TagMesh {
    /// Opens a local content directory with the front-matter parser and preloads it.
    pub fn open(root_dir: impl Into<PathBuf>, config: EngineConfig) -> Result<Self> {
        let store = LocalContentStore::new(root_dir, &config.content_glob)?;
        Self::preload(Arc::new(store), Arc::new(FrontMatterParser::new()), config)
    }

    pub fn preload(
        store: Arc<dyn ContentStore>,
        parser: Arc<dyn MetadataParser>,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::with_index(store, parser, config, Box::new(InMemoryTagIndex::new()))
    }

    /// Builds the engine over a caller-supplied index implementation. Every stored document is
    /// loaded before the engine is returned, so no query observes a partial corpus.
    pub fn with_index(
        store: Arc<dyn ContentStore>,
        parser: Arc<dyn MetadataParser>,
        config: EngineConfig,
        mut index: Box<dyn TagIndexStore>,
    ) -> Result<Self> {
        index.clear();
        let mut state = EngineState {
            index,
            cache: ItemCache::new(config.content_ttl),
            graph: GraphSupport::from_enabled(config.graph_enabled),
            pending: HashSet::new(),
        };

        let objects = store.fetch_all()?;
        let total = objects.len();
        let mut skipped = 0usize;
        for object in objects {
            let loaded = item_service::prepare_document(parser.as_ref(), &object.id, &object.bytes)
                .and_then(|item| state.insert(item, ItemBody::Stored(&object.bytes)));
            if let Err(err) = loaded {
                if config.strict_preload {
                    return Err(err);
                }
                skipped += 1;
                warn!(item_id = %object.id, code = err.code(), error = %err, "skipping document");
            }
        }
        info!(
            documents = total,
            items = state.cache.len(),
            skipped,
            graph = state.graph.is_enabled(),
            "preloaded tag index"
        );

        Ok(Self {
            store,
            parser,
            config,
            state: Arc::new(RwLock::new(state)),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph_enabled(&self) -> Result<bool> {
        Ok(self.read_state()?.graph.is_enabled())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_state()?.cache.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_state()?.cache.is_empty())
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, EngineState>> {
        self.state
            .read()
            .map_err(|_| TagMeshError::Internal("engine state lock poisoned".to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, EngineState>> {
        self.state
            .write()
            .map_err(|_| TagMeshError::Internal("engine state lock poisoned".to_string()))
    }
}
