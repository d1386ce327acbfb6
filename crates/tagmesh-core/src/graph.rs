use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::cache::ItemCache;
use crate::index::TagIndexStore;
use crate::models::{GraphEdge, GraphOptions, Item, NormalizedGraphOptions, TagGraph};

type EdgeKey = (String, String);
type EdgeMap = BTreeMap<EdgeKey, BTreeSet<String>>;

fn canonical_pair(a: &str, b: &str) -> EdgeKey {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Debug, Clone)]
struct Accumulation {
    options: NormalizedGraphOptions,
    edges: EdgeMap,
}

/// Builds the item co-occurrence graph and keeps the unfiltered pair accumulation of the last
/// option set, so repeated snapshots with the same options only re-run the projection.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    cached: Option<Accumulation>,
    full_builds: usize,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects the cached accumulation when it was built for `options`. Read-only; `None`
    /// means the caller must take the write path through [`GraphBuilder::build`].
    #[must_use]
    pub fn cached_snapshot(
        &self,
        index: &dyn TagIndexStore,
        cache: &ItemCache,
        options: &GraphOptions,
    ) -> Option<TagGraph> {
        let options = options.normalized();
        let cached = self.cached.as_ref().filter(|cached| cached.options == options)?;
        Some(project(&cached.edges, &options, index, cache))
    }

    pub fn build(
        &mut self,
        index: &dyn TagIndexStore,
        cache: &ItemCache,
        options: &GraphOptions,
    ) -> TagGraph {
        let options = options.normalized();
        let accumulation = match self.cached.take() {
            Some(cached) if cached.options == options => cached,
            _ => {
                let edges = accumulate(index, &options);
                self.full_builds += 1;
                debug!(
                    pairs = edges.len(),
                    include_tags = options.include_tags.len(),
                    "rebuilt graph accumulation"
                );
                Accumulation {
                    options: options.clone(),
                    edges,
                }
            }
        };
        let graph = project(&accumulation.edges, &options, index, cache);
        self.cached = Some(accumulation);
        graph
    }

    /// Folds a freshly indexed item into the cached accumulation. Projection is deferred to the
    /// next snapshot; without a cached accumulation there is nothing to maintain.
    pub fn on_item_created(&mut self, index: &dyn TagIndexStore, item: &Item) {
        let Some(cached) = self.cached.as_mut() else {
            return;
        };
        for tag in &item.tags {
            if !cached.options.admits_tag(tag) {
                continue;
            }
            let Some(members) = index.members(tag) else {
                continue;
            };
            for other in members {
                if other == &item.id {
                    continue;
                }
                cached
                    .edges
                    .entry(canonical_pair(&item.id, other))
                    .or_default()
                    .insert(tag.clone());
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of full pairwise accumulations run so far.
    #[must_use]
    pub const fn full_builds(&self) -> usize {
        self.full_builds
    }
}

/// Whether the engine serves graph snapshots. Resolved once at construction.
#[derive(Debug, Clone)]
pub enum GraphSupport {
    Enabled(GraphBuilder),
    Unavailable,
}

impl GraphSupport {
    #[must_use]
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Enabled(GraphBuilder::new())
        } else {
            Self::Unavailable
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn builder_mut(&mut self) -> Option<&mut GraphBuilder> {
        match self {
            Self::Enabled(builder) => Some(builder),
            Self::Unavailable => None,
        }
    }
}

fn accumulate(index: &dyn TagIndexStore, options: &NormalizedGraphOptions) -> EdgeMap {
    let mut edges = EdgeMap::new();
    for (tag, members) in index.entries() {
        if !options.admits_tag(tag) {
            continue;
        }
        let members = members.iter().collect::<Vec<_>>();
        for (position, a) in members.iter().enumerate() {
            for b in &members[position + 1..] {
                edges
                    .entry(canonical_pair(a, b))
                    .or_default()
                    .insert(tag.to_string());
            }
        }
    }
    edges
}

fn project(
    edges: &EdgeMap,
    options: &NormalizedGraphOptions,
    index: &dyn TagIndexStore,
    cache: &ItemCache,
) -> TagGraph {
    let mut projected = edges
        .iter()
        .filter(|(_, shared)| shared.len() >= options.min_shared_tags)
        .map(|((from, to), shared)| GraphEdge {
            from: from.clone(),
            to: to.clone(),
            shared_tags: shared.iter().cloned().collect(),
            weight: shared.len(),
        })
        .collect::<Vec<_>>();
    projected.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
    });
    if options.max_edges > 0 {
        projected.truncate(options.max_edges);
    }

    let mut items = cache.items().cloned().collect::<Vec<_>>();
    items.sort_by(|a, b| a.id.cmp(&b.id));

    let tag_index = index
        .entries()
        .filter(|(tag, _)| options.admits_tag(tag))
        .map(|(tag, ids)| (tag.to_string(), ids.iter().cloned().collect()))
        .collect();

    TagGraph {
        items,
        edges: projected,
        tag_index,
    }
}
