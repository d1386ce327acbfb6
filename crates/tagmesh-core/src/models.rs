use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summary::parse_selected_tags;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub tags: BTreeSet<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Item {
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Cached item metadata plus the content fingerprint, as served to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDocument {
    pub item: Item,
    pub etag: String,
}

/// One ranked neighbor produced by the adjacency engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRecord {
    pub id: String,
    pub name: String,
    pub weight: usize,
    pub shared_tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl NeighborRecord {
    pub(crate) fn from_item(item: &Item, shared_tags: Vec<String>) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            weight: shared_tags.len(),
            shared_tags,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub shared_tags: Vec<String>,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagGraph {
    pub items: Vec<Item>,
    pub edges: Vec<GraphEdge>,
    pub tag_index: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphOptions {
    pub min_shared_tags: usize,
    #[serde(default)]
    pub include_tags: Vec<String>,
    /// `0` keeps every edge.
    #[serde(default)]
    pub max_edges: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            min_shared_tags: 1,
            include_tags: Vec::new(),
            max_edges: 0,
        }
    }
}

impl GraphOptions {
    /// Lenient parsing of loosely typed request parameters. Unparseable or non-positive
    /// `min_shared_tags` falls back to 1; unparseable or negative `max_edges` to 0.
    #[must_use]
    pub fn from_params(
        min_shared_tags: Option<&str>,
        include_tags: Option<&str>,
        max_edges: Option<&str>,
    ) -> Self {
        let min_shared_tags = min_shared_tags
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|value| *value > 0)
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(1);
        let max_edges = max_edges
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|value| *value >= 0)
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(0);
        let include_tags = include_tags.map(parse_selected_tags).unwrap_or_default();
        Self {
            min_shared_tags,
            include_tags,
            max_edges,
        }
    }

    #[must_use]
    pub(crate) fn normalized(&self) -> NormalizedGraphOptions {
        NormalizedGraphOptions {
            min_shared_tags: self.min_shared_tags.max(1),
            include_tags: self
                .include_tags
                .iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty())
                .map(ToString::to_string)
                .collect(),
            max_edges: self.max_edges,
        }
    }
}

/// Option set used as the graph cache key: include tags compare as a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedGraphOptions {
    pub(crate) min_shared_tags: usize,
    pub(crate) include_tags: BTreeSet<String>,
    pub(crate) max_edges: usize,
}

impl NormalizedGraphOptions {
    pub(crate) fn admits_tag(&self, tag: &str) -> bool {
        self.include_tags.is_empty() || self.include_tags.contains(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag_counts: BTreeMap<String, usize>,
    pub tag_order: Vec<String>,
    pub suggested: Vec<String>,
}
