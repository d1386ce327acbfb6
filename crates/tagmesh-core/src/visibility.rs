//! Caller-side publication filters. The engine ranks and graphs every item regardless of its
//! `published` flag; surfaces that hide drafts apply these to the results.

use std::collections::HashSet;

use crate::models::{NeighborRecord, TagGraph};

/// Keeps neighbors for which `is_published` holds.
#[must_use]
pub fn filter_neighbors(
    records: Vec<NeighborRecord>,
    is_published: impl Fn(&str) -> bool,
) -> Vec<NeighborRecord> {
    records
        .into_iter()
        .filter(|record| is_published(&record.id))
        .collect()
}

/// Drops unpublished items, every edge touching one, and their ids from the tag snapshot.
/// Tags left without members disappear from the snapshot.
#[must_use]
pub fn filter_graph(mut graph: TagGraph) -> TagGraph {
    let hidden = graph
        .items
        .iter()
        .filter(|item| !item.published)
        .map(|item| item.id.clone())
        .collect::<HashSet<_>>();
    if hidden.is_empty() {
        return graph;
    }

    graph.items.retain(|item| item.published);
    graph
        .edges
        .retain(|edge| !hidden.contains(&edge.from) && !hidden.contains(&edge.to));
    for ids in graph.tag_index.values_mut() {
        ids.retain(|id| !hidden.contains(id));
    }
    graph.tag_index.retain(|_, ids| !ids.is_empty());
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::related_items;
    use crate::cache::ItemCache;
    use crate::graph::GraphBuilder;
    use crate::index::{InMemoryTagIndex, TagIndexStore};
    use crate::models::GraphOptions;
    use crate::test_support::corpus;

    fn seeded_with_draft(draft: &str) -> (InMemoryTagIndex, ItemCache) {
        let mut index = InMemoryTagIndex::new();
        let mut cache = ItemCache::new(None);
        for mut item in corpus() {
            item.published = item.id != draft;
            index.index_item(&item.id, &item.tags);
            cache.put(item, b"content");
        }
        (index, cache)
    }

    #[test]
    fn neighbors_of_drafts_are_hidden() {
        let (index, cache) = seeded_with_draft("gamma.md");
        let related = related_items(&index, &cache, "delta.md", &[], 1, 0).expect("related");
        assert_eq!(related.len(), 3);
        let visible = filter_neighbors(related, |id| {
            cache.get(id).is_some_and(|item| item.published)
        });
        let ids = visible.iter().map(|record| record.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["beta.md", "alpha.md"]);
    }

    #[test]
    fn graph_drops_draft_items_edges_and_snapshot_ids() {
        let (index, cache) = seeded_with_draft("gamma.md");
        let graph = GraphBuilder::new().build(&index, &cache, &GraphOptions::default());
        let visible = filter_graph(graph);

        assert_eq!(visible.items.len(), 3);
        assert_eq!(visible.edges.len(), 3);
        assert!(
            visible
                .edges
                .iter()
                .all(|edge| edge.from != "gamma.md" && edge.to != "gamma.md")
        );
        assert_eq!(visible.tag_index["source/book"], vec!["alpha.md"]);
        assert_eq!(visible.tag_index["theme/cloud-architecture"], vec!["delta.md"]);
    }

    #[test]
    fn graph_without_drafts_is_unchanged() {
        let (index, cache) = seeded_with_draft("none");
        let graph = GraphBuilder::new().build(&index, &cache, &GraphOptions::default());
        assert_eq!(filter_graph(graph.clone()), graph);
    }
}
