use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::error;

use crate::cache::ItemCache;
use crate::error::{Result, TagMeshError};
use crate::index::TagIndexStore;
use crate::models::{Item, NeighborRecord};

/// Weight desc, then most recently updated, then id asc. Ids are unique, so the order is total.
pub(crate) fn neighbor_ordering(a: &NeighborRecord, b: &NeighborRecord) -> Ordering {
    b.weight
        .cmp(&a.weight)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn rank_and_truncate(mut records: Vec<NeighborRecord>, limit: usize) -> Vec<NeighborRecord> {
    records.sort_by(neighbor_ordering);
    if limit > 0 {
        records.truncate(limit);
    }
    records
}

/// Items sharing tags with `id`, ranked by shared-tag count.
///
/// A non-empty `include_tags` restricts which common tags count. `min_shared` below 1 is
/// treated as 1 and `limit == 0` means unlimited.
pub fn related_items(
    index: &dyn TagIndexStore,
    cache: &ItemCache,
    id: &str,
    include_tags: &[String],
    min_shared: usize,
    limit: usize,
) -> Result<Vec<NeighborRecord>> {
    let Some(base) = cache.get(id) else {
        return Err(TagMeshError::NotFound(id.to_string()));
    };
    let include = include_tags
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>();
    let min_shared = min_shared.max(1);

    let mut shared = BTreeMap::<&str, Vec<String>>::new();
    for tag in &base.tags {
        if !include.is_empty() && !include.contains(tag.as_str()) {
            continue;
        }
        let Some(members) = index.members(tag) else {
            continue;
        };
        for other in members {
            if other == id {
                continue;
            }
            shared.entry(other.as_str()).or_default().push(tag.clone());
        }
    }

    let mut records = Vec::with_capacity(shared.len());
    for (other, tags) in shared {
        if tags.len() < min_shared {
            continue;
        }
        let Some(item) = cache.get(other) else {
            report_missing_item(other);
            continue;
        };
        records.push(NeighborRecord::from_item(item, tags));
    }
    Ok(rank_and_truncate(records, limit))
}

/// Items matching at least one selected tag, weighted by how many distinct selected tags they
/// carry. An empty selection yields no results.
#[must_use]
pub fn selection_adjacency<'a>(
    selected_tags: &[String],
    corpus: impl IntoIterator<Item = &'a Item>,
    limit: usize,
) -> Vec<NeighborRecord> {
    let selected = selected_tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>();
    if selected.is_empty() {
        return Vec::new();
    }

    let records = corpus
        .into_iter()
        .filter_map(|item| {
            let matched = selected
                .iter()
                .filter(|tag| item.has_tag(tag))
                .map(|tag| (*tag).to_string())
                .collect::<Vec<_>>();
            (!matched.is_empty()).then(|| NeighborRecord::from_item(item, matched))
        })
        .collect::<Vec<_>>();
    rank_and_truncate(records, limit)
}

/// Tag membership filter: the union (`match_all == false`) or intersection of the members of
/// `tags`, newest first.
pub fn items_by_tags(
    index: &dyn TagIndexStore,
    cache: &ItemCache,
    tags: &[String],
    match_all: bool,
) -> Result<Vec<Item>> {
    let mut wanted = Vec::<&str>::new();
    for tag in tags.iter().map(|tag| tag.trim()) {
        if !tag.is_empty() && !wanted.contains(&tag) {
            wanted.push(tag);
        }
    }
    if wanted.is_empty() {
        return Err(TagMeshError::Validation("no tags provided".to_string()));
    }

    let mut ids = BTreeSet::<String>::new();
    for (position, tag) in wanted.iter().enumerate() {
        let members = index.lookup(tag);
        if !match_all {
            ids.extend(members);
        } else if position == 0 {
            ids = members;
        } else {
            ids.retain(|id| members.contains(id));
        }
    }

    let mut items = Vec::with_capacity(ids.len());
    for id in &ids {
        match cache.get(id) {
            Some(item) => items.push(item.clone()),
            None => report_missing_item(id),
        }
    }
    items.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(items)
}

fn report_missing_item(id: &str) {
    error!(item_id = id, "tag index references an item missing from the cache");
    debug_assert!(false, "tag index references uncached item {id}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryTagIndex;
    use crate::test_support::{corpus, item};

    fn seeded() -> (InMemoryTagIndex, ItemCache) {
        seeded_with(corpus())
    }

    fn seeded_with(items: Vec<Item>) -> (InMemoryTagIndex, ItemCache) {
        let mut index = InMemoryTagIndex::new();
        let mut cache = ItemCache::new(None);
        for item in items {
            index.index_item(&item.id, &item.tags);
            cache.put(item, b"content");
        }
        (index, cache)
    }

    fn ids(records: &[NeighborRecord]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    fn tags(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn related_items_ranks_by_weight_then_recency_then_id() {
        let (index, cache) = seeded();
        let related = related_items(&index, &cache, "delta.md", &[], 1, 0).expect("related");
        // Every other note shares type/note; kubernetes or cloud-architecture adds one more.
        assert_eq!(ids(&related), vec!["gamma.md", "beta.md", "alpha.md"]);
        assert!(related.iter().all(|record| record.weight == 2));
        assert!(
            related
                .iter()
                .all(|record| record.weight == record.shared_tags.len())
        );
    }

    #[test]
    fn related_items_with_theme_filter_ties_on_weight_one() {
        let (index, cache) = seeded();
        let include = tags(&["theme/kubernetes", "theme/cloud-architecture"]);
        let related = related_items(&index, &cache, "delta.md", &include, 1, 0).expect("related");
        assert_eq!(ids(&related), vec!["gamma.md", "beta.md", "alpha.md"]);
        assert!(related.iter().all(|record| record.weight == 1));
        assert_eq!(related[0].shared_tags, vec!["theme/cloud-architecture"]);
        assert_eq!(related[1].shared_tags, vec!["theme/kubernetes"]);
    }

    #[test]
    fn related_items_breaks_full_ties_by_id() {
        let (index, cache) = seeded_with(vec![
            item("hub.md", "2024-01-01", &["type/note", "theme/x"]),
            item("b.md", "2024-05-01", &["type/note", "theme/x"]),
            item("a.md", "2024-05-01", &["type/note", "theme/x"]),
        ]);
        let related = related_items(&index, &cache, "hub.md", &[], 1, 0).expect("related");
        assert_eq!(ids(&related), vec!["a.md", "b.md"]);
    }

    #[test]
    fn related_items_applies_min_shared_and_limit() {
        let (index, cache) = seeded();
        let related = related_items(&index, &cache, "alpha.md", &[], 2, 0).expect("related");
        // alpha shares type/note + theme/kubernetes with beta and delta, type/note + source/book with gamma.
        assert_eq!(ids(&related), vec!["delta.md", "gamma.md", "beta.md"]);

        let related = related_items(&index, &cache, "alpha.md", &[], 3, 0).expect("related");
        assert!(related.is_empty());

        let related = related_items(&index, &cache, "alpha.md", &[], 0, 1).expect("related");
        assert_eq!(ids(&related), vec!["delta.md"]);
    }

    #[test]
    fn related_items_unknown_pivot_is_not_found() {
        let (index, cache) = seeded();
        let err = related_items(&index, &cache, "ghost.md", &[], 1, 0).expect_err("missing");
        assert!(matches!(err, TagMeshError::NotFound(id) if id == "ghost.md"));
    }

    #[test]
    fn related_items_is_empty_for_isolated_items() {
        let mut items = corpus();
        items.push(item("lonely.md", "2024-01-01", &["type/essay", "theme/solitude"]));
        let (index, cache) = seeded_with(items);
        let related = related_items(&index, &cache, "lonely.md", &[], 1, 0).expect("related");
        assert!(related.is_empty());
    }

    #[test]
    fn selection_adjacency_weights_by_matched_selected_tags() {
        let items = corpus();
        let selected = tags(&["theme/kubernetes", "theme/cloud-architecture"]);
        let ranked = selection_adjacency(&selected, &items, 0);
        assert_eq!(ids(&ranked), vec!["delta.md", "gamma.md", "beta.md", "alpha.md"]);
        assert_eq!(ranked[0].weight, 2);
        assert!(ranked[1..].iter().all(|record| record.weight == 1));

        let limited = selection_adjacency(&selected, &items, 2);
        assert_eq!(ids(&limited), vec!["delta.md", "gamma.md"]);
    }

    #[test]
    fn selection_adjacency_counts_duplicate_selections_once() {
        let items = corpus();
        let selected = tags(&["theme/kubernetes", "theme/kubernetes", " theme/kubernetes "]);
        let ranked = selection_adjacency(&selected, &items, 0);
        assert!(ranked.iter().all(|record| record.weight == 1));
        assert_eq!(ids(&ranked), vec!["delta.md", "beta.md", "alpha.md"]);
    }

    #[test]
    fn selection_adjacency_of_empty_selection_is_empty() {
        let items = corpus();
        assert!(selection_adjacency(&[], &items, 0).is_empty());
        assert!(selection_adjacency(&tags(&["theme/none"]), &items, 0).is_empty());
    }

    #[test]
    fn items_by_tags_any_vs_all() {
        let (index, cache) = seeded();
        let selected = tags(&["theme/kubernetes", "theme/cloud-architecture"]);

        let any = items_by_tags(&index, &cache, &selected, false).expect("any");
        let any_ids = any.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(any_ids, vec!["delta.md", "gamma.md", "beta.md", "alpha.md"]);

        let all = items_by_tags(&index, &cache, &selected, true).expect("all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "delta.md");
    }

    #[test]
    fn items_by_tags_requires_a_tag() {
        let (index, cache) = seeded();
        let err = items_by_tags(&index, &cache, &tags(&[" ", ""]), true).expect_err("empty");
        assert!(matches!(err, TagMeshError::Validation(_)));
    }

    #[test]
    fn rankings_are_deterministic_across_calls() {
        let (index, cache) = seeded();
        let first = related_items(&index, &cache, "beta.md", &[], 1, 0).expect("related");
        for _ in 0..5 {
            let again = related_items(&index, &cache, "beta.md", &[], 1, 0).expect("related");
            assert_eq!(
                serde_json::to_string(&again).expect("json"),
                serde_json::to_string(&first).expect("json")
            );
        }
    }
}
