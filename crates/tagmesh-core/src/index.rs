use std::collections::{BTreeMap, BTreeSet};

use crate::models::Item;

/// Inverted tag → item-id membership, the ground truth for every tag query.
///
/// Implementations must keep the sets exact: an id is present under a tag iff the indexed
/// item carries that tag. Callers mutate only while holding the engine's write lock.
pub trait TagIndexStore: Send + Sync + std::fmt::Debug {
    fn index_item(&mut self, id: &str, tags: &BTreeSet<String>);

    /// Drops `id` from the given tags. Update paths must diff old and new tag sets and call
    /// this for the tags that disappeared before indexing the new set.
    fn remove_item(&mut self, id: &str, tags: &BTreeSet<String>);

    fn clear(&mut self);

    fn members(&self, tag: &str) -> Option<&BTreeSet<String>>;

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &BTreeSet<String>)> + '_>;

    /// Owned copy of the members of `tag`; empty when the tag is unknown.
    fn lookup(&self, tag: &str) -> BTreeSet<String> {
        self.members(tag).cloned().unwrap_or_default()
    }

    fn contains(&self, tag: &str, id: &str) -> bool {
        self.members(tag).is_some_and(|ids| ids.contains(id))
    }

    fn rebuild(&mut self, items: &[&Item]) {
        self.clear();
        for item in items {
            self.index_item(&item.id, &item.tags);
        }
    }

    fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.entries()
            .map(|(tag, ids)| (tag.to_string(), ids.iter().cloned().collect()))
            .collect()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InMemoryTagIndex {
    tags: BTreeMap<String, BTreeSet<String>>,
}

impl InMemoryTagIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

impl TagIndexStore for InMemoryTagIndex {
    fn index_item(&mut self, id: &str, tags: &BTreeSet<String>) {
        for tag in tags {
            self.tags
                .entry(tag.clone())
                .or_default()
                .insert(id.to_string());
        }
    }

    fn remove_item(&mut self, id: &str, tags: &BTreeSet<String>) {
        for tag in tags {
            let Some(ids) = self.tags.get_mut(tag) else {
                continue;
            };
            ids.remove(id);
            if ids.is_empty() {
                self.tags.remove(tag);
            }
        }
    }

    fn clear(&mut self) {
        self.tags.clear();
    }

    fn members(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.tags.get(tag)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &BTreeSet<String>)> + '_> {
        Box::new(self.tags.iter().map(|(tag, ids)| (tag.as_str(), ids)))
    }
}
