use std::collections::BTreeSet;

use crate::adjacency::{items_by_tags, related_items, selection_adjacency};
use crate::error::Result;
use crate::models::{Item, NeighborRecord, TagSummary};
use crate::summary::build_tag_summary;

use super::TagMesh;

impl TagMesh {
    pub fn get_related(
        &self,
        id: &str,
        include_tags: &[String],
        min_shared: usize,
        limit: usize,
    ) -> Result<Vec<NeighborRecord>> {
        let state = self.read_state()?;
        related_items(
            state.index.as_ref(),
            &state.cache,
            id,
            include_tags,
            min_shared,
            limit,
        )
    }

    pub fn get_selection_adjacency(
        &self,
        selected_tags: &[String],
        limit: usize,
    ) -> Result<Vec<NeighborRecord>> {
        let state = self.read_state()?;
        Ok(selection_adjacency(selected_tags, state.cache.items(), limit))
    }

    pub fn items_by_tags(&self, tags: &[String], match_all: bool) -> Result<Vec<Item>> {
        let state = self.read_state()?;
        items_by_tags(state.index.as_ref(), &state.cache, tags, match_all)
    }

    pub fn tag_summary(&self, selected_tags: &[String]) -> Result<TagSummary> {
        let state = self.read_state()?;
        Ok(build_tag_summary(state.cache.items(), selected_tags))
    }

    /// Ids of every item whose `published` flag is set.
    pub fn published_ids(&self) -> Result<BTreeSet<String>> {
        let state = self.read_state()?;
        Ok(state
            .cache
            .items()
            .filter(|item| item.published)
            .map(|item| item.id.clone())
            .collect())
    }
}
