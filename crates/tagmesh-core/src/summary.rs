use std::collections::{BTreeMap, HashSet};

use crate::models::{Item, TagSummary};

const MAX_SUGGESTED_TAGS: usize = 15;

/// Splits a comma-separated tag list, trimming entries and dropping empties.
#[must_use]
pub fn parse_selected_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Tag frequencies over `items`, plus the tags that co-occur with every selected tag.
#[must_use]
pub fn build_tag_summary<'a>(
    items: impl IntoIterator<Item = &'a Item>,
    selected: &[String],
) -> TagSummary {
    let items = items.into_iter().collect::<Vec<_>>();
    let mut tag_counts = BTreeMap::<String, usize>::new();
    for item in &items {
        for tag in &item.tags {
            *tag_counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    let tag_order = order_by_count(&tag_counts);

    let selected_set = selected.iter().map(String::as_str).collect::<HashSet<_>>();
    let mut suggested_counts = BTreeMap::<String, usize>::new();
    if !selected_set.is_empty() {
        for item in &items {
            if !selected_set.iter().all(|tag| item.has_tag(tag)) {
                continue;
            }
            for tag in &item.tags {
                if selected_set.contains(tag.as_str()) {
                    continue;
                }
                *suggested_counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
    }
    let mut suggested = order_by_count(&suggested_counts);
    suggested.truncate(MAX_SUGGESTED_TAGS);

    TagSummary {
        tag_counts,
        tag_order,
        suggested,
    }
}

fn order_by_count(counts: &BTreeMap<String, usize>) -> Vec<String> {
    let mut order = counts.keys().cloned().collect::<Vec<_>>();
    order.sort_by(|a, b| counts[b].cmp(&counts[a]).then_with(|| a.cmp(b)));
    order
}
