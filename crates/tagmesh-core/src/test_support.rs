use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::Item;

pub(crate) fn day(raw: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .expect("fixture date")
        .and_hms_opt(0, 0, 0)
        .expect("midnight")
        .and_utc()
}

pub(crate) fn item(id: &str, updated: &str, tags: &[&str]) -> Item {
    Item {
        id: id.to_string(),
        name: crate::slug::derive_display_name(id),
        tags: tags.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
        updated_at: day(updated),
        published: true,
        description: None,
    }
}

/// Four notes sharing kubernetes / cloud-architecture themes in different combinations.
pub(crate) fn corpus() -> Vec<Item> {
    vec![
        item(
            "alpha.md",
            "2024-01-01",
            &["type/note", "theme/kubernetes", "source/book"],
        ),
        item(
            "beta.md",
            "2024-02-01",
            &[
                "type/note",
                "theme/kubernetes",
                "theme/cost-optimization",
                "source/article",
            ],
        ),
        item(
            "gamma.md",
            "2024-03-01",
            &["type/note", "theme/cloud-architecture", "source/book"],
        ),
        item(
            "delta.md",
            "2024-04-01",
            &[
                "type/note",
                "theme/kubernetes",
                "theme/cloud-architecture",
                "source/paper",
            ],
        ),
    ]
}

/// Markdown document with YAML front matter carrying `tags`, `updated`, `published` and a
/// short description.
pub(crate) fn document(tags: &[&str], updated: &str, published: bool) -> String {
    let tag_lines = tags
        .iter()
        .map(|tag| format!("  - {tag}\n"))
        .collect::<String>();
    format!(
        "---\nupdated: {updated}\npublished: {published}\ndescription: Test notes.\ntags:\n{tag_lines}---\n\nBody.\n"
    )
}

/// [`corpus`] rendered as stored documents.
pub(crate) fn corpus_documents() -> Vec<(String, String)> {
    corpus()
        .into_iter()
        .map(|item| {
            let tags = item.tags.iter().map(String::as_str).collect::<Vec<_>>();
            let updated = item.updated_at.format("%Y-%m-%d").to_string();
            let body = document(&tags, &updated, true);
            (item.id, body)
        })
        .collect()
}
