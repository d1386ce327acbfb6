use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, TagMeshError};

use super::family::TagFamily;

/// A tag split into its family prefix and free-form value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagParts<'a> {
    pub family: TagFamily,
    pub value: &'a str,
}

pub fn parse_tag(tag: &str) -> Result<TagParts<'_>> {
    let Some((family, value)) = tag.split_once('/') else {
        return Err(TagMeshError::MalformedTag(format!(
            "'{tag}' must have the form family/value"
        )));
    };
    if family.is_empty() || value.is_empty() {
        return Err(TagMeshError::MalformedTag(format!(
            "'{tag}' has an empty family or value"
        )));
    }
    let family = family
        .parse::<TagFamily>()
        .map_err(|_| TagMeshError::UnknownFamily {
            tag: tag.to_string(),
            family: family.to_string(),
        })?;
    Ok(TagParts { family, value })
}

/// Normalizes a raw tag list and enforces the taxonomy.
///
/// Entries are trimmed, empty entries dropped and exact duplicates removed keeping the first
/// occurrence. Every surviving tag must parse as `family/value` with a known family, and each
/// family's count must fall inside its [`Cardinality`](super::Cardinality).
pub fn validate_tags<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    let mut seen = HashSet::<&str>::new();
    let mut normalized = Vec::<String>::with_capacity(raw.len());
    let mut counts = BTreeMap::<TagFamily, usize>::new();

    for tag in raw {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || !seen.insert(tag) {
            continue;
        }
        let parts = parse_tag(tag)?;
        *counts.entry(parts.family).or_insert(0) += 1;
        normalized.push(tag.to_string());
    }

    for family in TagFamily::ALL {
        let observed = counts.get(&family).copied().unwrap_or(0);
        let cardinality = family.cardinality();
        if !cardinality.admits(observed) {
            return Err(TagMeshError::CardinalityViolation {
                family: family.as_str().to_string(),
                min: cardinality.min,
                max: cardinality.max,
                observed,
            });
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cardinality(err: TagMeshError, want_family: &str, want_max: usize, want_observed: usize) {
        match err {
            TagMeshError::CardinalityViolation {
                family,
                max,
                observed,
                ..
            } => {
                assert_eq!(family, want_family);
                assert_eq!(max, want_max);
                assert_eq!(observed, want_observed);
            }
            other => panic!("expected cardinality violation, got {other:?}"),
        }
    }

    #[test]
    fn role_family_is_accepted_and_preserved() {
        let tags = validate_tags(&["type/article", "role/person", "theme/knowledge"]).expect("valid");
        assert_eq!(tags, vec!["type/article", "role/person", "theme/knowledge"]);
    }

    #[test]
    fn four_role_tags_violate_role_cardinality() {
        let err = validate_tags(&[
            "type/article",
            "role/dev",
            "role/architect",
            "role/reviewer",
            "role/intern",
            "theme/engineering",
        ])
        .expect_err("four roles must fail");
        assert_cardinality(err, "role", 3, 4);
    }

    #[test]
    fn normalization_trims_drops_empty_and_dedups_in_first_occurrence_order() {
        let tags = validate_tags(&[
            " theme/b ",
            "",
            "type/note",
            "   ",
            "theme/b",
            "theme/a",
            "type/note",
        ])
        .expect("valid");
        assert_eq!(tags, vec!["theme/b", "type/note", "theme/a"]);
    }

    #[test]
    fn duplicates_do_not_count_towards_cardinality() {
        let tags = validate_tags(&["type/note", "theme/a", "source/x", "source/x"]).expect("valid");
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn malformed_tags_are_rejected() {
        for raw in ["plain", "/value", "theme/", "/"] {
            let err = validate_tags(&["type/note", "theme/a", raw]).expect_err(raw);
            assert!(matches!(err, TagMeshError::MalformedTag(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn value_may_contain_further_slashes() {
        let tags = validate_tags(&["type/note", "theme/cloud/aws"]).expect("valid");
        assert_eq!(tags[1], "theme/cloud/aws");
    }

    #[test]
    fn unknown_family_names_the_family() {
        let err = validate_tags(&["type/note", "theme/a", "mood/happy"]).expect_err("unknown");
        match err {
            TagMeshError::UnknownFamily { tag, family } => {
                assert_eq!(tag, "mood/happy");
                assert_eq!(family, "mood");
            }
            other => panic!("expected unknown family, got {other:?}"),
        }
    }

    #[test]
    fn lower_bounds_are_enforced() {
        assert_cardinality(
            validate_tags::<&str>(&[]).expect_err("empty"),
            "type",
            2,
            0,
        );
        assert_cardinality(
            validate_tags(&["type/note"]).expect_err("no theme"),
            "theme",
            5,
            0,
        );
    }

    #[test]
    fn upper_bounds_are_enforced_per_family() {
        assert_cardinality(
            validate_tags(&["type/a", "type/b", "type/c", "theme/x"]).expect_err("types"),
            "type",
            2,
            3,
        );
        assert_cardinality(
            validate_tags(&["type/a", "theme/x", "structure/a", "structure/b"])
                .expect_err("structure"),
            "structure",
            1,
            2,
        );
        assert_cardinality(
            validate_tags(&[
                "type/a", "theme/1", "theme/2", "theme/3", "theme/4", "theme/5", "theme/6",
            ])
            .expect_err("themes"),
            "theme",
            5,
            6,
        );
    }

    #[test]
    fn target_family_has_no_upper_bound() {
        let mut raw = vec!["type/a".to_string(), "theme/x".to_string()];
        raw.extend((0..12).map(|i| format!("target/t{i}")));
        assert_eq!(validate_tags(raw.as_slice()).expect("valid").len(), 14);
    }
}
