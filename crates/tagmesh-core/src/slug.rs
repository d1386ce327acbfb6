pub const ITEM_EXTENSION: &str = ".md";
const FALLBACK_STEM: &str = "untitled";

/// Derives an item id from an uploaded filename: the base name is lowercased, every run of
/// non-alphanumeric characters collapses into one `-`, and `.md` is appended.
#[must_use]
pub fn sanitize_filename(input: &str) -> String {
    let base = input.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = strip_item_extension(base);

    let mut out = String::with_capacity(stem.len() + ITEM_EXTENSION.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    let stem = if trimmed.is_empty() {
        FALLBACK_STEM
    } else {
        trimmed
    };
    format!("{stem}{ITEM_EXTENSION}")
}

/// `true` for ids of the form `word(-word)*.md` with lowercase ASCII alphanumeric words.
#[must_use]
pub fn is_valid_item_id(id: &str) -> bool {
    let Some(stem) = id.strip_suffix(ITEM_EXTENSION) else {
        return false;
    };
    !stem.is_empty()
        && stem.split('-').all(|word| {
            !word.is_empty()
                && word
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Title-cased display name for an id: `my-first-post.md` becomes `My First Post`.
#[must_use]
pub fn derive_display_name(id: &str) -> String {
    if id.is_empty() {
        return String::new();
    }
    id.strip_suffix(ITEM_EXTENSION)
        .unwrap_or(id)
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_item_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(ITEM_EXTENSION.len());
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(ITEM_EXTENSION) => stem,
        _ => name,
    }
}
