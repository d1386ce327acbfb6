use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_norway::Value;

use crate::error::{Result, TagMeshError};

const FRONT_MATTER_OPENERS: [&str; 2] = ["---", "---yaml"];
const FRONT_MATTER_CLOSER: &str = "---";

const NAIVE_DATETIME_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Metadata extracted from a raw document. Tags are raw; the engine validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMetadata {
    pub tags: Vec<String>,
    pub name: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub published: bool,
    pub description: Option<String>,
}

pub trait MetadataParser: Send + Sync + std::fmt::Debug {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedMetadata>;
}

/// YAML front matter delimited by `---` (or `---yaml`) and `---` lines at the top of a
/// markdown document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatterParser;

impl FrontMatterParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawFrontMatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    updated: Option<Value>,
    #[serde(default)]
    published: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lead: Option<String>,
}

impl MetadataParser for FrontMatterParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedMetadata> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| TagMeshError::Validation("document is not valid UTF-8".to_string()))?;
        let Some(block) = extract_front_matter(text) else {
            return Err(TagMeshError::Validation(
                "document has no front matter".to_string(),
            ));
        };
        let raw = if block.trim().is_empty() {
            RawFrontMatter::default()
        } else {
            serde_norway::from_str::<RawFrontMatter>(block)?
        };

        let updated_at = match raw.updated.as_ref() {
            None | Some(Value::Null) => {
                return Err(TagMeshError::Validation(
                    "front matter is missing 'updated'".to_string(),
                ));
            }
            Some(Value::String(value)) => parse_timestamp(value).ok_or_else(|| {
                TagMeshError::Validation(format!("unrecognized 'updated' timestamp '{value}'"))
            })?,
            Some(_) => {
                return Err(TagMeshError::Validation(
                    "'updated' must be a timestamp string".to_string(),
                ));
            }
        };

        Ok(ParsedMetadata {
            tags: raw.tags.unwrap_or_default(),
            name: non_blank(raw.name),
            updated_at,
            published: raw.published.as_ref().is_some_and(parse_published),
            description: non_blank(raw.description).or_else(|| non_blank(raw.lead)),
        })
    }
}

/// Returns the YAML between the delimiters; `None` when the document does not open with one.
fn extract_front_matter(text: &str) -> Option<&str> {
    let mut offset = 0usize;
    let mut start = None;
    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim();
        match start {
            None if trimmed.is_empty() => {}
            None if FRONT_MATTER_OPENERS.contains(&trimmed) => start = Some(offset),
            None => return None,
            Some(body_start) if trimmed == FRONT_MATTER_CLOSER => {
                return Some(&text[body_start..line_start]);
            }
            Some(_) => {}
        }
    }
    None
}

fn parse_published(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1" | "on"
        ),
        Value::Number(number) => number.as_i64() == Some(1),
        _ => false,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses RFC 3339 or one of the naive layouts; naive values are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for layout in NAIVE_DATETIME_LAYOUTS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, DATE_LAYOUT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}
