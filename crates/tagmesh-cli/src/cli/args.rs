use std::path::PathBuf;

use clap::Args;

#[derive(Debug, Args)]
pub struct SlugArgs {
    pub filename: String,
}

#[derive(Debug, Args)]
pub struct ValidateTagsArgs {
    #[arg(required = true)]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Markdown file with YAML front matter.
    pub path: PathBuf,
    /// Filename to derive the item id from (defaults to the source file name).
    #[arg(long = "as", value_name = "FILENAME")]
    pub as_filename: Option<String>,
}

#[derive(Debug, Args)]
pub struct IdArg {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct RelatedArgs {
    pub id: String,
    /// Comma-separated tags; only these count as shared when given.
    #[arg(long)]
    pub include_tags: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub min_shared: usize,
    /// Maximum neighbors; `0` means unlimited. Defaults to `TAGMESH_RELATED_LIMIT`.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Include unpublished items.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Comma-separated selected tags.
    #[arg(long)]
    pub tags: String,
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub tags: String,
    /// Require every tag instead of any.
    #[arg(long)]
    pub match_all: bool,
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Minimum shared tags per edge; invalid or non-positive values fall back to 1.
    #[arg(long, allow_hyphen_values = true)]
    pub min_shared_tags: Option<String>,
    #[arg(long)]
    pub include_tags: Option<String>,
    /// Keep the strongest N edges; `0`, negative or invalid values keep all.
    #[arg(long, allow_hyphen_values = true)]
    pub max_edges: Option<String>,
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Comma-separated selection used for suggestions.
    #[arg(long)]
    pub selected: Option<String>,
}
