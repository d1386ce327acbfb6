use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

mod args;


pub use args::{
    FilterArgs, GraphArgs, IdArg, PublishArgs, RelatedArgs, SelectArgs, SlugArgs, TagsArgs,
    ValidateTagsArgs,
};

#[derive(Debug, Parser)]
#[command(name = "tagmesh")]
#[command(about = "Tag index, related items and co-occurrence graph over tagged markdown", version)]
pub struct Cli {
    /// Content directory holding the markdown documents.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Raise log verbosity (repeatable). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the item id derived from a filename.
    Slug(SlugArgs),
    /// Normalize and validate a tag list against the taxonomy.
    ValidateTags(ValidateTagsArgs),
    Publish(PublishArgs),
    Show(IdArg),
    Related(RelatedArgs),
    /// Rank items by how many of the selected tags they carry.
    Select(SelectArgs),
    /// Items carrying any (or all) of the given tags.
    Filter(FilterArgs),
    Graph(GraphArgs),
    /// Tag counts and suggestions for a selection.
    Tags(TagsArgs),
}

impl Commands {
    /// Stable operation name reported in error payloads.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Slug(_) => "item.slug",
            Self::ValidateTags(_) => "tags.validate",
            Self::Publish(_) => "item.publish",
            Self::Show(_) => "item.show",
            Self::Related(_) => "item.related",
            Self::Select(_) => "tags.select",
            Self::Filter(_) => "tags.filter",
            Self::Graph(_) => "graph.snapshot",
            Self::Tags(_) => "tags.summary",
        }
    }
}
