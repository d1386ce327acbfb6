use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tagmesh_core::slug::sanitize_filename;
use tagmesh_core::summary::parse_selected_tags;
use tagmesh_core::taxonomy::validate_tags;
use tagmesh_core::visibility::{filter_graph, filter_neighbors};
use tagmesh_core::{EngineConfig, GraphOptions, TagMesh, TagMeshError};
use tracing::Level;

use crate::cli::{
    Commands, FilterArgs, GraphArgs, PublishArgs, RelatedArgs, SelectArgs, TagsArgs,
};

mod support;

use self::support::{SlugOutput, print_json};

pub(crate) fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Core failures become a JSON error payload on stderr; anything else is printed as a chain.
pub(crate) fn report_error(operation: &str, err: &anyhow::Error) {
    if let Some(core) = err.downcast_ref::<TagMeshError>() {
        let payload = core.to_payload(operation, None);
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("error: {err:#}"),
        }
        return;
    }
    eprintln!("error: {err:#}");
}

pub(crate) fn run_from_root(root: &Path, command: Commands) -> Result<()> {
    match command {
        Commands::Slug(args) => print_json(&SlugOutput {
            id: sanitize_filename(&args.filename),
        }),
        Commands::ValidateTags(args) => {
            let tags = validate_tags(args.tags.as_slice())?;
            print_json(&tags)
        }
        Commands::Publish(args) => publish(&open_engine(root)?, &args),
        Commands::Show(args) => print_json(&open_engine(root)?.get_item(&args.id)?),
        Commands::Related(args) => related(&open_engine(root)?, &args),
        Commands::Select(args) => select(&open_engine(root)?, &args),
        Commands::Filter(args) => filter(&open_engine(root)?, &args),
        Commands::Graph(args) => graph(&open_engine(root)?, &args),
        Commands::Tags(args) => tags(&open_engine(root)?, &args),
    }
}

fn open_engine(root: &Path) -> Result<TagMesh> {
    TagMesh::open(root, EngineConfig::from_env())
        .with_context(|| format!("failed to load content from {}", root.display()))
}

fn publish(mesh: &TagMesh, args: &PublishArgs) -> Result<()> {
    let bytes = fs::read(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let filename = match &args.as_filename {
        Some(name) => name.clone(),
        None => args
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .with_context(|| format!("{} has no file name", args.path.display()))?,
    };
    let item = mesh.publish_document(&filename, &bytes)?;
    print_json(&item)
}

fn related(mesh: &TagMesh, args: &RelatedArgs) -> Result<()> {
    let include = args
        .include_tags
        .as_deref()
        .map(parse_selected_tags)
        .unwrap_or_default();
    let limit = args.limit.unwrap_or(mesh.config().related_limit);
    if args.all {
        return print_json(&mesh.get_related(&args.id, &include, args.min_shared, limit)?);
    }
    let published = mesh.published_ids()?;
    let records = filter_neighbors(
        mesh.get_related(&args.id, &include, args.min_shared, 0)?,
        |id| published.contains(id),
    );
    print_json(&truncated(records, limit))
}

fn select(mesh: &TagMesh, args: &SelectArgs) -> Result<()> {
    let selected = parse_selected_tags(&args.tags);
    if args.all {
        return print_json(&mesh.get_selection_adjacency(&selected, args.limit)?);
    }
    // Drafts are hidden before the limit applies.
    let published = mesh.published_ids()?;
    let records = filter_neighbors(
        mesh.get_selection_adjacency(&selected, 0)?,
        |id| published.contains(id),
    );
    print_json(&truncated(records, args.limit))
}

fn truncated<T>(mut records: Vec<T>, limit: usize) -> Vec<T> {
    if limit > 0 {
        records.truncate(limit);
    }
    records
}

fn filter(mesh: &TagMesh, args: &FilterArgs) -> Result<()> {
    let tags = parse_selected_tags(&args.tags);
    let mut items = mesh.items_by_tags(&tags, args.match_all)?;
    if !args.all {
        items.retain(|item| item.published);
    }
    print_json(&items)
}

fn graph(mesh: &TagMesh, args: &GraphArgs) -> Result<()> {
    let options = GraphOptions::from_params(
        args.min_shared_tags.as_deref(),
        args.include_tags.as_deref(),
        args.max_edges.as_deref(),
    );
    if args.all {
        return print_json(&mesh.get_graph(&options)?);
    }
    // Draft edges are dropped before the edge cap applies.
    let max_edges = options.max_edges;
    let mut graph = filter_graph(mesh.get_graph(&GraphOptions {
        max_edges: 0,
        ..options
    })?);
    graph.edges = truncated(graph.edges, max_edges);
    print_json(&graph)
}

fn tags(mesh: &TagMesh, args: &TagsArgs) -> Result<()> {
    let selected = args
        .selected
        .as_deref()
        .map(parse_selected_tags)
        .unwrap_or_default();
    print_json(&mesh.tag_summary(&selected)?)
}
