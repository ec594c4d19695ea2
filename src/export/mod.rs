//! Graph exporters.
//!
//! Each format is a pure function of a [`KnowledgeGraph`]; the helpers here
//! only pick the format and handle files.

mod graphml;
mod node_link;
mod triples;

pub use graphml::to_graphml;
pub use node_link::{
    from_node_link, parse_node_link, to_node_link, NodeLinkDocument, NodeLinkEdge, NodeLinkNode,
};
pub use triples::{attribute_predicate, render_facts, render_ntriples, to_triples, Term, Triple};

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::ExportConfig;
use crate::error::AppError;
use crate::graph::KnowledgeGraph;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Node-link JSON (`{nodes, edges}`).
    NodeLink,
    /// Triples as a JSON array of `{subject, predicate, object}`.
    Triples,
    /// N-Triples RDF.
    NTriples,
    /// One `subject → predicate → object` line per triple.
    Facts,
    /// GraphML XML.
    Graphml,
}

impl ExportFormat {
    /// File extension (without the leading dot).
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::NodeLink => "json",
            ExportFormat::Triples => "triples.json",
            ExportFormat::NTriples => "nt",
            ExportFormat::Facts => "facts.txt",
            ExportFormat::Graphml => "graphml",
        }
    }
}

/// Rendering options shared by all formats.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub base_iri: String,
    pub styled: bool,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            base_iri: config.base_iri.clone(),
            styled: config.styled,
        }
    }
}

/// Renders a graph in the given format.
pub fn render(
    graph: &KnowledgeGraph,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String, AppError> {
    let rendered = match format {
        ExportFormat::NodeLink => {
            serde_json::to_string_pretty(&to_node_link(graph, options.styled))?
        }
        ExportFormat::Triples => serde_json::to_string_pretty(&to_triples(graph))?,
        ExportFormat::NTriples => render_ntriples(&to_triples(graph), &options.base_iri),
        ExportFormat::Facts => render_facts(&to_triples(graph)),
        ExportFormat::Graphml => to_graphml(graph),
    };
    Ok(rendered)
}

/// Writes one file per format into `config.out_dir`, named
/// `<basename>.<extension>`. Returns the written paths.
pub async fn write_exports(
    graph: &KnowledgeGraph,
    config: &ExportConfig,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>, AppError> {
    tokio::fs::create_dir_all(&config.out_dir).await?;
    let options = ExportOptions::from(config);

    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = config
            .out_dir
            .join(format!("{}.{}", config.basename, format.extension()));
        let content = render(graph, format, &options)?;
        tokio::fs::write(&path, content).await?;
        tracing::info!(format = ?format, path = %path.display(), "Exported graph");
        written.push(path);
    }
    Ok(written)
}

/// Reloads a graph from a node-link JSON file.
pub async fn load_node_link(path: &Path) -> Result<KnowledgeGraph, AppError> {
    let content = tokio::fs::read_to_string(path).await?;
    let graph = parse_node_link(&content)?;
    tracing::info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Loaded graph"
    );
    Ok(graph)
}
