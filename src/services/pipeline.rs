//! Build pipeline: source → normalizer → filter → graph builder.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Config;
use crate::error::AppError;
use crate::graph::{BuildOptions, GraphBuilder, KnowledgeGraph};
use crate::models::Record;
use crate::normalizer::{normalize_batch, Notice, Rejection};
use crate::sources::{FileSource, RecordSource, SourceFormat};

/// Record selection applied after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Exact category label ("Unknown" selects uncategorised records).
    pub category: Option<String>,
    /// Keep records updated on or after this date; undated records are dropped.
    pub since: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.since.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(category) = &self.category {
            if record.category.as_str() != category.trim() {
                return false;
            }
        }
        match self.since {
            Some(since) => record.last_update.is_some_and(|d| d >= since),
            None => true,
        }
    }

    /// Keeps matching records in their original order.
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct BuildReport {
    pub graph: KnowledgeGraph,
    pub summary: BuildSummary,
    pub rejections: Vec<Rejection>,
    pub notices: Vec<Notice>,
}

/// Record counts for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    /// Raw records read from the source.
    pub loaded: usize,
    /// Records that passed normalization.
    pub accepted: usize,
    pub rejected: usize,
    /// Accepted records dropped by the filter.
    pub filtered_out: usize,
    pub nodes: usize,
    pub edges: usize,
}

/// Runs the full build from a record source.
#[derive(Clone)]
pub struct PipelineService {
    source: Arc<dyn RecordSource>,
    filter: RecordFilter,
    options: BuildOptions,
}

impl PipelineService {
    pub fn new(source: Arc<dyn RecordSource>, filter: RecordFilter, options: BuildOptions) -> Self {
        Self {
            source,
            filter,
            options,
        }
    }

    /// Creates a pipeline from configuration. `source` overrides `source.path`.
    pub fn from_config(config: &Config, source: Option<PathBuf>) -> Result<Self, AppError> {
        let path = source
            .or_else(|| config.source.path.clone())
            .ok_or(AppError::SourceNotConfigured)?;
        let format: Option<SourceFormat> = config.source.format;
        let source = FileSource::new(path, format)?;

        Ok(Self::new(
            Arc::new(source),
            RecordFilter {
                category: config.filter.category.clone(),
                since: config.filter.since,
            },
            BuildOptions {
                link_unknown_facts: config.build.link_unknown_facts,
            },
        ))
    }

    /// Loads, normalizes, filters and builds.
    ///
    /// Rejected rows and notices are logged and returned; they never abort
    /// the run.
    pub async fn run(&self) -> Result<BuildReport, AppError> {
        tracing::info!(source = %self.source.describe(), "Building graph");
        let raws = self.source.load().await?;
        let loaded = raws.len();

        let batch = normalize_batch(&raws);
        for rejection in &batch.rejections {
            tracing::warn!(index = rejection.index, reason = %rejection.reason, "Rejected record");
        }
        for notice in &batch.notices {
            tracing::warn!(?notice, "Normalization notice");
        }

        let accepted = batch.records.len();
        let rejected = batch.rejected_count();
        let records = self.filter.apply(batch.records);
        let filtered_out = accepted - records.len();
        if filtered_out > 0 {
            tracing::info!(filtered_out, filter = ?self.filter, "Filtered records");
        }

        let mut builder = GraphBuilder::new(self.options);
        for record in &records {
            builder.add(record);
        }
        let graph = builder.finish();

        let summary = BuildSummary {
            loaded,
            accepted,
            rejected,
            filtered_out,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        };
        tracing::info!(
            loaded,
            accepted,
            rejected,
            nodes = summary.nodes,
            edges = summary.edges,
            "Graph ready"
        );

        Ok(BuildReport {
            graph,
            summary,
            rejections: batch.rejections,
            notices: batch.notices,
        })
    }
}
