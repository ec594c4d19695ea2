//! Application context shared by CLI commands and HTTP handlers.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::AppError;
use crate::graph::{GraphStore, KnowledgeGraph};
use crate::services::{BuildSummary, PipelineService, QueryOptions, QueryService};

/// Root application context.
///
/// Cheap to clone: the configuration and the graph store are shared.
#[derive(Clone)]
pub struct Context {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Latest built graph.
    pub store: GraphStore,
    /// Overrides `source.path` when set.
    source: Option<PathBuf>,
    /// Serializes rebuilds so only one writer swaps the store at a time.
    rebuild: Arc<Mutex<()>>,
}

impl Context {
    /// Creates a context holding `graph` as the current snapshot.
    pub fn new(config: Config, graph: KnowledgeGraph) -> Self {
        Self {
            config: Arc::new(config),
            store: GraphStore::new(graph),
            source: None,
            rebuild: Arc::new(Mutex::new(())),
        }
    }

    /// Uses `path` instead of the configured source on rebuild.
    pub fn with_source(mut self, path: Option<PathBuf>) -> Self {
        self.source = path;
        self
    }

    /// Pipeline over the configured source.
    pub fn pipeline(&self) -> Result<PipelineService, AppError> {
        PipelineService::from_config(&self.config, self.source.clone())
    }

    /// Query service over the current snapshot.
    pub fn queries(&self) -> QueryService {
        QueryService::new(
            self.store.snapshot(),
            QueryOptions::from(&self.config.analysis),
        )
    }

    /// Rebuilds from the source and swaps the result in for readers.
    pub async fn refresh(&self) -> Result<BuildSummary, AppError> {
        let _guard = self.rebuild.lock().await;
        let report = self.pipeline()?.run().await?;
        self.store.replace(report.graph);
        tracing::info!(
            nodes = report.summary.nodes,
            edges = report.summary.edges,
            "Graph refreshed"
        );
        Ok(report.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use std::io::Write;

    #[tokio::test]
    async fn test_refresh_swaps_snapshot() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"[{"billId": 1, "policy_area": "Health", "isAct": true}]"#)
            .unwrap();

        let config = Config {
            source: SourceConfig {
                path: Some(file.path().to_path_buf()),
                format: None,
            },
            ..Config::default()
        };
        let ctx = Context::new(config, KnowledgeGraph::new());
        let before = ctx.store.snapshot();
        assert!(before.is_empty());

        let summary = ctx.refresh().await.unwrap();
        assert_eq!(summary.accepted, 1);
        assert!(before.is_empty());
        assert_eq!(ctx.queries().category_summary()[0].category, "Health");
    }

    #[tokio::test]
    async fn test_source_override_wins() {
        let ctx = Context::new(Config::default(), KnowledgeGraph::new())
            .with_source(Some(PathBuf::from("bills.xlsx")));
        let err = ctx.refresh().await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedSource { .. }));
    }
}
