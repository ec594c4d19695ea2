//! End-to-end tests: record file → normalized records → graph → exports and queries.

use std::io::Write;
use std::sync::Arc;

use billgraph::config::{Config, ExportConfig, SourceConfig};
use billgraph::error::AppError;
use billgraph::export::{load_node_link, write_exports, ExportFormat};
use billgraph::graph::build;
use billgraph::models::{NodeKey, NodeKind, Outcome, Record, Relation};
use billgraph::normalizer::normalize_batch;
use billgraph::services::{PipelineService, QueryOptions, QueryService};
use billgraph::sources::{FileSource, RecordSource};

const BILLS_CSV: &str = "\
billId,shortTitle,policy_area,isAct,billWithdrawn,isDefeated,currentStage_description,currentHouse,originatingHouse,lastUpdate
1,NHS Funding Bill,Health,False,,False,2nd reading,Commons,Commons,2023-03-01T10:00:00
2,Hospital Parking Bill,Health,True,,False,Royal Assent,Lords,Commons,2023-04-12
3,Sentencing Bill,Justice,False,2023-05-01T00:00:00,False,Committee stage,Commons,Lords,not a date
,Orphan Row,Justice,False,,,,,,
3,Sentencing (Amendment) Bill,Justice,False,,True,Report stage,Lords,Lords,2023-06-01
";

fn write_fixture(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn pipeline_for(path: &std::path::Path) -> PipelineService {
    let config = Config {
        source: SourceConfig {
            path: Some(path.to_path_buf()),
            format: None,
        },
        ..Config::default()
    };
    PipelineService::from_config(&config, None).unwrap()
}

#[tokio::test]
async fn test_csv_source_end_to_end() {
    let fixture = write_fixture(".csv", BILLS_CSV);
    let report = pipeline_for(fixture.path()).run().await.unwrap();

    assert_eq!(report.summary.loaded, 5);
    assert_eq!(report.summary.accepted, 4);
    assert_eq!(report.summary.rejected, 1);
    assert_eq!(report.rejections[0].index, 3);

    let graph = &report.graph;
    assert_eq!(graph.nodes_of(NodeKind::Bill).count(), 3);

    // Bill 3 was re-reported: its stage was replaced, its outcomes accumulated.
    let bill3 = NodeKey::bill("3");
    let stages: Vec<_> = graph
        .outgoing_with(&bill3, Relation::WentThroughStage)
        .map(|e| e.target.value.as_str())
        .collect();
    assert_eq!(stages, vec!["Report stage"]);
    let outcomes: Vec<_> = graph
        .outgoing_with(&bill3, Relation::HasOutcome)
        .map(|e| e.target.value.as_str())
        .collect();
    assert_eq!(outcomes, vec!["Defeated", "Rejected", "Withdrawn"]);
    assert_eq!(
        graph.node(&bill3).unwrap().attribute("title"),
        Some("Sentencing (Amendment) Bill")
    );
    // The replaced stage no longer has any bill pointing at it.
    assert!(!graph.contains(&NodeKey::new(NodeKind::Stage, "Committee stage")));

    let queries = QueryService::new(Arc::new(report.graph), QueryOptions::default());
    let summary = queries.category_summary();
    assert_eq!(summary[0].category, "Health");
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[1].category, "Justice");
    assert_eq!(summary[1].count, 1);
}

#[tokio::test]
async fn test_json_source_scenario() {
    let fixture = write_fixture(
        ".json",
        r#"{"items": [
            {"billId": 1, "shortTitle": "bill1", "policyArea": "Health", "isAct": false},
            {"billId": 2, "shortTitle": "bill2", "policyArea": "Health", "isAct": true},
            {"billId": 3, "shortTitle": "bill3", "policyArea": "Justice", "isAct": false,
             "billWithdrawn": "2023-01-01T00:00:00"}
        ]}"#,
    );
    let records = FileSource::new(fixture.path(), None)
        .unwrap()
        .load()
        .await
        .unwrap();
    let batch = normalize_batch(&records);
    assert!(batch.rejections.is_empty());

    let queries = QueryService::new(Arc::new(build(&batch.records)), QueryOptions::default());
    let groups = queries.outcome_groups(&[Outcome::Rejected, Outcome::Withdrawn]);
    let shape: Vec<_> = groups
        .iter()
        .map(|g| (g.category.as_str(), g.titles.clone()))
        .collect();
    assert_eq!(
        shape,
        vec![
            ("Health", vec!["bill1".to_string()]),
            ("Justice", vec!["bill3".to_string()]),
        ]
    );

    assert!(matches!(
        queries.trace("404"),
        Err(AppError::BillNotFound(_))
    ));
}

#[tokio::test]
async fn test_exports_reload_into_identical_graph() {
    let graph = build(&[
        Record::new("10")
            .with_title("Clean Air Bill")
            .with_category("Environment")
            .with_sponsor("J. Smith")
            .with_act(false)
            .withdrawn()
            .defeated(),
        Record::new("11").with_title("Unclassified Bill"),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        out_dir: dir.path().to_path_buf(),
        basename: "graph".to_string(),
        ..ExportConfig::default()
    };

    let written = write_exports(
        &graph,
        &config,
        &[ExportFormat::NodeLink, ExportFormat::Facts],
    )
    .await
    .unwrap();
    assert_eq!(written[0], dir.path().join("graph.json"));
    assert_eq!(written[1], dir.path().join("graph.facts.txt"));

    let reloaded = load_node_link(&written[0]).await.unwrap();
    assert_eq!(reloaded, graph);

    // Queries answer the same on the reloaded graph.
    let fresh = QueryService::new(Arc::new(graph), QueryOptions::default());
    let loaded = QueryService::new(Arc::new(reloaded), QueryOptions::default());
    assert_eq!(fresh.category_summary(), loaded.category_summary());
    assert_eq!(
        fresh.outcome_groups(Outcome::unsuccessful()),
        loaded.outcome_groups(Outcome::unsuccessful())
    );
    assert_eq!(fresh.trace("10").unwrap(), loaded.trace("10").unwrap());
}
