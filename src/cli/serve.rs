//! HTTP server command handler.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use color_eyre::Result;
use serde::Deserialize;

use crate::config::Config;
use crate::context::Context;
use crate::error::AppError;
use crate::export::{to_graphml, to_node_link, to_triples, NodeLinkDocument, Triple};
use crate::graph::KnowledgeGraph;
use crate::models::{BillTrace, CategoryCount, GraphStats, Outcome, OutcomeGroup, RejectionRate};
use crate::services::BuildSummary;

/// Builds the read-only HTTP surface over the context's graph store.
pub fn router(ctx: Context) -> Router {
    Router::new()
        .route("/graph", get(graph))
        .route("/graph/triples", get(triples))
        .route("/graph/graphml", get(graphml))
        .route("/summary", get(summary))
        .route("/rejected", get(rejected))
        .route("/trace/{id}", get(trace))
        .route("/rates", get(rates))
        .route("/stats", get(stats))
        .route("/refresh", post(refresh))
        .with_state(ctx)
}

async fn graph(State(ctx): State<Context>) -> Json<NodeLinkDocument> {
    Json(to_node_link(&ctx.store.snapshot(), ctx.config.export.styled))
}

async fn triples(State(ctx): State<Context>) -> Json<Vec<Triple>> {
    Json(to_triples(&ctx.store.snapshot()))
}

async fn graphml(State(ctx): State<Context>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        to_graphml(&ctx.store.snapshot()),
    )
}

async fn summary(State(ctx): State<Context>) -> Json<Vec<CategoryCount>> {
    Json(ctx.queries().category_summary())
}

#[derive(Debug, Deserialize)]
struct RejectedParams {
    /// Comma-separated outcome names.
    outcomes: Option<String>,
}

async fn rejected(
    State(ctx): State<Context>,
    Query(params): Query<RejectedParams>,
) -> Result<Json<Vec<OutcomeGroup>>, AppError> {
    let outcomes = match params.outcomes.as_deref() {
        Some(list) if !list.trim().is_empty() => list
            .split(',')
            .map(str::parse::<Outcome>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Validation)?,
        _ => ctx.config.analysis.rejected_outcomes.clone(),
    };
    Ok(Json(ctx.queries().outcome_groups(&outcomes)))
}

async fn trace(
    State(ctx): State<Context>,
    Path(id): Path<String>,
) -> Result<Json<BillTrace>, AppError> {
    ctx.queries().trace(&id).map(Json)
}

async fn rates(State(ctx): State<Context>) -> Json<Vec<RejectionRate>> {
    Json(ctx.queries().rejection_rates())
}

async fn stats(State(ctx): State<Context>) -> Json<GraphStats> {
    Json(ctx.queries().graph_stats())
}

async fn refresh(State(ctx): State<Context>) -> Result<Json<BuildSummary>, AppError> {
    ctx.refresh().await.map(Json)
}

/// Rebuilds the graph every `period` until the process exits.
fn spawn_refresh(ctx: Context, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; the initial build already ran.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = ctx.refresh().await {
                tracing::warn!(error = %e, "Scheduled refresh failed; keeping previous graph");
            }
        }
    });
}

/// Run the HTTP server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    source: Option<PathBuf>,
) -> Result<ExitCode> {
    tracing::info!("Starting billgraph HTTP server");

    let config = Config::load()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let refresh_secs = config.server.refresh_secs;

    let ctx = Context::new(config, KnowledgeGraph::new()).with_source(source);
    ctx.refresh().await?;

    if let Some(secs) = refresh_secs.filter(|s| *s > 0) {
        tracing::info!(every_secs = secs, "Periodic refresh enabled");
        spawn_refresh(ctx.clone(), Duration::from_secs(secs));
    }

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid address {}:{}: {}", host, port, e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("billgraph HTTP server listening on http://{}", addr);

    axum::serve(listener, router(ctx)).await.map_err(|e| {
        tracing::error!(error = %e, "HTTP server error");
        color_eyre::eyre::eyre!("HTTP server error: {}", e)
    })?;

    tracing::info!("HTTP server shutting down");
    Ok(ExitCode::SUCCESS)
}
