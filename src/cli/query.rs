//! Query command handlers.

use std::process::ExitCode;
use std::sync::Arc;

use color_eyre::Result;

use crate::config::Config;
use crate::error::AppError;
use crate::export::load_node_link;
use crate::graph::KnowledgeGraph;
use crate::models::Outcome;
use crate::services::{PipelineService, QueryOptions, QueryService};

use super::output::render;
use super::GraphArgs;

/// Exit code for a trace on an unknown bill, distinct from usage errors.
const EXIT_NOT_FOUND: u8 = 2;

/// Loads the graph named by `args`: a saved node-link file, or a fresh build.
async fn open(args: &GraphArgs) -> Result<(Config, QueryService)> {
    let config = Config::load()?;
    let graph: KnowledgeGraph = match &args.graph {
        Some(path) => load_node_link(path).await?,
        None => {
            PipelineService::from_config(&config, args.source.clone())?
                .run()
                .await?
                .graph
        }
    };
    let service = QueryService::new(Arc::new(graph), QueryOptions::from(&config.analysis));
    Ok((config, service))
}

pub async fn run_summary(args: &GraphArgs) -> Result<ExitCode> {
    let (_, service) = open(args).await?;
    print!(
        "{}",
        render(service.category_summary().as_slice(), args.output)?
    );
    Ok(ExitCode::SUCCESS)
}

pub async fn run_rejected(args: &GraphArgs, outcomes: &[Outcome]) -> Result<ExitCode> {
    let (config, service) = open(args).await?;
    let outcomes = if outcomes.is_empty() {
        config.analysis.rejected_outcomes.as_slice()
    } else {
        outcomes
    };
    let groups = service.outcome_groups(outcomes);
    print!("{}", render(groups.as_slice(), args.output)?);
    Ok(ExitCode::SUCCESS)
}

pub async fn run_trace(args: &GraphArgs, id: &str) -> Result<ExitCode> {
    let (_, service) = open(args).await?;
    match service.trace(id) {
        Ok(trace) => {
            print!("{}", render(&trace, args.output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ AppError::BillNotFound(_)) => {
            eprintln!("{}", err);
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn run_rates(args: &GraphArgs) -> Result<ExitCode> {
    let (_, service) = open(args).await?;
    print!(
        "{}",
        render(service.rejection_rates().as_slice(), args.output)?
    );
    Ok(ExitCode::SUCCESS)
}

pub async fn run_stats(args: &GraphArgs) -> Result<ExitCode> {
    let (_, service) = open(args).await?;
    print!("{}", render(&service.graph_stats(), args.output)?);
    Ok(ExitCode::SUCCESS)
}
