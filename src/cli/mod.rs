//! CLI module for billgraph.
//!
//! Subcommands:
//! - `build`: Build the graph from a record source and write exports
//! - `summary`, `rejected`, `trace`, `rates`, `stats`: Query a graph
//! - `serve`: Serve exports and queries over HTTP

mod build;
mod output;
mod query;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::models::Outcome;

pub use build::BuildCommand;
pub use output::{render, OutputFormat, TextReport};
pub use serve::router;

/// billgraph - Legislative knowledge graph
#[derive(Parser)]
#[command(name = "billgraph")]
#[command(about = "Legislative knowledge graph - build, export and query bills")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where a query command takes its graph from.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Node-link JSON file from a previous build
    #[arg(long, conflicts_with = "source")]
    pub graph: Option<PathBuf>,

    /// Record file to build from (overrides source.path)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the graph and write the configured exports
    Build(BuildCommand),

    /// Count bills per category
    Summary(GraphArgs),

    /// List bills with unsuccessful outcomes, grouped by category
    Rejected {
        #[command(flatten)]
        graph: GraphArgs,

        /// Outcomes to select (defaults to analysis.rejected_outcomes)
        #[arg(long, value_delimiter = ',')]
        outcomes: Vec<Outcome>,
    },

    /// Show a bill's direct neighborhood
    Trace {
        /// Bill identifier or node id (e.g. 12 or Bill_12)
        id: String,

        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Rejection rate per category
    Rates(GraphArgs),

    /// Graph statistics
    Stats(GraphArgs),

    /// Serve exports and queries over HTTP
    Serve {
        /// Host address to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,

        /// Record file to build from (overrides source.path)
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<ExitCode> {
        match self.command {
            Command::Build(cmd) => cmd.run().await,
            Command::Summary(args) => query::run_summary(&args).await,
            Command::Rejected { graph, outcomes } => query::run_rejected(&graph, &outcomes).await,
            Command::Trace { id, graph } => query::run_trace(&graph, &id).await,
            Command::Rates(args) => query::run_rates(&args).await,
            Command::Stats(args) => query::run_stats(&args).await,
            Command::Serve { host, port, source } => serve::run_serve(host, port, source).await,
        }
    }
}
