//! Business logic services for the bill graph.
//!
//! The pipeline produces graphs from a record source; the query service
//! answers read-only questions over one graph snapshot.

mod analysis;
mod pipeline;
mod query;

pub use pipeline::{BuildReport, BuildSummary, PipelineService, RecordFilter};
pub use query::{QueryOptions, QueryService};
