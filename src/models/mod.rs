//! Domain models for the bill knowledge graph.

mod edge;
mod node;
mod outcome;
mod query;
mod record;

pub use edge::{Edge, Relation};
pub use node::{Node, NodeKey, NodeKind, ATTR_LAST_UPDATE, ATTR_NAME, ATTR_TITLE};
pub use outcome::Outcome;
pub use query::{
    BillTrace, CategoryCount, Direction, GraphStats, OutcomeGroup, RejectionRate,
    RelationGroup, Tally, TraceNeighbor,
};
pub use record::{Attr, RawRecord, Record, UNKNOWN};
