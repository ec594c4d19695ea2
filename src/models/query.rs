//! Result models for graph queries and analyses.

use serde::{Deserialize, Serialize};

use super::{NodeKind, Relation};

/// Number of bills filed under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category label.
    pub category: String,
    /// Incoming HAS_CATEGORY edges.
    pub count: usize,
}

/// Titles of bills with a matching outcome, grouped under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeGroup {
    /// Category label ("Unknown" for uncategorised bills).
    pub category: String,
    /// Bill titles in graph order.
    pub titles: Vec<String>,
}

impl OutcomeGroup {
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Which way an edge points relative to the traced node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// A node adjacent to the traced bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceNeighbor {
    /// Node id (`<kind>_<value>`).
    pub id: String,
    pub kind: NodeKind,
    /// Display name (title for bills, value otherwise).
    pub name: String,
    pub direction: Direction,
}

/// Neighbors reached through a single relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationGroup {
    pub relation: Relation,
    pub neighbors: Vec<TraceNeighbor>,
}

/// One-hop neighborhood of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTrace {
    /// Node id of the traced bill.
    pub id: String,
    /// Bill title ("Unknown" if never reported).
    pub title: String,
    /// Neighbors grouped by relation, in relation vocabulary order.
    pub relations: Vec<RelationGroup>,
}

impl BillTrace {
    /// Returns the neighbors reached through `relation`, if any.
    pub fn neighbors(&self, relation: Relation) -> &[TraceNeighbor] {
        self.relations
            .iter()
            .find(|group| group.relation == relation)
            .map(|group| group.neighbors.as_slice())
            .unwrap_or(&[])
    }
}

/// Share of a category's bills that ended in rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionRate {
    pub category: String,
    pub total_bills: usize,
    pub rejected_bills: usize,
    /// Percentage rounded to two decimals.
    pub rejection_rate_percent: f64,
}

/// A named count used by statistics breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub name: String,
    pub count: usize,
}

/// Shape of a built graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_bills: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Node counts per kind, in kind order.
    pub nodes_by_kind: Vec<Tally>,
    /// Edge counts per relation, in vocabulary order.
    pub edges_by_relation: Vec<Tally>,
    /// Bills per outcome, in outcome order.
    pub outcomes: Vec<Tally>,
    /// Bills per current stage, most common first.
    pub stages: Vec<Tally>,
}
