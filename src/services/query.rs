//! Query service: the three canonical read-only queries over a built graph.
//!
//! Every query is a single pass over nodes and edges and never mutates the
//! graph. Empty results are values, not errors; only [`QueryService::trace`]
//! can fail, with [`AppError::BillNotFound`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::error::AppError;
use crate::graph::KnowledgeGraph;
use crate::models::{
    BillTrace, CategoryCount, Direction, NodeKey, NodeKind, Outcome, OutcomeGroup, Relation,
    RelationGroup, TraceNeighbor, UNKNOWN,
};

/// Options shared by the aggregation queries.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// Report uncategorised bills under "Unknown" instead of leaving them out.
    pub include_unknown_category: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            include_unknown_category: true,
        }
    }
}

impl From<&AnalysisConfig> for QueryOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            include_unknown_category: config.include_unknown_category,
        }
    }
}

/// Read-only queries over one graph snapshot.
#[derive(Debug, Clone)]
pub struct QueryService {
    graph: Arc<KnowledgeGraph>,
    options: QueryOptions,
}

impl QueryService {
    pub fn new(graph: Arc<KnowledgeGraph>, options: QueryOptions) -> Self {
        Self { graph, options }
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Bills per category, by count descending then name ascending.
    pub fn category_summary(&self) -> Vec<CategoryCount> {
        let mut counts: HashMap<&str, usize> = self
            .graph
            .nodes_of(NodeKind::Category)
            .map(|node| (node.key.value.as_str(), 0))
            .collect();
        for edge in self.graph.edges() {
            if edge.relation == Relation::HasCategory {
                *counts.entry(edge.target.value.as_str()).or_insert(0) += 1;
            }
        }
        if !self.options.include_unknown_category {
            counts.remove(UNKNOWN);
        }

        let mut summary: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        summary.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.category.cmp(&b.category))
        });
        summary
    }

    /// Titles of bills holding any of `outcomes`, grouped by category.
    ///
    /// Titles keep bill order within a group; groups are ordered by size
    /// descending, then by name.
    pub fn outcome_groups(&self, outcomes: &[Outcome]) -> Vec<OutcomeGroup> {
        let wanted: HashSet<Outcome> = outcomes.iter().copied().collect();
        let mut category_of: HashMap<&NodeKey, &str> = HashMap::new();
        let mut matched: HashSet<&NodeKey> = HashSet::new();

        for edge in self.graph.edges() {
            match edge.relation {
                Relation::HasCategory => {
                    category_of.insert(&edge.source, edge.target.value.as_str());
                }
                Relation::HasOutcome => {
                    let hit = edge
                        .target
                        .value
                        .parse::<Outcome>()
                        .is_ok_and(|o| wanted.contains(&o));
                    if hit {
                        matched.insert(&edge.source);
                    }
                }
                _ => {}
            }
        }

        let mut groups: Vec<OutcomeGroup> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();
        for bill in self.graph.nodes_of(NodeKind::Bill) {
            if !matched.contains(&bill.key) {
                continue;
            }
            let category = category_of.get(&bill.key).copied().unwrap_or(UNKNOWN);
            if category == UNKNOWN && !self.options.include_unknown_category {
                continue;
            }
            let i = *slot.entry(category).or_insert_with(|| {
                groups.push(OutcomeGroup {
                    category: category.to_string(),
                    titles: Vec::new(),
                });
                groups.len() - 1
            });
            groups[i].titles.push(bill.display_name().to_string());
        }

        groups.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.category.cmp(&b.category))
        });
        groups
    }

    /// One-hop neighborhood of a bill, grouped by relation.
    ///
    /// Accepts either the bare identifier (`"12"`) or the node id (`"Bill_12"`).
    /// A bill whose own identifier matches wins over the node-id reading.
    pub fn trace(&self, id: &str) -> Result<BillTrace, AppError> {
        let id = id.trim();
        let bare = NodeKey::bill(id);
        let key = match NodeKey::parse_id(id) {
            Ok(key) if key.kind == NodeKind::Bill && !self.graph.contains(&bare) => key,
            _ => bare,
        };
        let bill = self
            .graph
            .node(&key)
            .ok_or_else(|| AppError::BillNotFound(id.to_string()))?;

        let mut by_relation: HashMap<Relation, Vec<TraceNeighbor>> = HashMap::new();
        let outgoing = self
            .graph
            .outgoing(&key)
            .map(|edge| (edge.relation, &edge.target, Direction::Outgoing));
        let incoming = self
            .graph
            .incoming(&key)
            .map(|edge| (edge.relation, &edge.source, Direction::Incoming));

        for (relation, other, direction) in outgoing.chain(incoming) {
            let name = self
                .graph
                .node(other)
                .map(|n| n.display_name().to_string())
                .unwrap_or_else(|| other.value.clone());
            by_relation.entry(relation).or_default().push(TraceNeighbor {
                id: other.id(),
                kind: other.kind,
                name,
                direction,
            });
        }

        let relations = Relation::all()
            .iter()
            .filter_map(|relation| {
                by_relation
                    .remove(relation)
                    .map(|neighbors| RelationGroup {
                        relation: *relation,
                        neighbors,
                    })
            })
            .collect();

        Ok(BillTrace {
            id: key.id(),
            title: bill.display_name().to_string(),
            relations,
        })
    }
}
