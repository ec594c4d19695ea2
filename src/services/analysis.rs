//! Policy analyses layered on the query service.

use std::collections::{HashMap, HashSet};

use crate::models::{
    GraphStats, NodeKey, NodeKind, Outcome, Relation, RejectionRate, Tally, UNKNOWN,
};

use super::QueryService;

impl QueryService {
    /// Share of each category's bills with a Rejected outcome.
    ///
    /// Sorted by rate descending, then by category name.
    pub fn rejection_rates(&self) -> Vec<RejectionRate> {
        let graph = self.graph();
        let rejected_bills: HashSet<&NodeKey> = graph
            .edges()
            .filter(|e| {
                e.relation == Relation::HasOutcome && e.target.value == Outcome::Rejected.as_str()
            })
            .map(|e| &e.source)
            .collect();

        let mut per_category: HashMap<&str, (usize, usize)> = HashMap::new();
        for edge in graph.edges() {
            if edge.relation != Relation::HasCategory {
                continue;
            }
            let entry = per_category
                .entry(edge.target.value.as_str())
                .or_insert((0, 0));
            entry.0 += 1;
            if rejected_bills.contains(&edge.source) {
                entry.1 += 1;
            }
        }
        if !self.options().include_unknown_category {
            per_category.remove(UNKNOWN);
        }

        let mut rates: Vec<RejectionRate> = per_category
            .into_iter()
            .map(|(category, (total, rejected))| RejectionRate {
                category: category.to_string(),
                total_bills: total,
                rejected_bills: rejected,
                rejection_rate_percent: percent(rejected, total),
            })
            .collect();
        rates.sort_by(|a, b| {
            b.rejection_rate_percent
                .total_cmp(&a.rejection_rate_percent)
                .then_with(|| a.category.cmp(&b.category))
        });
        rates
    }

    /// Node, edge, outcome and stage totals.
    pub fn graph_stats(&self) -> GraphStats {
        let graph = self.graph();

        let mut kinds: HashMap<NodeKind, usize> = HashMap::new();
        for node in graph.nodes() {
            *kinds.entry(node.kind()).or_insert(0) += 1;
        }

        let mut relations: HashMap<Relation, usize> = HashMap::new();
        let mut outcomes: HashMap<&str, usize> = HashMap::new();
        let mut stages: HashMap<&str, usize> = HashMap::new();
        for edge in graph.edges() {
            *relations.entry(edge.relation).or_insert(0) += 1;
            match edge.relation {
                Relation::HasOutcome => {
                    *outcomes.entry(edge.target.value.as_str()).or_insert(0) += 1
                }
                Relation::WentThroughStage => {
                    *stages.entry(edge.target.value.as_str()).or_insert(0) += 1
                }
                _ => {}
            }
        }

        let mut stages: Vec<Tally> = stages
            .into_iter()
            .map(|(name, count)| Tally {
                name: name.to_string(),
                count,
            })
            .collect();
        stages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        GraphStats {
            total_bills: kinds.get(&NodeKind::Bill).copied().unwrap_or(0),
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            nodes_by_kind: NodeKind::all()
                .iter()
                .map(|k| tally(k.as_str(), kinds.get(k).copied()))
                .collect(),
            edges_by_relation: Relation::all()
                .iter()
                .map(|r| tally(r.as_str(), relations.get(r).copied()))
                .collect(),
            outcomes: Outcome::all()
                .iter()
                .map(|o| tally(o.as_str(), outcomes.get(o.as_str()).copied()))
                .collect(),
            stages,
        }
    }
}

fn tally(name: &str, count: Option<usize>) -> Tally {
    Tally {
        name: name.to_string(),
        count: count.unwrap_or(0),
    }
}

/// `part / whole` as a percentage rounded to two decimals; zero for an empty whole.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::build;
    use crate::models::Record;
    use crate::services::QueryOptions;

    fn service(records: &[Record]) -> QueryService {
        QueryService::new(Arc::new(build(records)), QueryOptions::default())
    }

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn test_rejection_rates_sorted_by_rate() {
        let rates = service(&[
            Record::new("1").with_category("Health").with_act(false),
            Record::new("2").with_category("Health").with_act(true),
            Record::new("3").with_category("Justice").with_act(false),
            Record::new("4").with_category("Arts").with_act(true),
        ])
        .rejection_rates();

        let shape: Vec<_> = rates
            .iter()
            .map(|r| {
                (
                    r.category.as_str(),
                    r.total_bills,
                    r.rejected_bills,
                    r.rejection_rate_percent,
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                ("Justice", 1, 1, 100.0),
                ("Health", 2, 1, 50.0),
                ("Arts", 1, 0, 0.0),
            ]
        );
    }

    #[test]
    fn test_withdrawn_is_not_counted_as_rejected() {
        let rates = service(&[Record::new("1").with_category("Health").withdrawn()])
            .rejection_rates();
        assert_eq!(rates[0].rejected_bills, 0);
    }

    #[test]
    fn test_graph_stats() {
        let stats = service(&[
            Record::new("1")
                .with_category("Health")
                .with_stage("Royal Assent")
                .with_act(true),
            Record::new("2")
                .with_category("Health")
                .with_stage("2nd reading")
                .withdrawn()
                .defeated(),
            Record::new("3")
                .with_category("Justice")
                .with_stage("2nd reading")
                .with_act(false),
        ])
        .graph_stats();

        assert_eq!(stats.total_bills, 3);
        // 3 bills, 2 categories, 4 outcomes, 2 stages.
        assert_eq!(stats.total_nodes, 11);
        assert_eq!(stats.nodes_by_kind[0], tally("Bill", Some(3)));
        assert_eq!(stats.nodes_by_kind[5], tally("House", None));
        assert_eq!(
            stats.outcomes,
            vec![
                tally("Passed", Some(1)),
                tally("Rejected", Some(1)),
                tally("Withdrawn", Some(1)),
                tally("Defeated", Some(1)),
            ]
        );
        assert_eq!(stats.stages[0], tally("2nd reading", Some(2)));
        assert_eq!(stats.edges_by_relation[0], tally("HAS_CATEGORY", Some(3)));
        assert_eq!(
            stats.total_edges,
            stats.edges_by_relation.iter().map(|t| t.count).sum::<usize>()
        );
    }
}
