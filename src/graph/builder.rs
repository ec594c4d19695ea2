//! Graph construction from normalized records.
//!
//! Records are applied in input order. Category, stage, sponsor and house
//! are current-state facts: a bill holds at most one edge per relation and a
//! later record replaces it. Outcomes are historical facts: edges accumulate
//! (deduplicated), so a bill can be both withdrawn and defeated.

use std::collections::HashMap;

use crate::models::{
    Attr, Edge, NodeKey, NodeKind, Record, Relation, ATTR_LAST_UPDATE, ATTR_NAME, ATTR_TITLE,
    UNKNOWN,
};

use super::KnowledgeGraph;

/// Options controlling node derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Link "Unknown" stage, sponsor and house nodes when a record has no
    /// value, instead of producing no edge.
    pub link_unknown_facts: bool,
}

/// Incremental builder: feed records with [`GraphBuilder::add`], then
/// [`GraphBuilder::finish`] to obtain the immutable graph.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    options: BuildOptions,
    graph: KnowledgeGraph,
    /// Current target of each single-valued relation, per bill.
    current: HashMap<(NodeKey, Relation), NodeKey>,
    records: usize,
}

impl GraphBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Applies one record to the graph.
    pub fn add(&mut self, record: &Record) {
        self.records += 1;
        let bill = NodeKey::bill(record.id.as_str());

        let node = self.graph.upsert_node(bill.clone());
        match record.title.known() {
            Some(title) => {
                node.attributes
                    .insert(ATTR_TITLE.to_string(), title.to_string());
            }
            None => {
                node.attributes
                    .entry(ATTR_TITLE.to_string())
                    .or_insert_with(|| UNKNOWN.to_string());
            }
        }
        if let Some(date) = record.last_update {
            node.attributes.insert(
                ATTR_LAST_UPDATE.to_string(),
                date.format("%Y-%m-%d").to_string(),
            );
        }

        // Category is always linked; an unlabeled bill falls into "Unknown".
        if record.category.is_known() || !self.has_current(&bill, Relation::HasCategory) {
            self.set_current(
                &bill,
                Relation::HasCategory,
                NodeKind::Category,
                record.category.as_str(),
            );
        }

        for outcome in record.outcomes() {
            let target = self.value_node(NodeKind::Outcome, outcome.as_str());
            self.graph
                .insert_edge(Edge::new(bill.clone(), Relation::HasOutcome, target));
        }

        self.set_fact(
            &bill,
            Relation::WentThroughStage,
            NodeKind::Stage,
            &record.stage,
        );
        self.set_fact(
            &bill,
            Relation::SponsoredBy,
            NodeKind::Sponsor,
            &record.sponsor,
        );
        self.set_fact(
            &bill,
            Relation::HandledByHouse,
            NodeKind::House,
            &record.current_house,
        );
        self.set_fact(
            &bill,
            Relation::OriginatedInHouse,
            NodeKind::House,
            &record.origin_house,
        );
    }

    /// Finishes the run, dropping value nodes orphaned by replacements.
    pub fn finish(mut self) -> KnowledgeGraph {
        let pruned = self.graph.prune_isolated();
        tracing::debug!(
            records = self.records,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            pruned,
            "Graph built"
        );
        self.graph
    }

    /// Links an optional current-state fact, honouring `link_unknown_facts`.
    ///
    /// An unknown value leaves any previously derived edge untouched.
    fn set_fact(&mut self, bill: &NodeKey, relation: Relation, kind: NodeKind, value: &Attr) {
        if value.is_known()
            || (self.options.link_unknown_facts && !self.has_current(bill, relation))
        {
            self.set_current(bill, relation, kind, value.as_str());
        }
    }

    fn has_current(&self, bill: &NodeKey, relation: Relation) -> bool {
        self.current.contains_key(&(bill.clone(), relation))
    }

    /// Points a single-valued relation at `value`, replacing any earlier target.
    fn set_current(&mut self, bill: &NodeKey, relation: Relation, kind: NodeKind, value: &str) {
        let target = self.value_node(kind, value);
        let slot = (bill.clone(), relation);

        if let Some(previous) = self.current.get(&slot) {
            if *previous == target {
                return;
            }
            let stale = Edge::new(bill.clone(), relation, previous.clone());
            self.graph.remove_edge(&stale);
            tracing::debug!(
                bill = %bill,
                relation = %relation,
                from = %previous,
                to = %target,
                "Replaced current-state edge"
            );
        }

        self.graph
            .insert_edge(Edge::new(bill.clone(), relation, target.clone()));
        self.current.insert(slot, target);
    }

    /// Inserts (or reuses) a value node carrying its `name` attribute.
    fn value_node(&mut self, kind: NodeKind, value: &str) -> NodeKey {
        let key = NodeKey::new(kind, value);
        self.graph
            .upsert_node(key.clone())
            .attributes
            .entry(ATTR_NAME.to_string())
            .or_insert_with(|| value.to_string());
        key
    }
}

/// Builds a graph with default options.
pub fn build(records: &[Record]) -> KnowledgeGraph {
    build_with(records, BuildOptions::default())
}

/// Builds a graph from records applied in input order.
pub fn build_with(records: &[Record], options: BuildOptions) -> KnowledgeGraph {
    let mut builder = GraphBuilder::new(options);
    for record in records {
        builder.add(record);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(kind: NodeKind, value: &str) -> NodeKey {
        NodeKey::new(kind, value)
    }

    fn targets(graph: &KnowledgeGraph, bill: &str, relation: Relation) -> Vec<String> {
        let bill = NodeKey::bill(bill);
        graph
            .outgoing_with(&bill, relation)
            .map(|e| e.target.value.clone())
            .collect()
    }

    #[test]
    fn test_one_bill_node_per_identifier() {
        let records = vec![
            Record::new("1").with_category("Health"),
            Record::new("2").with_category("Health"),
            Record::new("1").with_category("Health"),
        ];
        let graph = build(&records);
        assert_eq!(graph.nodes_of(NodeKind::Bill).count(), 2);
        assert_eq!(graph.nodes_of(NodeKind::Category).count(), 1);
    }

    #[test]
    fn test_withdrawn_and_defeated_produce_two_outcome_edges() {
        let graph = build(&[Record::new("1").withdrawn().defeated()]);
        let mut outcomes = targets(&graph, "1", Relation::HasOutcome);
        outcomes.sort();
        assert_eq!(outcomes, vec!["Defeated", "Withdrawn"]);
    }

    #[test]
    fn test_outcomes_accumulate_across_records() {
        let graph = build(&[
            Record::new("1").with_act(false),
            Record::new("1").withdrawn(),
            Record::new("1").with_act(false),
        ]);
        let outcomes = targets(&graph, "1", Relation::HasOutcome);
        assert_eq!(outcomes, vec!["Rejected", "Withdrawn"]);
    }

    #[test]
    fn test_unknown_act_without_flags_has_no_outcome() {
        let graph = build(&[Record::new("1").with_category("Health")]);
        assert!(targets(&graph, "1", Relation::HasOutcome).is_empty());
        assert_eq!(graph.nodes_of(NodeKind::Outcome).count(), 0);
    }

    #[test]
    fn test_later_category_replaces_earlier() {
        let graph = build(&[
            Record::new("1").with_category("Health"),
            Record::new("1").with_category("Justice"),
        ]);
        assert_eq!(targets(&graph, "1", Relation::HasCategory), vec!["Justice"]);
        // The superseded category has no bills left and is pruned.
        assert!(!graph.contains(&key(NodeKind::Category, "Health")));
    }

    #[test]
    fn test_replaced_category_kept_when_still_used() {
        let graph = build(&[
            Record::new("1").with_category("Health"),
            Record::new("2").with_category("Health"),
            Record::new("1").with_category("Justice"),
        ]);
        assert_eq!(targets(&graph, "1", Relation::HasCategory), vec!["Justice"]);
        assert_eq!(targets(&graph, "2", Relation::HasCategory), vec!["Health"]);
        assert!(graph.contains(&key(NodeKind::Category, "Health")));
    }

    #[test]
    fn test_missing_category_links_unknown() {
        let graph = build(&[Record::new("1")]);
        assert_eq!(targets(&graph, "1", Relation::HasCategory), vec!["Unknown"]);
    }

    #[test]
    fn test_later_label_replaces_unknown_category_but_not_the_reverse() {
        let graph = build(&[
            Record::new("1"),
            Record::new("1").with_category("Health"),
            Record::new("1"),
        ]);
        assert_eq!(targets(&graph, "1", Relation::HasCategory), vec!["Health"]);
        assert!(!graph.contains(&key(NodeKind::Category, "Unknown")));
    }

    #[test]
    fn test_current_state_facts_replace() {
        let graph = build(&[
            Record::new("1")
                .with_stage("1st reading")
                .with_sponsor("A. Member")
                .with_houses("Commons", "Commons"),
            Record::new("1")
                .with_stage("Royal Assent")
                .with_sponsor("B. Member")
                .with_houses("Commons", "Lords"),
        ]);
        assert_eq!(
            targets(&graph, "1", Relation::WentThroughStage),
            vec!["Royal Assent"]
        );
        assert_eq!(
            targets(&graph, "1", Relation::SponsoredBy),
            vec!["B. Member"]
        );
        assert_eq!(
            targets(&graph, "1", Relation::HandledByHouse),
            vec!["Lords"]
        );
        assert_eq!(
            targets(&graph, "1", Relation::OriginatedInHouse),
            vec!["Commons"]
        );
        assert!(!graph.contains(&key(NodeKind::Stage, "1st reading")));
        // Commons is still the origin house, so the node survives.
        assert!(graph.contains(&key(NodeKind::House, "Commons")));
    }

    #[test]
    fn test_unknown_fact_keeps_previous_edge() {
        let graph = build(&[
            Record::new("1").with_stage("Committee stage"),
            Record::new("1"),
        ]);
        assert_eq!(
            targets(&graph, "1", Relation::WentThroughStage),
            vec!["Committee stage"]
        );
    }

    #[test]
    fn test_unknown_facts_omitted_by_default() {
        let graph = build(&[Record::new("1")]);
        assert!(targets(&graph, "1", Relation::WentThroughStage).is_empty());
        assert!(targets(&graph, "1", Relation::SponsoredBy).is_empty());
        assert!(targets(&graph, "1", Relation::HandledByHouse).is_empty());
    }

    #[test]
    fn test_link_unknown_facts_option() {
        let options = BuildOptions {
            link_unknown_facts: true,
        };
        let graph = build_with(
            &[Record::new("1"), Record::new("1").with_stage("Report stage")],
            options,
        );
        assert_eq!(
            targets(&graph, "1", Relation::WentThroughStage),
            vec!["Report stage"]
        );
        assert_eq!(targets(&graph, "1", Relation::SponsoredBy), vec!["Unknown"]);
        assert!(graph.contains(&key(NodeKind::House, "Unknown")));
        assert!(!graph.contains(&key(NodeKind::Stage, "Unknown")));
    }

    #[test]
    fn test_title_last_write_wins_but_unknown_never_overwrites() {
        let graph = build(&[
            Record::new("1"),
            Record::new("1").with_title("First"),
            Record::new("1").with_title("Second"),
            Record::new("1"),
        ]);
        let bill = graph.node(&NodeKey::bill("1")).unwrap();
        assert_eq!(bill.attribute(ATTR_TITLE), Some("Second"));
    }

    #[test]
    fn test_untitled_bill_gets_unknown_title_and_date() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        let graph = build(&[Record::new("9").with_last_update(date)]);
        let bill = graph.node(&NodeKey::bill("9")).unwrap();
        assert_eq!(bill.attribute(ATTR_TITLE), Some("Unknown"));
        assert_eq!(bill.attribute(ATTR_LAST_UPDATE), Some("2023-07-01"));
    }

    #[test]
    fn test_value_nodes_carry_name() {
        let graph = build(&[Record::new("1").with_category("Social Care")]);
        let node = graph.node(&key(NodeKind::Category, "Social Care")).unwrap();
        assert_eq!(node.attribute(ATTR_NAME), Some("Social Care"));
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        let graph = build(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
