//! In-memory bill knowledge graph.
//!
//! A [`KnowledgeGraph`] is produced by one construction run (see
//! [`builder`]) and is immutable afterwards: there is no public mutation
//! API, so a built graph can be shared as `Arc<KnowledgeGraph>` between any
//! number of readers. The "latest graph" of a long-running process lives in a
//! [`GraphStore`], which swaps in freshly built values.
//!
//! # Usage
//!
//! ```ignore
//! use billgraph::graph::{build, KnowledgeGraph};
//! use billgraph::models::Record;
//!
//! let graph = build(&[Record::new("1").with_category("Health")]);
//! assert_eq!(graph.node_count(), 2);
//! ```

pub mod builder;
mod store;

pub use builder::{build, build_with, BuildOptions, GraphBuilder};
pub use store::GraphStore;

use std::collections::{BTreeSet, HashMap};

use crate::models::{Edge, Node, NodeKey, NodeKind, Relation};

/// A shared-vertex multigraph of typed nodes and labeled edges.
///
/// Nodes keep first-insertion order; edges are an ordered set so the same
/// triple is never stored twice and iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeKey, usize>,
    edges: BTreeSet<Edge>,
}

impl KnowledgeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    /// All nodes in first-insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Nodes of a single kind, in first-insertion order.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// All edges, ordered by source, relation, then target.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Edges leaving `key`.
    pub fn outgoing<'a>(&'a self, key: &'a NodeKey) -> impl Iterator<Item = &'a Edge> + 'a {
        let lower = Edge::new(
            key.clone(),
            Relation::HasCategory,
            NodeKey::new(NodeKind::Bill, ""),
        );
        self.edges
            .range(lower..)
            .take_while(move |edge| &edge.source == key)
    }

    /// Edges leaving `key` with the given relation.
    pub fn outgoing_with<'a>(
        &'a self,
        key: &'a NodeKey,
        relation: Relation,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.outgoing(key)
            .filter(move |edge| edge.relation == relation)
    }

    /// Edges entering `key`. Linear in the number of edges.
    pub fn incoming<'a>(&'a self, key: &'a NodeKey) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| &edge.target == key)
    }

    /// Inserts a node if absent and returns it for attribute updates.
    pub(crate) fn upsert_node(&mut self, key: NodeKey) -> &mut Node {
        let next = self.nodes.len();
        let i = *self.index.entry(key.clone()).or_insert(next);
        if i == next {
            self.nodes.push(Node::new(key));
        }
        &mut self.nodes[i]
    }

    /// Inserts an edge; returns false if the triple was already present.
    pub(crate) fn insert_edge(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    pub(crate) fn remove_edge(&mut self, edge: &Edge) -> bool {
        self.edges.remove(edge)
    }

    /// Drops non-bill nodes that no edge touches. Returns how many were removed.
    pub(crate) fn prune_isolated(&mut self) -> usize {
        let mut touched: BTreeSet<&NodeKey> = BTreeSet::new();
        for edge in &self.edges {
            touched.insert(&edge.source);
            touched.insert(&edge.target);
        }
        let keep: Vec<bool> = self
            .nodes
            .iter()
            .map(|n| n.kind() == NodeKind::Bill || touched.contains(&n.key))
            .collect();

        let before = self.nodes.len();
        let mut flags = keep.into_iter();
        self.nodes.retain(|_| flags.next().unwrap_or(true));
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.key.clone(), i))
            .collect();
        before - self.nodes.len()
    }
}

/// Graphs are equal when they hold the same nodes (with the same attributes)
/// and the same edges, regardless of node insertion order.
impl PartialEq for KnowledgeGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.edges == other.edges
            && self.nodes.iter().all(|n| {
                other
                    .node(&n.key)
                    .is_some_and(|m| m.attributes == n.attributes)
            })
    }
}

impl Eq for KnowledgeGraph {}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> NodeKey {
        NodeKey::new(NodeKind::Category, name)
    }

    #[test]
    fn test_upsert_collapses_equal_keys() {
        let mut graph = KnowledgeGraph::new();
        graph.upsert_node(category("Health"));
        graph.upsert_node(category("Health"));
        graph.upsert_node(category("Justice"));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_insert_edge_deduplicates() {
        let mut graph = KnowledgeGraph::new();
        let edge = Edge::new(
            NodeKey::bill("1"),
            Relation::HasCategory,
            category("Health"),
        );
        assert!(graph.insert_edge(edge.clone()));
        assert!(!graph.insert_edge(edge));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_outgoing_only_returns_source_edges() {
        let mut graph = KnowledgeGraph::new();
        let one = NodeKey::bill("1");
        let two = NodeKey::bill("2");
        let a = category("A");
        graph.insert_edge(Edge::new(one.clone(), Relation::HasCategory, a.clone()));
        graph.insert_edge(Edge::new(
            one.clone(),
            Relation::SponsoredBy,
            NodeKey::new(NodeKind::Sponsor, "X"),
        ));
        graph.insert_edge(Edge::new(two.clone(), Relation::HasCategory, a.clone()));

        let from_one: Vec<_> = graph.outgoing(&one).collect();
        assert_eq!(from_one.len(), 2);
        assert!(from_one.iter().all(|e| e.source == one));

        let into_a: Vec<_> = graph.incoming(&a).collect();
        assert_eq!(into_a.len(), 2);

        let categories: Vec<_> = graph
            .outgoing_with(&two, Relation::HasCategory)
            .collect();
        assert_eq!(categories.len(), 1);
    }

    #[test]
    fn test_prune_keeps_bills_and_linked_nodes() {
        let mut graph = KnowledgeGraph::new();
        graph.upsert_node(NodeKey::bill("1"));
        graph.upsert_node(category("Stale"));
        graph.upsert_node(category("Live"));
        graph.insert_edge(Edge::new(
            NodeKey::bill("1"),
            Relation::HasCategory,
            category("Live"),
        ));

        assert_eq!(graph.prune_isolated(), 1);
        assert!(graph.contains(&NodeKey::bill("1")));
        assert!(graph.contains(&category("Live")));
        assert!(!graph.contains(&category("Stale")));
        assert!(graph.node(&category("Live")).is_some());
    }

    #[test]
    fn test_equality_ignores_node_order() {
        let mut a = KnowledgeGraph::new();
        a.upsert_node(category("A"));
        a.upsert_node(category("B"));
        let mut b = KnowledgeGraph::new();
        b.upsert_node(category("B"));
        b.upsert_node(category("A"));
        assert_eq!(a, b);

        b.upsert_node(category("B"))
            .attributes
            .insert("name".to_string(), "B".to_string());
        assert_ne!(a, b);
    }
}
