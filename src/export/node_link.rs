//! Node-link JSON documents, the interchange format for external viewers.
//!
//! ```json
//! { "nodes": [ { "id": "Bill_1", "label": "Bill", "title": "..." } ],
//!   "edges": [ { "from": "Bill_1", "to": "Category_Health", "label": "HAS_CATEGORY" } ] }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::graph::KnowledgeGraph;
use crate::models::{Edge, NodeKey, NodeKind, Relation};

/// A serialized graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    pub nodes: Vec<NodeLinkNode>,
    /// Also read from `links`, the key networkx writes.
    #[serde(alias = "links")]
    pub edges: Vec<NodeLinkEdge>,
}

/// A serialized node: id, kind label, optional display color, then attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    /// `<kind>_<value>`.
    pub id: String,
    /// Node kind.
    pub label: String,
    /// Display color; only written by styled exports and ignored on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

/// A serialized edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    #[serde(alias = "source")]
    pub from: String,
    #[serde(alias = "target")]
    pub to: String,
    /// Relation label.
    #[serde(alias = "relation")]
    pub label: String,
}

/// Serializes a graph to a node-link document.
pub fn to_node_link(graph: &KnowledgeGraph, styled: bool) -> NodeLinkDocument {
    let nodes = graph
        .nodes()
        .map(|node| NodeLinkNode {
            id: node.key.id(),
            label: node.kind().to_string(),
            color: styled.then(|| node.kind().color().to_string()),
            attributes: node
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        })
        .collect();

    let edges = graph
        .edges()
        .map(|edge| NodeLinkEdge {
            from: edge.source.id(),
            to: edge.target.id(),
            label: edge.relation.to_string(),
        })
        .collect();

    NodeLinkDocument { nodes, edges }
}

/// Rebuilds a graph from a node-link document.
///
/// Non-string attribute values are kept as their JSON text; nulls are
/// dropped. Edges must reference declared nodes.
pub fn from_node_link(doc: &NodeLinkDocument) -> Result<KnowledgeGraph, AppError> {
    let mut graph = KnowledgeGraph::new();
    let mut ids: HashMap<&str, NodeKey> = HashMap::with_capacity(doc.nodes.len());

    for raw in &doc.nodes {
        let kind: NodeKind = raw.label.parse().map_err(AppError::InvalidDocument)?;
        let value = raw
            .id
            .strip_prefix(kind.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(|| {
                AppError::InvalidDocument(format!(
                    "node id '{}' does not match its label '{}'",
                    raw.id, raw.label
                ))
            })?;

        let key = NodeKey::new(kind, value);
        let node = graph.upsert_node(key.clone());
        for (name, value) in &raw.attributes {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            node.attributes.insert(name.clone(), text);
        }
        ids.insert(raw.id.as_str(), key);
    }

    for raw in &doc.edges {
        let endpoint = |id: &str| {
            ids.get(id).cloned().ok_or_else(|| {
                AppError::InvalidDocument(format!("edge references unknown node '{}'", id))
            })
        };
        let relation: Relation = raw.label.parse().map_err(AppError::InvalidDocument)?;
        graph.insert_edge(Edge::new(endpoint(&raw.from)?, relation, endpoint(&raw.to)?));
    }

    Ok(graph)
}

/// Parses a node-link JSON string into a graph.
pub fn parse_node_link(json: &str) -> Result<KnowledgeGraph, AppError> {
    let doc: NodeLinkDocument = serde_json::from_str(json)?;
    from_node_link(&doc)
}
