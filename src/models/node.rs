//! Typed graph nodes keyed by `(kind, value)`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The type tag of a graph vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Bill,
    Category,
    Outcome,
    Stage,
    Sponsor,
    House,
}

impl NodeKind {
    /// Returns a static slice of all kinds in display order.
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::Bill,
            NodeKind::Category,
            NodeKind::Outcome,
            NodeKind::Stage,
            NodeKind::Sponsor,
            NodeKind::House,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Bill => "Bill",
            NodeKind::Category => "Category",
            NodeKind::Outcome => "Outcome",
            NodeKind::Stage => "Stage",
            NodeKind::Sponsor => "Sponsor",
            NodeKind::House => "House",
        }
    }

    /// Display color used by styled node-link exports.
    pub fn color(&self) -> &'static str {
        match self {
            NodeKind::Bill => "#4F9DFF",
            NodeKind::Category => "#47D16C",
            NodeKind::Outcome => "#E5484D",
            NodeKind::Stage => "#FFA500",
            NodeKind::Sponsor => "#A463F2",
            NodeKind::House => "#8D8D8D",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid node kind '{}'. Valid values: Bill, Category, Outcome, Stage, Sponsor, House",
                    s
                )
            })
    }
}

/// Stable node identity. Two derivations with the same key are the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub value: String,
}

impl NodeKey {
    pub fn new(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn bill(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Bill, id)
    }

    /// Renders the key as `<kind>_<value>`.
    ///
    /// Kind names contain no underscore, so the first `_` always separates
    /// the two parts and ids never collide across kinds.
    pub fn id(&self) -> String {
        format!("{}_{}", self.kind, self.value)
    }

    /// Parses an id produced by [`NodeKey::id`].
    pub fn parse_id(id: &str) -> Result<Self, String> {
        let (kind, value) = id
            .split_once('_')
            .ok_or_else(|| format!("Node id '{}' has no kind prefix", id))?;
        Ok(Self::new(kind.parse()?, value))
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.kind, self.value)
    }
}

/// Attribute name carrying a bill's title.
pub const ATTR_TITLE: &str = "title";
/// Attribute name carrying a bill's last update date.
pub const ATTR_LAST_UPDATE: &str = "lastUpdate";
/// Attribute name carrying the display name of non-bill nodes.
pub const ATTR_NAME: &str = "name";

/// A graph vertex with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub key: NodeKey,
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    pub fn new(key: NodeKey) -> Self {
        Self {
            key,
            attributes: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.key.kind
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Human-readable label: the title for bills, the key value otherwise.
    pub fn display_name(&self) -> &str {
        match self.key.kind {
            NodeKind::Bill => self.attribute(ATTR_TITLE).unwrap_or(&self.key.value),
            _ => &self.key.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_key_id_roundtrip_with_underscores() {
        let key = NodeKey::new(NodeKind::Stage, "Committee_stage");
        assert_eq!(key.id(), "Stage_Committee_stage");
        assert_eq!(NodeKey::parse_id(&key.id()).unwrap(), key);
    }

    #[test]
    fn test_node_key_ids_distinct_across_kinds() {
        let a = NodeKey::new(NodeKind::Category, "Other");
        let b = NodeKey::new(NodeKind::Stage, "Other");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_parse_id_rejects_unknown_kind() {
        assert!(NodeKey::parse_id("Party_Labour").is_err());
        assert!(NodeKey::parse_id("NoPrefix").is_err());
    }

    #[test]
    fn test_display_name_prefers_title() {
        let mut node = Node::new(NodeKey::bill("7"));
        assert_eq!(node.display_name(), "7");
        node.attributes
            .insert(ATTR_TITLE.to_string(), "Health Bill".to_string());
        assert_eq!(node.display_name(), "Health Bill");
    }
}
