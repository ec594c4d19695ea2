//! Directed, labeled relations between nodes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::NodeKey;

/// The fixed relation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    HasCategory,
    HasOutcome,
    WentThroughStage,
    SponsoredBy,
    HandledByHouse,
    OriginatedInHouse,
}

impl Relation {
    pub fn all() -> &'static [Relation] {
        &[
            Relation::HasCategory,
            Relation::HasOutcome,
            Relation::WentThroughStage,
            Relation::SponsoredBy,
            Relation::HandledByHouse,
            Relation::OriginatedInHouse,
        ]
    }

    /// Get the relationship label string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::HasCategory => "HAS_CATEGORY",
            Relation::HasOutcome => "HAS_OUTCOME",
            Relation::WentThroughStage => "WENT_THROUGH_STAGE",
            Relation::SponsoredBy => "SPONSORED_BY",
            Relation::HandledByHouse => "HANDLED_BY_HOUSE",
            Relation::OriginatedInHouse => "ORIGINATED_IN_HOUSE",
        }
    }

    /// Whether a bill holds at most one edge of this relation.
    ///
    /// Current-state relations are replaced on re-derivation; outcome
    /// edges accumulate.
    pub fn is_single_valued(&self) -> bool {
        !matches!(self, Relation::HasOutcome)
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Invalid relation '{}'", s))
    }
}

/// A directed edge `(source, relation, target)`.
///
/// Field order drives `Ord`, so ordered edge sets group by source first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub source: NodeKey,
    pub relation: Relation,
    pub target: NodeKey,
}

impl Edge {
    pub fn new(source: NodeKey, relation: Relation, target: NodeKey) -> Self {
        Self {
            source,
            relation,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_as_str() {
        assert_eq!(Relation::HasCategory.as_str(), "HAS_CATEGORY");
        assert_eq!(Relation::WentThroughStage.as_str(), "WENT_THROUGH_STAGE");
        assert_eq!(Relation::OriginatedInHouse.as_str(), "ORIGINATED_IN_HOUSE");
    }

    #[test]
    fn test_relation_parse_matches_label() {
        for relation in Relation::all() {
            assert_eq!(relation.as_str().parse::<Relation>(), Ok(*relation));
        }
        assert!("BELONGS_TO".parse::<Relation>().is_err());
    }

    #[test]
    fn test_only_outcome_is_multi_valued() {
        assert!(!Relation::HasOutcome.is_single_valued());
        assert!(Relation::HasCategory.is_single_valued());
        assert!(Relation::SponsoredBy.is_single_valued());
    }

    #[test]
    fn test_relation_serializes_as_label() {
        let json = serde_json::to_string(&Relation::HandledByHouse).unwrap();
        assert_eq!(json, "\"HANDLED_BY_HOUSE\"");
    }
}
