//! Flat bill records as they arrive from the warehouse, and their normalized form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Outcome;

/// Placeholder rendered for any attribute the source did not provide.
pub const UNKNOWN: &str = "Unknown";

/// An optional text attribute with an explicit unknown state.
///
/// Empty and whitespace-only values are never `Known`, so downstream code
/// can key nodes on [`Attr::as_str`] without guarding against blanks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Attr {
    Known(String),
    #[default]
    Unknown,
}

impl Attr {
    /// Builds an attribute from optional text, trimming surrounding whitespace.
    pub fn from_text(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() && v != UNKNOWN => Attr::Known(v.to_string()),
            _ => Attr::Unknown,
        }
    }

    /// Returns the value, or `"Unknown"`.
    pub fn as_str(&self) -> &str {
        match self {
            Attr::Known(v) => v,
            Attr::Unknown => UNKNOWN,
        }
    }

    /// Returns the value only when known.
    pub fn known(&self) -> Option<&str> {
        match self {
            Attr::Known(v) => Some(v),
            Attr::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Attr::Known(_))
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Attr::from_text(Some(value))
    }
}

impl std::fmt::Display for Attr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw record: one JSON object (or CSV row) keyed by source column name.
///
/// Column names differ between the upstream API, the warehouse export and the
/// local SQLite mirror, so lookups go through alias lists rather than fixed
/// struct fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    /// Returns the first non-null value among `aliases`.
    pub fn lookup(&self, aliases: &[&str]) -> Option<&Value> {
        aliases
            .iter()
            .filter_map(|name| self.0.get(*name))
            .find(|v| !v.is_null())
    }

    /// Inserts a column value, replacing any previous one.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A validated bill record with every optional field made explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Stable bill identifier.
    pub id: String,
    pub title: Attr,
    /// Category label assigned by the external classifier.
    pub category: Attr,
    /// Description of the bill's current stage.
    pub stage: Attr,
    /// `Some(true)` once enacted, `Some(false)` when not, `None` when unreported.
    pub is_act: Option<bool>,
    pub is_withdrawn: bool,
    pub is_defeated: bool,
    pub origin_house: Attr,
    pub current_house: Attr,
    pub sponsor: Attr,
    pub last_update: Option<NaiveDate>,
}

impl Record {
    /// Creates a record with the given identifier and every other field unknown.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Attr::Unknown,
            category: Attr::Unknown,
            stage: Attr::Unknown,
            is_act: None,
            is_withdrawn: false,
            is_defeated: false,
            origin_house: Attr::Unknown,
            current_house: Attr::Unknown,
            sponsor: Attr::Unknown,
            last_update: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_stage(mut self, stage: &str) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn with_sponsor(mut self, sponsor: &str) -> Self {
        self.sponsor = sponsor.into();
        self
    }

    pub fn with_houses(mut self, origin: &str, current: &str) -> Self {
        self.origin_house = origin.into();
        self.current_house = current.into();
        self
    }

    pub fn with_act(mut self, is_act: bool) -> Self {
        self.is_act = Some(is_act);
        self
    }

    pub fn withdrawn(mut self) -> Self {
        self.is_withdrawn = true;
        self
    }

    pub fn defeated(mut self) -> Self {
        self.is_defeated = true;
        self
    }

    pub fn with_last_update(mut self, date: NaiveDate) -> Self {
        self.last_update = Some(date);
        self
    }

    /// Derives the outcome set for this record.
    ///
    /// The enactment flag yields Passed or Rejected; withdrawal and defeat are
    /// independent and may both be present. An unreported enactment flag with
    /// no other flags yields an empty set.
    pub fn outcomes(&self) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(2);
        match self.is_act {
            Some(true) => outcomes.push(Outcome::Passed),
            Some(false) => outcomes.push(Outcome::Rejected),
            None => {}
        }
        if self.is_withdrawn {
            outcomes.push(Outcome::Withdrawn);
        }
        if self.is_defeated {
            outcomes.push(Outcome::Defeated);
        }
        outcomes
    }
}
