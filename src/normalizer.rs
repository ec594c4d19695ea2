//! Record normalization: raw warehouse rows to canonical [`Record`]s.
//!
//! Normalization is pure. Rejections and notices are returned beside the
//! accepted records so the caller decides how to report them.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::models::{Attr, RawRecord, Record};

const ID_COLUMNS: &[&str] = &["billId", "bill_id", "id"];
const TITLE_COLUMNS: &[&str] = &["shortTitle", "short_title", "title"];
const CATEGORY_COLUMNS: &[&str] = &["policyArea", "policy_area", "category", "categoryLabel"];
const STAGE_COLUMNS: &[&str] = &[
    "currentStage_description",
    "current_stage_description",
    "currentStage",
    "stage",
];
const IS_ACT_COLUMNS: &[&str] = &["isAct", "is_act"];
const WITHDRAWN_COLUMNS: &[&str] = &[
    "billWithdrawn",
    "bill_withdrawn",
    "isWithdrawn",
    "is_withdrawn",
];
const DEFEATED_COLUMNS: &[&str] = &["isDefeated", "is_defeated"];
const ORIGIN_HOUSE_COLUMNS: &[&str] = &["originatingHouse", "originating_house", "originHouse"];
const CURRENT_HOUSE_COLUMNS: &[&str] = &["currentHouse", "current_house"];
const SPONSOR_COLUMNS: &[&str] = &["sponsor", "sponsors"];
const LAST_UPDATE_COLUMNS: &[&str] = &["lastUpdate", "last_update"];

/// Why a raw record was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// No identifier column, or an empty one.
    MissingIdentifier,
    /// An identifier that is not text or an integral number.
    InvalidIdentifier { value: String },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MissingIdentifier => f.write_str("missing identifier"),
            RejectReason::InvalidIdentifier { value } => {
                write!(f, "invalid identifier '{}'", value)
            }
        }
    }
}

/// A rejected input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Position of the row in the input sequence.
    pub index: usize,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// A non-fatal condition found while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// A date that could not be parsed; the field was treated as absent.
    MalformedDate {
        index: usize,
        id: String,
        value: String,
    },
    /// An identifier seen more than once; later rows refresh earlier ones.
    DuplicateIdentifier { id: String, count: usize },
}

/// Output of [`normalize_batch`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Accepted records, in input order.
    pub records: Vec<Record>,
    pub rejections: Vec<Rejection>,
    pub notices: Vec<Notice>,
}

impl NormalizedBatch {
    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }
}

/// Normalizes a single raw record.
pub fn normalize(raw: &RawRecord) -> Result<Record, RejectReason> {
    normalize_with_date_check(raw).map(|(record, _)| record)
}

/// Normalizes a sequence of raw records, collecting rejections and notices.
pub fn normalize_batch(raws: &[RawRecord]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for (index, raw) in raws.iter().enumerate() {
        match normalize_with_date_check(raw) {
            Ok((record, malformed_date)) => {
                if let Some(value) = malformed_date {
                    batch.notices.push(Notice::MalformedDate {
                        index,
                        id: record.id.clone(),
                        value,
                    });
                }
                let count = seen.entry(record.id.clone()).or_insert(0);
                if *count == 0 {
                    first_seen.push(record.id.clone());
                }
                *count += 1;
                batch.records.push(record);
            }
            Err(reason) => batch.rejections.push(Rejection { index, reason }),
        }
    }

    for id in first_seen {
        let count = seen[&id];
        if count > 1 {
            batch
                .notices
                .push(Notice::DuplicateIdentifier { id, count });
        }
    }

    batch
}

/// Normalizes a record and reports the raw date text if it failed to parse.
fn normalize_with_date_check(raw: &RawRecord) -> Result<(Record, Option<String>), RejectReason> {
    let id = identifier(raw.lookup(ID_COLUMNS))?;

    let (last_update, malformed_date) = match raw.lookup(LAST_UPDATE_COLUMNS).and_then(text) {
        Some(value) => match parse_date(&value) {
            Some(date) => (Some(date), None),
            None => (None, Some(value)),
        },
        None => (None, None),
    };

    let record = Record {
        id,
        title: attr(raw.lookup(TITLE_COLUMNS)),
        category: attr(raw.lookup(CATEGORY_COLUMNS)),
        stage: stage(raw.lookup(STAGE_COLUMNS)),
        is_act: raw.lookup(IS_ACT_COLUMNS).and_then(flag),
        is_withdrawn: raw.lookup(WITHDRAWN_COLUMNS).is_some_and(withdrawn),
        is_defeated: raw.lookup(DEFEATED_COLUMNS).and_then(flag) == Some(true),
        origin_house: attr(raw.lookup(ORIGIN_HOUSE_COLUMNS)),
        current_house: attr(raw.lookup(CURRENT_HOUSE_COLUMNS)),
        sponsor: sponsor(raw.lookup(SPONSOR_COLUMNS)),
        last_update,
    };

    Ok((record, malformed_date))
}

fn identifier(value: Option<&Value>) -> Result<String, RejectReason> {
    match value {
        None => Err(RejectReason::MissingIdentifier),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(RejectReason::MissingIdentifier);
            }
            // Integer ids round-tripped through a float column come back as "12.0".
            match s.split_once('.') {
                Some((int, frac))
                    if !int.is_empty()
                        && int.bytes().all(|b| b.is_ascii_digit())
                        && frac.bytes().all(|b| b == b'0') =>
                {
                    Ok(int.to_string())
                }
                _ => Ok(s.to_string()),
            }
        }
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                // Integral floats inside i64 only; the cast saturates beyond it.
                let range = i64::MIN as f64..i64::MAX as f64;
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && range.contains(&f) => {
                        Ok(format!("{}", f as i64))
                    }
                    _ => Err(RejectReason::InvalidIdentifier {
                        value: n.to_string(),
                    }),
                }
            }
        }
        Some(other) => Err(RejectReason::InvalidIdentifier {
            value: other.to_string(),
        }),
    }
}

/// Scalar value as trimmed text; `None` for blanks and structured values.
fn text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn attr(value: Option<&Value>) -> Attr {
    Attr::from_text(value.and_then(text).as_deref())
}

/// Stage description, flat or nested in the upstream `currentStage` object.
fn stage(value: Option<&Value>) -> Attr {
    match value {
        Some(Value::Object(stage)) => attr(stage.get("description")),
        other => attr(other),
    }
}

/// Sponsor name from a flat string, a sponsor object, or a list of them.
fn sponsor(value: Option<&Value>) -> Attr {
    match value {
        Some(Value::Array(items)) => sponsor(items.first()),
        Some(Value::Object(obj)) => match obj.get("name") {
            Some(name) => attr(Some(name)),
            None => match obj.get("member") {
                Some(Value::Object(member)) => attr(member.get("name")),
                _ => Attr::Unknown,
            },
        },
        other => attr(other),
    }
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Withdrawal is reported either as a flag or as the withdrawal timestamp.
fn withdrawn(value: &Value) -> bool {
    flag(value).unwrap_or_else(|| text(value).is_some())
}

/// Parses the date forms seen in the warehouse; `None` when unrecognised.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
