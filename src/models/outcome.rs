//! Outcome enum for the historical facts recorded against a bill.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Terminal or intermediate outcomes a bill can accumulate.
///
/// Unlike category or stage, a bill may carry several outcomes at once
/// (e.g. both withdrawn and defeated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Rejected,
    Withdrawn,
    Defeated,
}

impl Outcome {
    /// Returns all outcomes in reporting order.
    pub fn all() -> &'static [Outcome] {
        &[
            Outcome::Passed,
            Outcome::Rejected,
            Outcome::Withdrawn,
            Outcome::Defeated,
        ]
    }

    /// Outcomes counted as "not passed" by the rejected-bills query.
    pub fn unsuccessful() -> &'static [Outcome] {
        &[Outcome::Rejected, Outcome::Withdrawn, Outcome::Defeated]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "Passed",
            Outcome::Rejected => "Rejected",
            Outcome::Withdrawn => "Withdrawn",
            Outcome::Defeated => "Defeated",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Passed" | "passed" => Ok(Outcome::Passed),
            "Rejected" | "rejected" => Ok(Outcome::Rejected),
            "Withdrawn" | "withdrawn" => Ok(Outcome::Withdrawn),
            "Defeated" | "defeated" => Ok(Outcome::Defeated),
            _ => Err(format!(
                "Invalid outcome '{}'. Valid values: Passed, Rejected, Withdrawn, Defeated",
                s
            )),
        }
    }
}
