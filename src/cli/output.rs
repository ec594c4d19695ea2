//! Query output rendering for the terminal.

use std::fmt::Write as _;

use color_eyre::eyre::eyre;
use serde::Serialize;

use crate::models::{BillTrace, CategoryCount, GraphStats, OutcomeGroup, RejectionRate, Tally};
use crate::services::BuildSummary;

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// TOON (Token-Oriented Object Notation), compact for prompts.
    Toon,
}

/// A query result that also knows how to print itself as text.
pub trait TextReport: Serialize {
    fn to_text(&self) -> String;
}

/// Renders `value` in the requested format.
pub fn render<T: TextReport + ?Sized>(
    value: &T,
    format: OutputFormat,
) -> color_eyre::Result<String> {
    match format {
        OutputFormat::Text => Ok(value.to_text()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Toon => {
            serde_toon::to_string(&value).map_err(|e| eyre!("TOON serialization error: {}", e))
        }
    }
}

impl TextReport for [CategoryCount] {
    fn to_text(&self) -> String {
        if self.is_empty() {
            return "No categorised bills.\n".to_string();
        }
        let width = self.iter().map(|c| c.category.len()).max().unwrap_or(0);
        let mut out = String::new();
        for c in self {
            let _ = writeln!(out, "{:<width$}  {}", c.category, c.count, width = width);
        }
        out
    }
}

impl TextReport for [OutcomeGroup] {
    fn to_text(&self) -> String {
        if self.is_empty() {
            return "No matching bills.\n".to_string();
        }
        let mut out = String::new();
        for group in self {
            let _ = writeln!(out, "{} ({})", group.category, group.len());
            for title in &group.titles {
                let _ = writeln!(out, "  - {}", title);
            }
        }
        out
    }
}

impl TextReport for BillTrace {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.id, self.title);
        for group in &self.relations {
            let _ = writeln!(out, "  {}", group.relation);
            for neighbor in &group.neighbors {
                let _ = writeln!(out, "    {} ({})", neighbor.name, neighbor.id);
            }
        }
        out
    }
}

impl TextReport for [RejectionRate] {
    fn to_text(&self) -> String {
        if self.is_empty() {
            return "No categorised bills.\n".to_string();
        }
        let width = self.iter().map(|r| r.category.len()).max().unwrap_or(0);
        let mut out = String::new();
        for r in self {
            let _ = writeln!(
                out,
                "{:<width$}  {:>6.2}%  ({}/{})",
                r.category,
                r.rejection_rate_percent,
                r.rejected_bills,
                r.total_bills,
                width = width
            );
        }
        out
    }
}

impl TextReport for GraphStats {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Bills: {}", self.total_bills);
        let _ = writeln!(out, "Nodes: {}", self.total_nodes);
        let _ = writeln!(out, "Edges: {}", self.total_edges);
        tallies(&mut out, "Nodes by kind", &self.nodes_by_kind);
        tallies(&mut out, "Edges by relation", &self.edges_by_relation);
        tallies(&mut out, "Outcomes", &self.outcomes);
        tallies(&mut out, "Stages", &self.stages);
        out
    }
}

impl TextReport for BuildSummary {
    fn to_text(&self) -> String {
        format!(
            "Loaded {} records: {} accepted, {} rejected, {} filtered out\nGraph: {} nodes, {} edges\n",
            self.loaded, self.accepted, self.rejected, self.filtered_out, self.nodes, self.edges
        )
    }
}

fn tallies(out: &mut String, heading: &str, items: &[Tally]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}:", heading);
    for t in items {
        let _ = writeln!(out, "  {}: {}", t.name, t.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Vec<CategoryCount> {
        vec![
            CategoryCount {
                category: "Health".to_string(),
                count: 2,
            },
            CategoryCount {
                category: "Justice".to_string(),
                count: 1,
            },
        ]
    }

    #[test]
    fn test_text_summary_aligns_columns() {
        let text = render(summary().as_slice(), OutputFormat::Text).unwrap();
        assert_eq!(text, "Health   2\nJustice  1\n");
    }

    #[test]
    fn test_json_output() {
        let json = render(summary().as_slice(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["category"], "Health");
        assert_eq!(value[1]["count"], 1);
    }

    #[test]
    fn test_toon_output_mentions_fields() {
        let toon = render(summary().as_slice(), OutputFormat::Toon).unwrap();
        assert!(toon.contains("Health"));
        assert!(toon.contains("Justice"));
    }

    #[test]
    fn test_empty_groups_text() {
        let groups: Vec<OutcomeGroup> = Vec::new();
        assert_eq!(
            render(groups.as_slice(), OutputFormat::Text).unwrap(),
            "No matching bills.\n"
        );
    }
}
