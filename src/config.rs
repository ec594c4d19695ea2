//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/billgraph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.billgraph.toml`
//! 3. Environment variables: `BILLGRAPH_*`, nested keys separated by `__`
//!    (e.g. `BILLGRAPH_SERVER__PORT=8080`)
//!
//! Every section has defaults, so an empty configuration is valid.
//!
//! # Example
//!
//! ```toml
//! [source]
//! path = "bills_with_policy_area_full.csv"
//!
//! [filter]
//! category = "Education"
//! since = "2022-01-01"
//!
//! [analysis]
//! include_unknown_category = true
//! rejected_outcomes = ["Rejected", "Withdrawn", "Defeated"]
//!
//! [export]
//! out_dir = "out"
//! formats = ["node-link", "graphml", "n-triples"]
//! ```
//!
//! CLI flags take precedence over all of the above.

use std::ops::Deref;
use std::path::PathBuf;

use chrono::NaiveDate;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::export::ExportFormat;
use crate::models::Outcome;
use crate::sources::SourceFormat;

/// Project config file name, resolved relative to the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".billgraph.toml";

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where flat records are read from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    /// Path to a JSON, JSON-lines or CSV export of classified records.
    pub path: Option<PathBuf>,
    /// Explicit format; inferred from the file extension when absent.
    pub format: Option<SourceFormat>,
}

/// Record selection applied before the graph is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Keep only records with this category label.
    pub category: Option<String>,
    /// Keep only records last updated on or after this date.
    pub since: Option<NaiveDate>,
}

/// Graph builder options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildConfig {
    /// Link Unknown stage/sponsor/house nodes instead of omitting the edge.
    #[serde(default)]
    pub link_unknown_facts: bool,
}

/// Query engine options.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Count uncategorised bills under "Unknown" rather than leaving them out.
    #[serde(default = "default_true")]
    pub include_unknown_category: bool,
    /// Outcomes selected by the rejected-bills query.
    #[serde(default = "default_rejected_outcomes")]
    pub rejected_outcomes: Vec<Outcome>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_unknown_category: true,
            rejected_outcomes: default_rejected_outcomes(),
        }
    }
}

/// Export destinations and formats.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// File stem shared by every exported file.
    #[serde(default = "default_basename")]
    pub basename: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,
    /// Base IRI for N-Triples subjects and predicates.
    #[serde(default = "default_base_iri")]
    pub base_iri: String,
    /// Add display colors to node-link nodes.
    #[serde(default)]
    pub styled: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            basename: default_basename(),
            formats: default_formats(),
            base_iri: default_base_iri(),
            styled: false,
        }
    }
}

/// HTTP read surface settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Rebuild the graph from the source every N seconds.
    pub refresh_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            refresh_secs: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rejected_outcomes() -> Vec<Outcome> {
    Outcome::unsuccessful().to_vec()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_basename() -> String {
    "bills_knowledge_graph".to_string()
}

fn default_formats() -> Vec<ExportFormat> {
    vec![
        ExportFormat::NodeLink,
        ExportFormat::Graphml,
        ExportFormat::NTriples,
    ]
}

fn default_base_iri() -> String {
    "urn:billgraph:".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5050
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The layered provider stack used by [`Config::load`].
    pub fn figment() -> Figment {
        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(PROJECT_CONFIG_FILE))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("BILLGRAPH_").split("__"))
    }

    /// User config path: ~/.config/billgraph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("billgraph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("billgraph").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_any_config() {
        Jail::expect_with(|_jail| {
            let config = Config::load().expect("empty config is valid");
            assert!(config.source.path.is_none());
            assert!(config.analysis.include_unknown_category);
            assert_eq!(
                config.analysis.rejected_outcomes,
                Outcome::unsuccessful().to_vec()
            );
            assert_eq!(config.server.port, 5050);
            assert_eq!(config.export.basename, "bills_knowledge_graph");
            Ok(())
        });
    }

    #[test]
    fn test_project_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                PROJECT_CONFIG_FILE,
                r#"
                [source]
                path = "bills.csv"

                [filter]
                category = "Education"
                since = "2022-01-01"

                [analysis]
                rejected_outcomes = ["Rejected", "Withdrawn"]

                [export]
                formats = ["node-link", "facts"]
                "#,
            )?;
            jail.set_env("BILLGRAPH_SERVER__PORT", "8080");
            jail.set_env("BILLGRAPH_FILTER__CATEGORY", "Health");

            let config = Config::load().expect("config loads");
            assert_eq!(config.source.path, Some(PathBuf::from("bills.csv")));
            assert_eq!(config.filter.category.as_deref(), Some("Health"));
            assert_eq!(
                config.filter.since,
                NaiveDate::from_ymd_opt(2022, 1, 1)
            );
            assert_eq!(
                config.analysis.rejected_outcomes,
                vec![Outcome::Rejected, Outcome::Withdrawn]
            );
            assert_eq!(
                config.export.formats,
                vec![ExportFormat::NodeLink, ExportFormat::Facts]
            );
            assert_eq!(config.server.port, 8080);
            Ok(())
        });
    }
}
