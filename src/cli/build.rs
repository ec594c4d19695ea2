//! Build command handler.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;

use crate::config::Config;
use crate::export::{write_exports, ExportFormat};
use crate::services::PipelineService;

use super::output::{render, OutputFormat};

/// Build the graph from a record source and write exports.
#[derive(Parser, Debug)]
pub struct BuildCommand {
    /// Record file (overrides source.path)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output directory (overrides export.out_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Export formats (overrides export.formats)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub format: Vec<ExportFormat>,

    /// Add display colors to node-link nodes
    #[arg(long)]
    pub styled: bool,

    /// Print the run summary as text, JSON or TOON
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

impl BuildCommand {
    /// Run the build command.
    pub async fn run(self) -> Result<ExitCode> {
        let config = Config::load()?;

        let mut export = config.export.clone();
        if let Some(out_dir) = self.out_dir {
            export.out_dir = out_dir;
        }
        if !self.format.is_empty() {
            export.formats = self.format;
        }
        export.styled |= self.styled;

        let report = PipelineService::from_config(&config, self.source)?
            .run()
            .await?;
        let written = write_exports(&report.graph, &export, &export.formats).await?;

        print!("{}", render(&report.summary, self.output)?);
        if self.output == OutputFormat::Text {
            for path in &written {
                println!("Wrote {}", path.display());
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
