//! `docgen list` command - Summarize discovered templates

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::GlobalOpts;
use crate::core::{Config, TemplateDoc};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListFormat {
    /// Markdown table
    #[default]
    Table,
    /// JSON array (for programming)
    Json,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Directories to search for suite.yaml files
    #[arg(default_value = ".")]
    pub roots: Vec<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = ListFormat::Table)]
    pub format: ListFormat,
}

/// Per-template counts
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TemplateSummary {
    pub name: String,
    pub legacy_schema: bool,
    pub constraints: usize,
    pub allowed: usize,
    pub disallowed: usize,
}

impl From<&TemplateDoc> for TemplateSummary {
    fn from(doc: &TemplateDoc) -> Self {
        Self {
            name: doc.name.clone(),
            legacy_schema: doc.legacy_schema,
            constraints: doc.samples.len(),
            allowed: doc.samples.iter().map(|s| s.allowed.len()).sum(),
            disallowed: doc.samples.iter().map(|s| s.disallowed.len()).sum(),
        }
    }
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let docs = super::ingest(&args.roots, &config)?;
    let summaries: Vec<TemplateSummary> = docs.iter().map(TemplateSummary::from).collect();

    match args.format {
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries).into_diagnostic()?;
            println!("{}", json);
        }
        ListFormat::Table => {
            println!("{}", summary_table(&summaries));
            if !global.quiet {
                println!();
                println!(
                    "{} template(s) found",
                    style(summaries.len()).cyan()
                );
            }
        }
    }
    Ok(())
}

fn summary_table(summaries: &[TemplateSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Template", "Constraints", "Allowed", "Disallowed"]);
    for summary in summaries {
        builder.push_record([
            summary.name.clone(),
            summary.constraints.to_string(),
            summary.allowed.to_string(),
            summary.disallowed.to_string(),
        ]);
    }
    builder.build().with(Style::markdown()).to_string()
}
