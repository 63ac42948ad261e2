//! `docgen generate` command - Render the library documentation

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::schema::{SchemaRenderer, TemplateGenerator};

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Directories to search for suite.yaml files
    #[arg(default_value = ".")]
    pub roots: Vec<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let docs = super::ingest(&args.roots, &config)?;
    info!(templates = docs.len(), "aggregated documentation");

    let generator = TemplateGenerator::new(SchemaRenderer::new(config.column_budget()))?;
    let text = generator.present(&docs)?;

    match args.output.or(config.output) {
        Some(path) => {
            write_output(&text, &path)?;
            if !global.quiet {
                println!(
                    "{} Documented {} template(s) in {}",
                    style("✓").green(),
                    docs.len(),
                    style(path.display()).cyan()
                );
            }
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn write_output(content: &str, path: &Path) -> Result<()> {
    let file = File::create(path).into_diagnostic()?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes()).into_diagnostic()?;
    writer.flush().into_diagnostic()?;
    Ok(())
}
