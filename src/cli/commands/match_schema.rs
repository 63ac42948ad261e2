//! `docgen match` command - Document the constraint `match` section

use miette::Result;

use crate::core::Config;
use crate::schema::{SchemaRenderer, TemplateGenerator};

#[derive(clap::Args, Debug)]
pub struct MatchArgs {}

pub fn run(_args: MatchArgs) -> Result<()> {
    let config = Config::load();
    let generator = TemplateGenerator::new(SchemaRenderer::new(config.column_budget()))?;
    println!("{}", generator.present_match()?);
    Ok(())
}
