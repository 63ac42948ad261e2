//! CLI command implementations

pub mod completions;
pub mod generate;
pub mod list;
pub mod match_schema;

use miette::Result;
use std::path::PathBuf;

use crate::core::{Aggregator, Config, FsFixtureReader, KindRegistry, TemplateDoc};

/// Aggregate the suites under `roots` with the configured skip marker
pub(crate) fn ingest(roots: &[PathBuf], config: &Config) -> Result<Vec<TemplateDoc>> {
    let reader = FsFixtureReader::new();
    let registry = KindRegistry::gatekeeper();
    let docs = Aggregator::new(&reader, &registry)
        .with_skip_marker(config.skip_marker())
        .ingest_roots(roots)?;
    Ok(docs)
}
