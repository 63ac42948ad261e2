//! Suite aggregation
//!
//! Folds every test of every suite into one [`TemplateDoc`] per template
//! kind. The same constraint may be exercised by several tests or suites;
//! its examples are merged into a single sample.

use miette::Diagnostic;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::doc::{merge_samples, ConflictError, Sample, TemplateDoc};
use crate::core::loader::{FixtureError, FixtureReader, Suite, SuiteTest, TestCase};
use crate::core::object::{Object, ObjectRef};
use crate::core::registry::KindRegistry;

pub const DOC_GEN_ANNOTATION: &str = "policy.library/doc-gen";
pub const DO_NOT_DOCUMENT: &str = "do_not_document";

#[derive(Debug, Error, Diagnostic)]
pub enum AggregateError {
    #[error("reading {context}")]
    #[diagnostic(code(docgen::ingest))]
    Ingest {
        context: String,
        #[source]
        #[diagnostic_source]
        source: FixtureError,
    },

    #[error("merging constraint in test {test:?}, suite {suite:?}")]
    #[diagnostic(code(docgen::ingest::conflict))]
    Conflict {
        test: String,
        suite: String,
        #[source]
        #[diagnostic_source]
        source: ConflictError,
    },

    #[error("generated no documentation data from input dirs: {}", format_roots(.roots))]
    #[diagnostic(
        code(docgen::ingest::empty),
        help("each root should contain suite.yaml files whose tests reference constraint templates")
    )]
    EmptyResult { roots: Vec<PathBuf> },
}

fn format_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Constraint annotation that keeps a test out of the docs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipMarker {
    pub annotation: String,
    pub value: String,
}

impl Default for SkipMarker {
    fn default() -> Self {
        Self {
            annotation: DOC_GEN_ANNOTATION.to_string(),
            value: DO_NOT_DOCUMENT.to_string(),
        }
    }
}

impl SkipMarker {
    pub fn matches(&self, object: &Object) -> bool {
        object.annotation(&self.annotation) == Some(self.value.as_str())
    }
}

/// Builds the documentation model from suites
pub struct Aggregator<'a, R: FixtureReader> {
    reader: &'a R,
    registry: &'a KindRegistry,
    skip: SkipMarker,
}

impl<'a, R: FixtureReader> Aggregator<'a, R> {
    pub fn new(reader: &'a R, registry: &'a KindRegistry) -> Self {
        Self {
            reader,
            registry,
            skip: SkipMarker::default(),
        }
    }

    pub fn with_skip_marker(mut self, skip: SkipMarker) -> Self {
        self.skip = skip;
        self
    }

    /// Read the suites under every root and aggregate them together, so a
    /// template appearing under several roots still yields one document.
    pub fn ingest_roots<P: AsRef<Path>>(
        &self,
        roots: &[P],
    ) -> Result<Vec<TemplateDoc>, AggregateError> {
        let mut suites = Vec::new();
        for root in roots {
            let root = root.as_ref();
            let found = self
                .reader
                .read_suites(root)
                .map_err(|source| AggregateError::Ingest {
                    context: format!("suites under {}", root.display()),
                    source,
                })?;
            info!(root = %root.display(), suites = found.len(), "read suites");
            suites.extend(found);
        }

        let docs = self.aggregate(&suites)?;
        if docs.is_empty() {
            return Err(AggregateError::EmptyResult {
                roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
            });
        }
        Ok(docs)
    }

    /// One document per template kind, sorted by kind name
    pub fn aggregate(&self, suites: &[Suite]) -> Result<Vec<TemplateDoc>, AggregateError> {
        let mut docs: BTreeMap<String, TemplateDoc> = BTreeMap::new();

        for suite in suites {
            for test in &suite.tests {
                let template_path = suite.dir().join(&test.template);
                let template = self
                    .reader
                    .read_template(self.registry, &template_path)
                    .map_err(|source| AggregateError::Ingest {
                        context: format!("template of test {:?}, suite {:?}", test.name, suite.name()),
                        source,
                    })?;

                let constraint_path = suite.dir().join(&test.constraint);
                let constraint = self.reader.read_object(&constraint_path).map_err(|source| {
                    AggregateError::Ingest {
                        context: format!(
                            "constraint of test {:?}, suite {:?}",
                            test.name,
                            suite.name()
                        ),
                        source,
                    }
                })?;

                if self.skip.matches(&constraint) {
                    debug!(
                        test = %test.name,
                        suite = %suite.name(),
                        constraint = %constraint.name(),
                        "constraint is marked {}, skipping",
                        self.skip.value
                    );
                    continue;
                }

                let sample = self.build_sample(suite, test, ObjectRef::new(constraint, constraint_path))?;

                let doc = docs
                    .entry(template.kind_name.clone())
                    .or_insert_with(|| TemplateDoc {
                        name: template.kind_name.clone(),
                        description: template.description.clone(),
                        schema: template.schema.clone(),
                        legacy_schema: template.legacy_schema,
                        samples: Vec::new(),
                    });

                let before = doc.samples.len();
                let samples = std::mem::take(&mut doc.samples);
                doc.samples = merge_samples(samples, sample).map_err(|source| {
                    AggregateError::Conflict {
                        test: test.name.clone(),
                        suite: suite.name().to_string(),
                        source,
                    }
                })?;
                if doc.samples.len() == before {
                    debug!(template = %doc.name, test = %test.name, "merged sample into existing constraint");
                }
            }
        }

        Ok(docs.into_values().collect())
    }

    fn build_sample(
        &self,
        suite: &Suite,
        test: &SuiteTest,
        constraint: ObjectRef,
    ) -> Result<Sample, AggregateError> {
        let mut sample = Sample::new(constraint);

        for case in &test.cases {
            let example = self.read_case(suite, test, case)?;
            if case.is_allowed() {
                sample.allowed.push(example);
            } else {
                sample.disallowed.push(example);
            }
        }

        Ok(sample)
    }

    fn read_case(
        &self,
        suite: &Suite,
        test: &SuiteTest,
        case: &TestCase,
    ) -> Result<ObjectRef, AggregateError> {
        let object_path = suite.dir().join(&case.object);
        let object = self
            .reader
            .read_object(&object_path)
            .map_err(|source| AggregateError::Ingest {
                context: format!(
                    "object for case {:?}, test {:?}, suite {:?}",
                    case.name,
                    test.name,
                    suite.name()
                ),
                source,
            })?;

        let mut referential_data = Vec::with_capacity(case.inventory.len());
        for inventory in &case.inventory {
            let data = self
                .reader
                .read_object(&suite.dir().join(inventory))
                .map_err(|source| AggregateError::Ingest {
                    context: format!(
                        "inventory object {:?} for case {:?}, test {:?}, suite {:?}",
                        inventory.display().to_string(),
                        case.name,
                        test.name,
                        suite.name()
                    ),
                    source,
                })?;
            referential_data.push(data);
        }

        Ok(ObjectRef::new(object, object_path).with_referential_data(referential_data))
    }
}
