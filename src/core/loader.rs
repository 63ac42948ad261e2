//! Fixture loading
//!
//! A policy library keeps its tests as `suite.yaml` files. Each suite names
//! template, constraint and example object files relative to its own
//! directory. [`FixtureReader`] is the seam between the aggregator and
//! wherever those files live; [`FsFixtureReader`] reads them from disk.

use miette::Diagnostic;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::object::Object;
use crate::core::registry::KindRegistry;
use crate::schema::RawSchema;
use crate::yaml::{parse_yaml, YamlSyntaxError};

pub const SUITE_KIND: &str = "Suite";
const SUITE_FILE_NAMES: [&str; 2] = ["suite.yaml", "suite.yml"];

#[derive(Debug, Error, Diagnostic)]
pub enum FixtureError {
    #[error("reading {}: {source}", .path.display())]
    #[diagnostic(code(docgen::fixture::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walking {}: {source}", .root.display())]
    #[diagnostic(code(docgen::fixture::walk))]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlSyntaxError),

    #[error("{} is not a {expected}: found kind {found:?}", .path.display())]
    #[diagnostic(code(docgen::fixture::kind))]
    UnexpectedKind {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("{} has unsupported template apiVersion {api_version:?}", .path.display())]
    #[diagnostic(
        code(docgen::fixture::api_version),
        help("supported versions are listed by the kind registry, e.g. templates.gatekeeper.sh/v1")
    )]
    UnknownTemplateVersion { path: PathBuf, api_version: String },

    #[error("template {} does not declare spec.crd.spec.names.kind", .path.display())]
    #[diagnostic(code(docgen::fixture::kind_name))]
    MissingKindName { path: PathBuf },
}

/// A `Suite` fixture: named tests, each pairing a template with a constraint
#[derive(Debug, Clone, Deserialize)]
pub struct Suite {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: SuiteMetadata,
    #[serde(default)]
    pub tests: Vec<SuiteTest>,
    /// File the suite was read from
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuiteMetadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiteTest {
    #[serde(default)]
    pub name: String,
    pub template: PathBuf,
    pub constraint: PathBuf,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub name: String,
    pub object: PathBuf,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
    /// Referential data the object is evaluated against
    #[serde(default)]
    pub inventory: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Assertion {
    #[serde(default)]
    pub violations: Option<Violations>,
}

/// Expected violations: a count, or a `yes`/`no` sentinel
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Violations {
    Count(i64),
    Text(String),
}

impl Suite {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Directory the suite's fixture paths are relative to
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

impl TestCase {
    /// A case documents an allowed object when it asserts, in exactly one
    /// assertion, that there are no violations. Anything else counts as
    /// disallowed.
    pub fn is_allowed(&self) -> bool {
        match self.assertions.as_slice() {
            [only] => match &only.violations {
                Some(Violations::Count(count)) => *count == 0,
                Some(Violations::Text(text)) => text == "no",
                None => false,
            },
            _ => false,
        }
    }
}

/// A constraint template reduced to what the docs need
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintTemplate {
    /// Declared kind name (`spec.crd.spec.names.kind`)
    pub kind_name: String,
    pub description: String,
    /// Parameter schema as written; classified only when rendered
    pub schema: Option<RawSchema>,
    pub legacy_schema: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateDocument {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    metadata: TemplateMetadata,
    #[serde(default)]
    spec: TemplateSpec,
}

#[derive(Debug, Default, Deserialize)]
struct TemplateMetadata {
    #[serde(default)]
    annotations: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct TemplateSpec {
    #[serde(default)]
    crd: Crd,
}

#[derive(Debug, Default, Deserialize)]
struct Crd {
    #[serde(default)]
    spec: CrdSpec,
}

#[derive(Debug, Default, Deserialize)]
struct CrdSpec {
    #[serde(default)]
    names: Names,
    #[serde(default)]
    validation: Option<Validation>,
}

#[derive(Debug, Default, Deserialize)]
struct Names {
    #[serde(default)]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Validation {
    #[serde(default, rename = "openAPIV3Schema")]
    open_api_v3_schema: Option<RawSchema>,
    #[serde(default)]
    legacy_schema: Option<bool>,
}

/// Where fixtures come from
pub trait FixtureReader {
    /// All suites under `root`, in a stable order
    fn read_suites(&self, root: &Path) -> Result<Vec<Suite>, FixtureError>;

    fn read_template(
        &self,
        registry: &KindRegistry,
        path: &Path,
    ) -> Result<ConstraintTemplate, FixtureError>;

    fn read_object(&self, path: &Path) -> Result<Object, FixtureError>;
}

/// Reads fixtures from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFixtureReader;

impl FsFixtureReader {
    pub fn new() -> Self {
        Self
    }
}

impl FixtureReader for FsFixtureReader {
    fn read_suites(&self, root: &Path) -> Result<Vec<Suite>, FixtureError> {
        let mut suites = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| FixtureError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_suite_file = entry
                .file_name()
                .to_str()
                .map_or(false, |name| SUITE_FILE_NAMES.contains(&name));
            if !is_suite_file {
                continue;
            }

            let path = entry.path();
            let suite = parse_suite(&read_file(path)?, path)?;
            if suite.kind != SUITE_KIND {
                debug!(path = %path.display(), kind = %suite.kind, "skipping non-suite file");
                continue;
            }
            debug!(path = %path.display(), tests = suite.tests.len(), "found suite");
            suites.push(suite);
        }

        Ok(suites)
    }

    fn read_template(
        &self,
        registry: &KindRegistry,
        path: &Path,
    ) -> Result<ConstraintTemplate, FixtureError> {
        parse_template(registry, &read_file(path)?, path)
    }

    fn read_object(&self, path: &Path) -> Result<Object, FixtureError> {
        parse_object(&read_file(path)?, path)
    }
}

fn read_file(path: &Path) -> Result<String, FixtureError> {
    fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_suite(source: &str, path: &Path) -> Result<Suite, FixtureError> {
    let mut suite: Suite = parse_yaml(source, &path.display().to_string())?;
    suite.path = path.to_path_buf();
    Ok(suite)
}

/// Parse a constraint template. Legacy templates without a schema get the
/// accept-unknown-fields schema that upstream defaulting would inject.
pub fn parse_template(
    registry: &KindRegistry,
    source: &str,
    path: &Path,
) -> Result<ConstraintTemplate, FixtureError> {
    let doc: TemplateDocument = parse_yaml(source, &path.display().to_string())?;

    if doc.kind != registry.kind() {
        return Err(FixtureError::UnexpectedKind {
            path: path.to_path_buf(),
            expected: registry.kind().to_string(),
            found: doc.kind,
        });
    }
    let version = registry
        .lookup(&doc.api_version, &doc.kind)
        .ok_or_else(|| FixtureError::UnknownTemplateVersion {
            path: path.to_path_buf(),
            api_version: doc.api_version.clone(),
        })?;

    let crd = doc.spec.crd.spec;
    if crd.names.kind.is_empty() {
        return Err(FixtureError::MissingKindName {
            path: path.to_path_buf(),
        });
    }

    let validation = crd.validation.unwrap_or_default();
    let legacy_schema = validation
        .legacy_schema
        .unwrap_or(version.legacy_schema_default);

    let schema = match validation.open_api_v3_schema {
        Some(raw) => Some(raw),
        None if legacy_schema => Some(RawSchema {
            preserve_unknown_fields: Some(true),
            ..RawSchema::default()
        }),
        None => None,
    };

    Ok(ConstraintTemplate {
        kind_name: crd.names.kind,
        description: doc
            .metadata
            .annotations
            .get("description")
            .cloned()
            .unwrap_or_default(),
        schema,
        legacy_schema,
    })
}

/// Parse a single object. Anything without a `kind` is rejected.
pub fn parse_object(source: &str, path: &Path) -> Result<Object, FixtureError> {
    let content: JsonValue = parse_yaml(source, &path.display().to_string())?;
    let object = Object::new(content);
    if object.kind().is_empty() {
        return Err(FixtureError::UnexpectedKind {
            path: path.to_path_buf(),
            expected: "object with a kind".to_string(),
            found: String::new(),
        });
    }
    Ok(object)
}
