//! Markdown document generation

use miette::Diagnostic;
use rust_embed::Embed;
use serde::Serialize;
use std::error::Error as StdError;
use tera::Tera;
use thiserror::Error;

use crate::core::doc::{Sample, TemplateDoc};
use crate::core::object::ObjectRef;
use crate::schema::node::{RawSchema, SchemaNode};
use crate::schema::render::{RenderError, SchemaRenderer};
use crate::yaml::parse_yaml;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const CONSTRAINT_TEMPLATE: &str = "constraint_template.md.tera";
const SCHEMA_TEMPLATE: &str = "schema.yaml.tera";
const REFERENTIAL_DATA_TEMPLATE: &str = "referential_data.yaml.tera";
const MATCH_TEMPLATE: &str = "match.md.tera";

/// Parameter indentation inside the constraint skeleton
const PARAMETERS_INDENT: &str = "    ";

/// The gatekeeper `match` schema shared by every constraint
const MATCH_SCHEMA: &str = include_str!("../../schemas/match.schema.yaml");

#[derive(Debug, Error, Diagnostic)]
pub enum PresentError {
    #[error("converting schema of doc {doc:?} to text")]
    #[diagnostic(code(docgen::present::schema))]
    Render {
        doc: String,
        #[source]
        #[diagnostic_source]
        source: RenderError,
    },

    #[error("serializing {what} for doc {doc:?}")]
    #[diagnostic(code(docgen::present::serialize))]
    Serialize {
        doc: String,
        what: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("built-in match schema is invalid: {0}")]
    #[diagnostic(code(docgen::present::match_schema))]
    MatchSchema(String),

    #[error("template error: {0}")]
    #[diagnostic(code(docgen::present::template))]
    Template(String),
}

impl From<tera::Error> for PresentError {
    fn from(err: tera::Error) -> Self {
        // tera keeps the useful part of the message in the source chain
        let mut message = err.to_string();
        let mut source = StdError::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = StdError::source(inner);
        }
        PresentError::Template(message)
    }
}

/// A sample flattened to YAML text for the templates
#[derive(Debug, Serialize)]
struct SampleView {
    constraint_name: String,
    constraint: String,
    allowed: Vec<String>,
    disallowed: Vec<String>,
}

/// Renders documentation models with the embedded templates
pub struct TemplateGenerator {
    tera: Tera,
    renderer: SchemaRenderer,
}

impl TemplateGenerator {
    /// Create a generator with the embedded templates loaded
    pub fn new(renderer: SchemaRenderer) -> Result<Self, PresentError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let source = std::str::from_utf8(&content.data)
                    .map_err(|e| PresentError::Template(format!("{}: {}", filename, e)))?;
                tera.add_raw_template(filename, source)?;
            }
        }

        Ok(Self { tera, renderer })
    }

    /// Render every doc, in order, into one markdown document
    pub fn present(&self, docs: &[TemplateDoc]) -> Result<String, PresentError> {
        let mut sections = Vec::with_capacity(docs.len());

        for doc in docs {
            let schema = self.schema_text(doc)?;
            let samples = doc
                .samples
                .iter()
                .map(|sample| self.sample_view(&doc.name, sample))
                .collect::<Result<Vec<_>, _>>()?;

            let mut context = tera::Context::new();
            context.insert("name", &doc.name);
            context.insert("description", &doc.description);
            context.insert("schema", &schema);
            context.insert("samples", &samples);

            let section = self.tera.render(CONSTRAINT_TEMPLATE, &context)?;
            sections.push(section.trim().to_string());
        }

        Ok(sections.join("\n\n"))
    }

    /// Render the `match` section common to all constraints
    pub fn present_match(&self) -> Result<String, PresentError> {
        let raw: RawSchema = parse_yaml(MATCH_SCHEMA, "match.schema.yaml")
            .map_err(|e| PresentError::MatchSchema(e.to_string()))?;
        let schema = SchemaNode::from_raw(&raw, "match")
            .map_err(|e| PresentError::MatchSchema(e.to_string()))?;

        let lines = self
            .renderer
            .render_lines(&schema, 0)
            .map_err(|source| PresentError::Render {
                doc: "match".to_string(),
                source,
            })?;

        let mut context = tera::Context::new();
        context.insert("content", &lines.join("\n"));
        Ok(self.tera.render(MATCH_TEMPLATE, &context)?.trim().to_string())
    }

    fn schema_text(&self, doc: &TemplateDoc) -> Result<String, PresentError> {
        let parameters = self
            .renderer
            .render_parameters(doc.schema.as_ref(), doc.legacy_schema, PARAMETERS_INDENT)
            .map_err(|source| PresentError::Render {
                doc: doc.name.clone(),
                source,
            })?;

        let mut context = tera::Context::new();
        context.insert("kind", &doc.name);
        context.insert("parameters", &parameters);
        Ok(self.tera.render(SCHEMA_TEMPLATE, &context)?)
    }

    fn sample_view(&self, doc: &str, sample: &Sample) -> Result<SampleView, PresentError> {
        let constraint_name = sample.constraint.name().to_string();
        let constraint = sample
            .constraint
            .object
            .to_yaml()
            .map_err(|source| PresentError::Serialize {
                doc: doc.to_string(),
                what: format!("constraint {:?}", constraint_name),
                source,
            })?;

        let examples = |objects: &[ObjectRef], label: &str| {
            objects
                .iter()
                .map(|example| self.example_text(doc, example, label))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(SampleView {
            allowed: examples(&sample.allowed, "allowed")?,
            disallowed: examples(&sample.disallowed, "disallowed")?,
            constraint: constraint.trim_end().to_string(),
            constraint_name,
        })
    }

    /// Example YAML followed by its referential data documents
    fn example_text(
        &self,
        doc: &str,
        example: &ObjectRef,
        label: &str,
    ) -> Result<String, PresentError> {
        let serialize_error = |source: serde_yml::Error| PresentError::Serialize {
            doc: doc.to_string(),
            what: format!("{} example {:?}", label, example.name()),
            source,
        };

        let object = example.object.to_yaml().map_err(serialize_error)?;
        let referential = example
            .referential_data
            .iter()
            .map(|data| data.to_yaml().map(|yaml| yaml.trim_end().to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(serialize_error)?;

        let mut context = tera::Context::new();
        context.insert("objects", &referential);
        let referential = self.tera.render(REFERENTIAL_DATA_TEMPLATE, &context)?;

        Ok(format!("{}{}", object.trim_end(), referential.trim_end()))
    }
}
