//! Schema to text rendering
//!
//! Produces the YAML-like parameter listing shown in the generated docs:
//! every key is preceded by `# ` comments describing it, nested objects are
//! indented two spaces per level, and list items are marked with `-`.
//!
//! Comment width shrinks with nesting depth, so deeply nested schemas get
//! narrower comments and the total rendered width stays bounded.

use miette::Diagnostic;
use thiserror::Error;

use super::node::{RawSchema, SchemaError, SchemaNode, UNTYPED};
use super::wrap::{wrap_comment, MIN_WRAP_WIDTH};

/// Default column budget for comment lines
pub const DEFAULT_COLUMN_BUDGET: usize = 80;

const MAP_KEY_NAME: &str = "additional user-defined keys";
const MAP_KEY_TOKEN: &str = "[key]";
const UNKNOWN_FIELDS_NAME: &str = "unknown fields";

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("a non-blank description is required in an unbounded schema section")]
    #[diagnostic(
        code(docgen::schema::missing_description),
        help("describe which keys are accepted, or remove x-kubernetes-preserve-unknown-fields")
    )]
    MissingDescription,

    #[error("unwrappable line length {width}, wanted {} or greater", MIN_WRAP_WIDTH)]
    #[diagnostic(
        code(docgen::schema::wrap_width),
        help("the schema is nested deeper than the column budget allows; raise `column_budget`")
    )]
    WrapWidth { width: isize },

    #[error("input does not begin with '# ': {0:?}")]
    #[diagnostic(code(docgen::schema::not_a_comment))]
    NotAComment(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error("for property {key:?}: {source}")]
    #[diagnostic(code(docgen::schema::property))]
    Property {
        key: String,
        #[source]
        source: Box<RenderError>,
    },
}

impl RenderError {
    fn in_property(self, key: &str) -> Self {
        RenderError::Property {
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any property context
    pub fn root_cause(&self) -> &RenderError {
        match self {
            RenderError::Property { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Renders schema trees into commented, indented text
#[derive(Debug, Clone, Copy)]
pub struct SchemaRenderer {
    column_budget: usize,
}

impl Default for SchemaRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_BUDGET)
    }
}

impl SchemaRenderer {
    pub fn new(column_budget: usize) -> Self {
        Self { column_budget }
    }

    /// Render a template's parameter schema, every line prefixed by `indent`.
    ///
    /// Blank schemas are resolved before the document is classified, so a
    /// blank root never reaches the structural checks. With `legacy` set an
    /// accept-unknown-fields marker on a blank schema is assumed to have been
    /// injected by upstream defaulting and is suppressed. Without it the
    /// marker is honored as an intentional wildcard and must be described.
    pub fn render_parameters(
        &self,
        schema: Option<&RawSchema>,
        legacy: bool,
        indent: &str,
    ) -> Result<String, RenderError> {
        let Some(schema) = schema else {
            return Ok(String::new());
        };

        if schema.is_blank() {
            return render_blank(schema, legacy);
        }

        let node = SchemaNode::from_raw(schema, "$")?;
        let lines = self.render_lines(&node, indent.len())?;
        Ok(lines
            .iter()
            .map(|line| format!("{}{}", indent, line))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Render `node` at `depth` columns of indentation. Returned lines are
    /// relative to that indentation.
    pub fn render_lines(&self, node: &SchemaNode, depth: usize) -> Result<Vec<String>, RenderError> {
        match node {
            SchemaNode::Scalar { .. } | SchemaNode::OpenUnstructured { .. } => {
                Ok(vec![format!("<{}>", node.display_type())])
            }
            SchemaNode::Object { properties, .. } => {
                let mut lines = Vec::new();
                // BTreeMap iteration is already in key order
                for (key, child) in properties {
                    let child_lines = self
                        .render_property(child, key, key, depth)
                        .map_err(|e| e.in_property(key))?;
                    lines.extend(child_lines);
                }
                Ok(lines)
            }
            SchemaNode::Array { items, .. } => self.render_items(items, depth),
            SchemaNode::MapOf { values, .. } => self
                .render_property(values, MAP_KEY_NAME, MAP_KEY_TOKEN, depth)
                .map_err(|e| e.in_property(MAP_KEY_TOKEN)),
        }
    }

    /// One key of an object (or the value schema of an open map)
    fn render_property(
        &self,
        child: &SchemaNode,
        name: &str,
        key: &str,
        depth: usize,
    ) -> Result<Vec<String>, RenderError> {
        let mut lines = self.comments(child, Some(name), depth)?;
        let sub_lines = self.render_lines(child, depth + 2)?;

        if child.is_terminal() {
            let value = sub_lines.first().map(|l| l.trim()).unwrap_or_default();
            lines.push(format!("{}: {}", key, value).trim_end().to_string());
        } else {
            lines.push(format!("{}:", key));
            lines.extend(sub_lines.into_iter().map(|l| format!("  {}", l)));
        }

        Ok(lines)
    }

    fn render_items(&self, items: &SchemaNode, depth: usize) -> Result<Vec<String>, RenderError> {
        let mut lines = self.comments(items, None, depth)?;

        let mut sub_lines: Vec<String> = self
            .render_lines(items, depth + 4)?
            .into_iter()
            .map(|l| format!("  {}", l))
            .collect();

        if let Some(first) = sub_lines.first_mut() {
            first.replace_range(..1, "-");
        }

        lines.extend(sub_lines);
        Ok(lines)
    }

    /// Description and allowed-value comments for a node, each wrapped to
    /// the width left at `depth`
    fn comments(
        &self,
        node: &SchemaNode,
        name: Option<&str>,
        depth: usize,
    ) -> Result<Vec<String>, RenderError> {
        let meta = node.meta();
        if meta.description.is_empty() && meta.allowed_values.is_empty() {
            return Ok(Vec::new());
        }

        let width = self.column_budget as isize - depth as isize;
        if width < MIN_WRAP_WIDTH as isize {
            return Err(RenderError::WrapWidth { width });
        }
        let width = width as usize;

        let mut lines = Vec::new();

        if !meta.description.is_empty() {
            let line = description_line(name, node.display_type(), &meta.description);
            lines.extend(wrap_comment(&line, width)?);
        }

        if !meta.allowed_values.is_empty() {
            let line = format!("# Allowed Values: {}", meta.allowed_values.join(", "));
            lines.extend(wrap_comment(line.trim_end(), width)?);
        }

        Ok(lines)
    }
}

/// The single `unknown fields` line for a blank schema, or nothing
fn render_blank(schema: &RawSchema, legacy: bool) -> Result<String, RenderError> {
    if legacy || !schema.preserves_unknown() {
        return Ok(String::new());
    }

    let description = schema
        .description
        .as_deref()
        .unwrap_or_default()
        .replace('\n', " ");
    if description.is_empty() {
        return Err(RenderError::MissingDescription);
    }

    Ok(description_line(Some(UNKNOWN_FIELDS_NAME), UNTYPED, &description))
}

/// `# name <type>: description`, or the list-item form when unnamed
fn description_line(name: Option<&str>, display_type: &str, description: &str) -> String {
    let line = match name {
        Some(name) if !name.is_empty() => {
            format!("# {} <{}>: {}", name, display_type, description)
        }
        _ => format!("# <list item: {}>: {}", display_type, description),
    };
    line.trim_end().to_string()
}
