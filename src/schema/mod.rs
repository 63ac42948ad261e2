//! Parameter schemas - tree model, text rendering and document templates

pub mod node;
pub mod render;
pub mod template;
pub mod wrap;

pub use node::{AdditionalProperties, RawSchema, SchemaError, SchemaMeta, SchemaNode};
pub use render::{RenderError, SchemaRenderer, DEFAULT_COLUMN_BUDGET};
pub use template::{PresentError, TemplateGenerator};
pub use wrap::wrap_comment;
