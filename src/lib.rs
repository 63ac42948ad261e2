//! docgen: policy library documentation generator
//!
//! Reads a library's test suites, groups every tested constraint under its
//! template and renders markdown: the template's parameter schema as
//! commented YAML plus the objects each constraint allows and rejects.

pub mod cli;
pub mod core;
pub mod schema;
pub mod yaml;
