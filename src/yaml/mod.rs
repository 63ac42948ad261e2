//! YAML helpers shared by the fixture reader

pub mod diagnostics;

pub use diagnostics::{parse_yaml, YamlSyntaxError};
