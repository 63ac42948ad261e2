//! Core module - fixtures, documentation model and aggregation

pub mod aggregate;
pub mod config;
pub mod doc;
pub mod loader;
pub mod object;
pub mod registry;

pub use aggregate::{AggregateError, Aggregator, SkipMarker};
pub use config::Config;
pub use doc::{merge_samples, ConflictError, Sample, TemplateDoc};
pub use loader::{ConstraintTemplate, FixtureError, FixtureReader, FsFixtureReader, Suite};
pub use object::{Object, ObjectIdentity, ObjectRef};
pub use registry::KindRegistry;
