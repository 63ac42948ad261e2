//! Per-template documentation model and sample merging

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::object::{ObjectIdentity, ObjectRef};
use crate::schema::RawSchema;

/// Everything documented about one constraint template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDoc {
    /// The template's declared kind name
    pub name: String,
    pub description: String,
    pub schema: Option<RawSchema>,
    /// Whether upstream legacy defaulting applies to `schema`
    pub legacy_schema: bool,
    /// In first-seen order
    pub samples: Vec<Sample>,
}

/// One constraint and the example objects it was tested against
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub constraint: ObjectRef,
    pub allowed: Vec<ObjectRef>,
    pub disallowed: Vec<ObjectRef>,
}

/// Two constraints share an identity but not their content
#[derive(Debug, Error, Diagnostic)]
#[error("constraint {identity} is defined differently in {} and {} (first difference at `{difference}`)", .existing.display(), .incoming.display())]
#[diagnostic(
    code(docgen::merge::conflict),
    help("constraints with the same group, kind and name must be identical wherever they appear")
)]
pub struct ConflictError {
    pub identity: ObjectIdentity,
    pub existing: PathBuf,
    pub incoming: PathBuf,
    pub difference: String,
}

impl Sample {
    pub fn new(constraint: ObjectRef) -> Self {
        Self {
            constraint,
            allowed: Vec::new(),
            disallowed: Vec::new(),
        }
    }

    pub fn identity(&self) -> ObjectIdentity {
        self.constraint.object.identity()
    }

    /// Combine with a sample for the same constraint. The existing
    /// constraint is kept; `other`'s examples are appended after ours.
    pub fn merge(mut self, other: Sample) -> Result<Sample, ConflictError> {
        if let Some(difference) = self
            .constraint
            .object
            .first_difference(&other.constraint.object)
        {
            return Err(ConflictError {
                identity: self.identity(),
                existing: self.constraint.source.clone(),
                incoming: other.constraint.source.clone(),
                difference,
            });
        }

        self.allowed.extend(other.allowed);
        self.disallowed.extend(other.disallowed);
        Ok(self)
    }
}

/// Fold `new` into `existing`: merged in place with the first sample of the
/// same identity, or appended when there is none.
pub fn merge_samples(mut existing: Vec<Sample>, new: Sample) -> Result<Vec<Sample>, ConflictError> {
    let identity = new.identity();
    match existing.iter().position(|s| s.identity() == identity) {
        Some(index) => {
            let current = existing.remove(index);
            existing.insert(index, current.merge(new)?);
        }
        None => existing.push(new),
    }
    Ok(existing)
}
