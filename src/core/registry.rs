//! Known template kinds
//!
//! The registry is an ordinary value handed to the fixture reader, so
//! callers (and tests) can run with different sets of known kinds side by
//! side.

use std::collections::BTreeMap;

pub const TEMPLATE_KIND: &str = "ConstraintTemplate";
pub const TEMPLATE_GROUP: &str = "templates.gatekeeper.sh";

/// How one template API version treats its parameter schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateVersion {
    /// `legacySchema` when the template leaves it unset
    pub legacy_schema_default: bool,
}

/// Template API versions the reader accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRegistry {
    kind: String,
    versions: BTreeMap<String, TemplateVersion>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::gatekeeper()
    }
}

impl KindRegistry {
    /// An empty registry for `kind`; nothing is accepted until versions are
    /// registered
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            versions: BTreeMap::new(),
        }
    }

    /// Gatekeeper constraint templates. The pre-v1 versions default to
    /// legacy schemas, v1 does not.
    pub fn gatekeeper() -> Self {
        Self::new(TEMPLATE_KIND)
            .with_version(format!("{}/v1alpha1", TEMPLATE_GROUP), true)
            .with_version(format!("{}/v1beta1", TEMPLATE_GROUP), true)
            .with_version(format!("{}/v1", TEMPLATE_GROUP), false)
    }

    pub fn with_version(mut self, api_version: impl Into<String>, legacy_schema_default: bool) -> Self {
        self.versions.insert(
            api_version.into(),
            TemplateVersion {
                legacy_schema_default,
            },
        );
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Look up a template by its `apiVersion` and `kind`
    pub fn lookup(&self, api_version: &str, kind: &str) -> Option<TemplateVersion> {
        if kind != self.kind {
            return None;
        }
        self.versions.get(api_version).copied()
    }

    pub fn api_versions(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }
}
