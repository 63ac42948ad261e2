//! Fixture objects and their identity

use serde_json::Value as JsonValue;
use std::fmt;
use std::path::PathBuf;

/// A structured object read from a fixture file
///
/// The content is opaque apart from the identity fields under `apiVersion`,
/// `kind` and `metadata`.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    content: JsonValue,
}

/// (API group, kind, name): what makes two constraints the same instance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectIdentity {
    pub group: String,
    pub kind: String,
    pub name: String,
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.kind, self.name)
        } else {
            write!(f, "{}.{}/{}", self.kind, self.group, self.name)
        }
    }
}

impl Object {
    pub fn new(content: JsonValue) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &JsonValue {
        &self.content
    }

    pub fn api_version(&self) -> &str {
        self.content["apiVersion"].as_str().unwrap_or_default()
    }

    /// API group: everything before the last `/` of `apiVersion`, empty for
    /// core objects such as `v1`
    pub fn group(&self) -> &str {
        self.api_version()
            .rsplit_once('/')
            .map(|(group, _)| group)
            .unwrap_or_default()
    }

    pub fn kind(&self) -> &str {
        self.content["kind"].as_str().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.content["metadata"]["name"].as_str().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.content["metadata"]["namespace"]
            .as_str()
            .unwrap_or_default()
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.content["metadata"]["annotations"][key].as_str()
    }

    pub fn identity(&self) -> ObjectIdentity {
        ObjectIdentity {
            group: self.group().to_string(),
            kind: self.kind().to_string(),
            name: self.name().to_string(),
        }
    }

    /// Serialize back to YAML for presentation
    pub fn to_yaml(&self) -> Result<String, serde_yml::Error> {
        serde_yml::to_string(&self.content)
    }

    /// JSON path of the first field where `self` and `other` differ, or
    /// `None` when the contents are equal
    pub fn first_difference(&self, other: &Object) -> Option<String> {
        first_difference(&self.content, &other.content, "$")
    }
}

fn first_difference(a: &JsonValue, b: &JsonValue, path: &str) -> Option<String> {
    match (a, b) {
        (JsonValue::Object(left), JsonValue::Object(right)) => {
            let mut keys: Vec<&String> = left.keys().chain(right.keys()).collect();
            keys.sort();
            keys.dedup();
            keys.into_iter().find_map(|key| {
                let child = format!("{}.{}", path, key);
                match (left.get(key), right.get(key)) {
                    (Some(l), Some(r)) => first_difference(l, r, &child),
                    _ => Some(child),
                }
            })
        }
        (JsonValue::Array(left), JsonValue::Array(right)) => {
            if left.len() != right.len() {
                return Some(path.to_string());
            }
            left.iter()
                .zip(right)
                .enumerate()
                .find_map(|(i, (l, r))| first_difference(l, r, &format!("{}[{}]", path, i)))
        }
        _ if a == b => None,
        _ => Some(path.to_string()),
    }
}

/// An object plus the referential data it needs for evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    pub object: Object,
    pub referential_data: Vec<Object>,
    /// Fixture file the object was read from
    pub source: PathBuf,
}

impl ObjectRef {
    pub fn new(object: Object, source: impl Into<PathBuf>) -> Self {
        Self {
            object,
            referential_data: Vec::new(),
            source: source.into(),
        }
    }

    pub fn with_referential_data(mut self, data: Vec<Object>) -> Self {
        self.referential_data = data;
        self
    }

    pub fn name(&self) -> &str {
        self.object.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod(name: &str) -> Object {
        Object::new(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": name, "namespace": "default"},
            "spec": {"containers": [{"name": "nginx", "image": "nginx"}]}
        }))
    }

    #[test]
    fn test_core_group_is_empty() {
        let obj = pod("allowed-example");
        assert_eq!(obj.group(), "");
        assert_eq!(obj.kind(), "Pod");
        assert_eq!(obj.name(), "allowed-example");
        assert_eq!(obj.namespace(), "default");
        assert_eq!(obj.identity().to_string(), "Pod/allowed-example");
    }

    #[test]
    fn test_group_is_taken_from_api_version() {
        let obj = Object::new(json!({
            "apiVersion": "constraints.gatekeeper.sh/v1beta1",
            "kind": "K8sRestrictLabels",
            "metadata": {
                "name": "restrict-label-example",
                "annotations": {"policy.library/doc-gen": "do_not_document"}
            }
        }));
        assert_eq!(obj.group(), "constraints.gatekeeper.sh");
        assert_eq!(
            obj.annotation("policy.library/doc-gen"),
            Some("do_not_document")
        );
        assert_eq!(obj.annotation("missing"), None);
    }

    #[test]
    fn test_first_difference() {
        let a = pod("x");
        assert_eq!(a.first_difference(&pod("x")), None);
        assert_eq!(
            a.first_difference(&pod("y")),
            Some("$.metadata.name".to_string())
        );

        let mut content = pod("x").content().clone();
        content["spec"]["containers"][0]["image"] = json!("nginx:latest");
        assert_eq!(
            a.first_difference(&Object::new(content)),
            Some("$.spec.containers[0].image".to_string())
        );
    }

    #[test]
    fn test_to_yaml_keeps_fields() {
        let yaml = pod("allowed-example").to_yaml().unwrap();
        assert!(yaml.contains("kind: Pod"));
        assert!(yaml.contains("name: allowed-example"));
    }
}
