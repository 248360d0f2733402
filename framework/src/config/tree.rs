//! Generic configuration tree
//!
//! Definitions are described by a tree of elements, each with a tag, string
//! attributes and child elements. The tree is read from JSON:
//!
//! ```json
//! {
//!   "tag": "beans",
//!   "children": [
//!     {
//!       "tag": "bean",
//!       "attributes": { "name": "battery", "type": "Battery" },
//!       "children": [
//!         { "tag": "constructor-param", "attributes": { "name": "name", "type": "String", "value": "Amaron" } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// One element of a configuration tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_json_tree() {
        let node = ConfigNode::from_json_str(
            r#"{"tag":"beans","children":[{"tag":"bean","attributes":{"name":"battery","type":"Battery"}}]}"#,
        )
        .unwrap();

        assert_eq!(
            node,
            ConfigNode::element("beans")
                .child(ConfigNode::element("bean").attr("name", "battery").attr("type", "Battery"))
        );
        assert_eq!(node.children[0].attribute("type"), Some("Battery"));
        assert_eq!(node.children[0].attribute("ref"), None);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tag":"beans"}}"#).unwrap();

        let node = ConfigNode::from_path(file.path()).unwrap();
        assert_eq!(node, ConfigNode::element("beans"));

        let missing = ConfigNode::from_path(Path::new("/nonexistent/rivet.json")).unwrap_err();
        assert!(matches!(missing, LoadError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ConfigNode::from_json_str("{\"tag\":").unwrap_err(),
            LoadError::Parse(_)
        ));
    }
}
