//! Domain models for scene nodes, manifests, and export bundles.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::errors::DomainError;

/// Closed set of node kinds understood by the exporter.
///
/// Container kinds may carry children; leaf kinds never do. The wire form
/// matches the host's SCREAMING_SNAKE_CASE tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Text,
    Vector,
    Rectangle,
    Ellipse,
}

impl NodeKind {
    /// Whether nodes of this kind may own children.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeKind::Frame
                | NodeKind::Group
                | NodeKind::Section
                | NodeKind::Component
                | NodeKind::ComponentSet
                | NodeKind::Instance
        )
    }
}

/// A node in the host's ordered, rooted scene tree.
///
/// Strictly tree-shaped: every node is owned by exactly one parent, roots by
/// the selection. `children` is present only on container kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SceneNode>>,
}

impl SceneNode {
    /// Create a leaf node with no children slot.
    pub fn leaf(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: None,
        }
    }

    /// Create a container node with the given children.
    pub fn container(name: impl Into<String>, kind: NodeKind, children: Vec<SceneNode>) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Some(children),
        }
    }

    /// Child nodes in document order, empty for leaves.
    pub fn children(&self) -> &[SceneNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Reject trees where a leaf kind carries children. Applied on ingest so
    /// the traversal and export stages can trust the tree shape.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.children.is_some() && !self.kind.is_container() {
            return Err(DomainError::ChildrenOnLeaf {
                name: self.name.clone(),
                kind: self.kind,
            });
        }
        for child in self.children() {
            child.validate()?;
        }
        Ok(())
    }
}

/// One manifest record produced per successfully exported node. Immutable
/// once created; `description` is always empty for the user to fill in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub node_name: String,
    pub image_file_name: String,
    pub description: String,
}

impl ManifestEntry {
    pub fn new(node_name: impl Into<String>, image_file_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            image_file_name: image_file_name.into(),
            description: String::new(),
        }
    }
}

#[derive(Serialize)]
struct ManifestRecord<'a> {
    image: &'a str,
    description: &'a str,
}

// The host UI expects each entry keyed by the original node name:
// `{"Btn Primary": {"image": "Btn_Primary.png", "description": ""}}`.
impl Serialize for ManifestEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.node_name,
            &ManifestRecord {
                image: &self.image_file_name,
                description: &self.description,
            },
        )?;
        map.end()
    }
}

#[derive(Deserialize)]
struct ManifestRecordOwned {
    image: String,
    #[serde(default)]
    description: String,
}

impl<'de> Deserialize<'de> for ManifestEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;
        let map =
            std::collections::BTreeMap::<String, ManifestRecordOwned>::deserialize(deserializer)?;
        let mut entries = map.into_iter();
        let (node_name, record) = entries
            .next()
            .ok_or_else(|| D::Error::custom("manifest entry must not be empty"))?;
        if entries.next().is_some() {
            return Err(D::Error::custom("manifest entry must hold exactly one name"));
        }
        Ok(ManifestEntry {
            node_name,
            image_file_name: record.image,
            description: record.description,
        })
    }
}

/// Raster bytes for one exported node, named after its sanitized file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Aggregate output of one export run.
///
/// `manifest` and `artifacts` are index-aligned: entry `i` describes artifact
/// `i`, and items that failed to export appear in neither.
#[derive(Debug, Clone, Default)]
pub struct ExportBundle {
    pub manifest: Vec<ManifestEntry>,
    pub artifacts: Vec<ImageArtifact>,
    pub json: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entry_serializes_keyed_by_name() {
        let entry = ManifestEntry::new("Btn Primary", "Btn_Primary.png");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"Btn Primary":{"image":"Btn_Primary.png","description":""}}"#
        );
    }

    #[test]
    fn manifest_entry_round_trips() {
        let entry = ManifestEntry::new("Icon / Close", "Icon___Close.png");
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: ManifestEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn leaf_with_children_is_rejected() {
        let node = SceneNode {
            name: "broken".into(),
            kind: NodeKind::Text,
            children: Some(vec![SceneNode::leaf("child", NodeKind::Vector)]),
        };
        assert!(node.validate().is_err());
    }

    #[test]
    fn nested_validation_reaches_grandchildren() {
        let bad_leaf = SceneNode {
            name: "bad".into(),
            kind: NodeKind::Rectangle,
            children: Some(vec![]),
        };
        let tree = SceneNode::container(
            "root",
            NodeKind::Frame,
            vec![SceneNode::container("mid", NodeKind::Group, vec![bad_leaf])],
        );
        assert!(tree.validate().is_err());
    }

    #[test]
    fn node_kind_wire_names_are_screaming_snake() {
        let json = serde_json::to_string(&NodeKind::ComponentSet).unwrap();
        assert_eq!(json, r#""COMPONENT_SET""#);
        let parsed: NodeKind = serde_json::from_str(r#""FRAME""#).unwrap();
        assert_eq!(parsed, NodeKind::Frame);
    }
}
