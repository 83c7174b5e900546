//! In-memory stand-in for the live host, backed by scene fixture files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::model::SceneNode;
use crate::infra::host::{HostError, SceneHost};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Serialized form of a fixture scene: the selection roots plus names whose
/// raster export should be made to fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureScene {
    #[serde(default)]
    pub selection: Vec<SceneNode>,
    #[serde(default)]
    pub fail: Vec<String>,
}

/// Deterministic [`SceneHost`] used by the CLI and tests.
///
/// Raster output is a placeholder payload (PNG magic followed by the node
/// name and scale), not a real encoding; the live host owns actual
/// rasterization.
#[derive(Debug, Clone, Default)]
pub struct FixtureHost {
    selection: Vec<SceneNode>,
    failing: HashSet<String>,
}

impl FixtureHost {
    pub fn new(selection: Vec<SceneNode>) -> Self {
        Self {
            selection,
            failing: HashSet::new(),
        }
    }

    /// Mark node names whose export calls will fail.
    pub fn failing_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(names.into_iter().map(Into::into));
        self
    }

    /// Load and validate a scene fixture from a JSON file.
    pub fn from_scene_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file: {}", path.display()))?;
        let scene: FixtureScene = serde_json::from_str(&data)
            .with_context(|| format!("invalid scene data in {}", path.display()))?;
        for root in &scene.selection {
            root.validate()
                .with_context(|| format!("malformed scene tree in {}", path.display()))?;
        }
        Ok(Self::new(scene.selection).failing_on(scene.fail))
    }
}

#[async_trait]
impl SceneHost for FixtureHost {
    fn selection(&self) -> Vec<SceneNode> {
        self.selection.clone()
    }

    async fn export_raster(&self, node: &SceneNode, scale: f32) -> Result<Vec<u8>, HostError> {
        if self.failing.contains(&node.name) {
            return Err(HostError::RasterExport {
                name: node.name.clone(),
                reason: "render pipeline rejected the node".into(),
            });
        }
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(format!("{}@{scale}x", node.name).as_bytes());
        Ok(bytes)
    }
}
