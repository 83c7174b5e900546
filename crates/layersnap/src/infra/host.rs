//! Capability boundary to the surrounding design-tool host.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::model::SceneNode;

/// A single host call failing. Isolated per item by the export loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("raster export failed for '{name}': {reason}")]
    RasterExport { name: String, reason: String },
}

/// Capabilities the host document editor provides to the plugin.
///
/// The scene graph, the raster pipeline, and the selection all live on the
/// host side; this trait is the seam the orchestrator works against. Raster
/// exports are async and may fail per call; the selection read is a
/// synchronous snapshot taken at call time.
#[async_trait]
pub trait SceneHost: Send + Sync {
    /// Snapshot of the user's current selection, in selection order.
    fn selection(&self) -> Vec<SceneNode>;

    /// Render `node` to raster bytes at `scale` times its natural bounds.
    async fn export_raster(&self, node: &SceneNode, scale: f32) -> Result<Vec<u8>, HostError>;
}
