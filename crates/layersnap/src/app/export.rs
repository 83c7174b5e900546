//! Sequential export orchestration over the host raster capability.

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::app::collect::collect_at_depth;
use crate::app::sanitize::sanitize_file_name;
use crate::domain::errors::ExportError;
use crate::domain::model::{ExportBundle, ImageArtifact, ManifestEntry, SceneNode};
use crate::infra::host::SceneHost;

/// Raster scale requested from the host for every export.
pub const RASTER_SCALE: f32 = 2.0;

/// Observable milestones of a run, emitted in order as the loop advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    /// Emitted before each item's export attempt; `current` is 1-based.
    Progress {
        current: usize,
        total: usize,
        name: String,
    },
    /// One item's raster export failed; the run continues with the next item.
    ItemFailed { name: String, reason: String },
}

/// Drives target collection and the strictly sequential export loop.
///
/// Exports are awaited one at a time, never in parallel, which keeps host
/// render load bounded at the cost of latency linear in item count.
pub struct ExportRunner<'a, H: SceneHost> {
    host: &'a H,
}

impl<'a, H: SceneHost> ExportRunner<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Run one export over `selection` at `depth`.
    ///
    /// Collects targets from each selected root in selection order (no
    /// de-duplication across roots), then exports them sequentially. A failed
    /// item is reported through `on_event` and skipped; it never aborts the
    /// loop and is never retried. Manifest entries and artifacts are appended
    /// pairwise, so the returned bundle keeps them index-aligned with failed
    /// items absent from both.
    pub async fn run(
        &self,
        selection: &[SceneNode],
        depth: u32,
        on_event: &mut dyn FnMut(ExportEvent),
    ) -> Result<ExportBundle, ExportError> {
        if selection.is_empty() {
            return Err(ExportError::NoSelection);
        }

        let mut targets: Vec<&SceneNode> = Vec::new();
        for root in selection {
            let found = collect_at_depth(root, depth);
            debug!(root = %root.name, depth, count = found.len(), "collected targets");
            targets.extend(found);
        }
        if targets.is_empty() {
            return Err(ExportError::NoTargetsAtDepth { depth });
        }

        let total = targets.len();
        let mut bundle = ExportBundle::default();
        for (index, node) in targets.iter().copied().enumerate() {
            on_event(ExportEvent::Progress {
                current: index + 1,
                total,
                name: node.name.clone(),
            });

            match self.host.export_raster(node, RASTER_SCALE).await {
                Ok(bytes) => {
                    let file_name = format!("{}.png", sanitize_file_name(&node.name));
                    debug!(name = %node.name, file = %file_name, size = bytes.len(), "exported node");
                    bundle.artifacts.push(ImageArtifact {
                        file_name: file_name.clone(),
                        bytes,
                    });
                    bundle.manifest.push(ManifestEntry::new(node.name.clone(), file_name));
                }
                Err(err) => {
                    warn!(name = %node.name, error = %err, "raster export failed, skipping item");
                    on_event(ExportEvent::ItemFailed {
                        name: node.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        bundle.json = serde_json::to_string_pretty(&bundle.manifest)
            .context("failed to serialize manifest")?;
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NodeKind;
    use crate::infra::fixture::FixtureHost;

    fn sample_selection() -> Vec<SceneNode> {
        vec![SceneNode::container(
            "Root",
            NodeKind::Frame,
            vec![
                SceneNode::container(
                    "A",
                    NodeKind::Group,
                    vec![SceneNode::leaf("A1", NodeKind::Text)],
                ),
                SceneNode::container(
                    "B",
                    NodeKind::Group,
                    vec![SceneNode::leaf("B1", NodeKind::Vector)],
                ),
            ],
        )]
    }

    #[tokio::test]
    async fn exports_children_at_depth_one_in_order() {
        let selection = sample_selection();
        let host = FixtureHost::new(selection.clone());
        let runner = ExportRunner::new(&host);

        let mut events = Vec::new();
        let bundle = runner
            .run(&selection, 1, &mut |event| events.push(event))
            .await
            .unwrap();

        let names: Vec<_> = bundle.manifest.iter().map(|e| e.node_name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        let files: Vec<_> = bundle.artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(files, ["A.png", "B.png"]);
        assert_eq!(
            events,
            [
                ExportEvent::Progress { current: 1, total: 2, name: "A".into() },
                ExportEvent::Progress { current: 2, total: 2, name: "B".into() },
            ]
        );
    }

    #[tokio::test]
    async fn empty_selection_aborts_before_traversal() {
        let host = FixtureHost::new(Vec::new());
        let runner = ExportRunner::new(&host);
        let mut events: Vec<ExportEvent> = Vec::new();

        let err = runner
            .run(&[], 0, &mut |event| events.push(event))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::NoSelection));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn depth_beyond_tree_aborts_with_no_targets() {
        let selection = sample_selection();
        let host = FixtureHost::new(selection.clone());
        let runner = ExportRunner::new(&host);

        let mut events = Vec::new();
        let err = runner
            .run(&selection, 9, &mut |event| events.push(event))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::NoTargetsAtDepth { depth: 9 }));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn failed_item_is_skipped_in_lockstep() {
        let selection = vec![SceneNode::container(
            "Root",
            NodeKind::Frame,
            vec![
                SceneNode::leaf("One", NodeKind::Component),
                SceneNode::leaf("Two", NodeKind::Component),
                SceneNode::leaf("Three", NodeKind::Component),
            ],
        )];
        let host = FixtureHost::new(selection.clone()).failing_on(["Two"]);
        let runner = ExportRunner::new(&host);

        let mut events = Vec::new();
        let bundle = runner
            .run(&selection, 1, &mut |event| events.push(event))
            .await
            .unwrap();

        let names: Vec<_> = bundle.manifest.iter().map(|e| e.node_name.as_str()).collect();
        assert_eq!(names, ["One", "Three"]);
        assert_eq!(bundle.manifest.len(), bundle.artifacts.len());

        // Two progress events precede the failure, and the loop continues.
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], ExportEvent::Progress { current: 1, .. }));
        assert!(matches!(&events[1], ExportEvent::Progress { current: 2, .. }));
        assert!(matches!(&events[2], ExportEvent::ItemFailed { name, .. } if name == "Two"));
        assert!(matches!(&events[3], ExportEvent::Progress { current: 3, .. }));
    }

    #[tokio::test]
    async fn duplicate_roots_export_twice() {
        let root = SceneNode::leaf("Twice", NodeKind::Component);
        let selection = vec![root.clone(), root];
        let host = FixtureHost::new(selection.clone());
        let runner = ExportRunner::new(&host);

        let bundle = runner.run(&selection, 0, &mut |_| {}).await.unwrap();
        assert_eq!(bundle.manifest.len(), 2);
        assert_eq!(bundle.artifacts[0], bundle.artifacts[1]);
    }

    #[tokio::test]
    async fn manifest_json_is_pretty_printed() {
        let selection = vec![SceneNode::leaf("Solo", NodeKind::Component)];
        let host = FixtureHost::new(selection.clone());
        let runner = ExportRunner::new(&host);

        let bundle = runner.run(&selection, 0, &mut |_| {}).await.unwrap();
        assert!(bundle.json.contains("\"Solo\""));
        assert!(bundle.json.contains("\n  "));
    }
}
