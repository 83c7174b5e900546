//! Domain-specific errors.

use thiserror::Error;

use crate::domain::model::NodeKind;

/// Run-aborting export failures. Display texts for the selection and depth
/// cases are what the host UI shows the user, so they stay verbatim.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Please select at least one component, frame, or group to export.")]
    NoSelection,
    #[error("No components found at depth {depth}. Try adjusting the depth setting.")]
    NoTargetsAtDepth { depth: u32 },
    /// Anything else surfaced during a run; reported to the user verbatim.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Structural problems in an ingested scene tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node '{name}' of leaf kind {kind:?} carries children")]
    ChildrenOnLeaf { name: String, kind: NodeKind },
}
