//! Depth-limited collection over scene trees.

use crate::domain::model::SceneNode;

/// Collect every node at exactly `target_depth` below `root`.
///
/// The root itself sits at depth 0. Traversal is pre-order, left to right,
/// and stops descending once a node is yielded: a node at the target depth
/// contributes itself, never its descendants. Branches shallower than the
/// target depth contribute nothing.
pub fn collect_at_depth(root: &SceneNode, target_depth: u32) -> Vec<&SceneNode> {
    let mut found = Vec::new();
    walk(root, target_depth, 0, &mut found);
    found
}

fn walk<'a>(node: &'a SceneNode, target: u32, depth: u32, found: &mut Vec<&'a SceneNode>) {
    if depth == target {
        found.push(node);
        return;
    }
    for child in node.children() {
        walk(child, target, depth + 1, found);
    }
}
