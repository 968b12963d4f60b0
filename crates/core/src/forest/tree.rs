//! Decision tree structures for forest inference

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// Internal nodes have `feature_idx >= 0` and child indices into the
/// tree's node vector; leaves have `feature_idx == -1` and carry the
/// predicted class in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (position in the node vector)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold; `feature <= threshold` goes left
    pub threshold: f64,

    /// Predicted class (leaf nodes only)
    pub leaf: Option<usize>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, class: usize) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(class),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single decision tree; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Traverse to a leaf and return its class.
    ///
    /// Returns `None` only for structurally broken trees (which
    /// `validate` rejects at load time) or out-of-range feature indices;
    /// the forest drops such votes rather than inventing one.
    pub fn evaluate(&self, features: &[f64]) -> Option<usize> {
        let mut idx = 0usize;

        loop {
            let node = self.nodes.get(idx)?;

            if node.is_leaf() {
                return node.leaf;
            }

            let feature_idx = node.feature_idx as usize;
            let value = *features.get(feature_idx)?;

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return None;
            }
            idx = next as usize;
        }
    }

    /// Check structural invariants: child indices in range, internal nodes
    /// split on a real feature, leaves carry a class below `class_count`.
    pub fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    None => return Err(format!("leaf node {i} has no class")),
                    Some(class) if class >= class_count => {
                        return Err(format!("leaf node {i} class {class} out of range"));
                    }
                    Some(_) => {}
                }
            } else {
                if node.left < 0 || node.left as usize >= self.nodes.len() {
                    return Err(format!("node {i} has invalid left child {}", node.left));
                }
                if node.right < 0 || node.right as usize >= self.nodes.len() {
                    return Err(format!("node {i} has invalid right child {}", node.right));
                }
                if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                    return Err(format!(
                        "node {i} has invalid feature index {}",
                        node.feature_idx
                    ));
                }
            }
        }

        Ok(())
    }

    /// Depth of the tree, counting the root as depth 0
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize, depth: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    let left = walk(nodes, node.left as usize, depth + 1);
                    let right = walk(nodes, node.right as usize, depth + 1);
                    left.max(right)
                }
                _ => depth,
            }
        }
        walk(&self.nodes, 0, 0)
    }
}
