//! Array-backed binary decision trees.
//!
//! Every artifact format stores its trees the same way: a flat list of
//! nodes, root first, where split nodes refer to their children by index.
//! Only the leaf payload differs (a margin, a class distribution or a
//! class index), so [`Tree`] is generic over it.

use serde::Deserialize;

use crate::ModelError;

/// Which side a sample equal to the threshold falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// `x < threshold` goes left. Gradient-boosted trees use this.
    LessThan,
    /// `x <= threshold` goes left. Scikit-learn trees use this.
    LessOrEqual,
}

impl SplitRule {
    #[must_use]
    pub fn goes_left(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::LessThan => value < threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }
}

/// One node as stored in an artifact.
///
/// A node with a `feature` is a split; anything else is parsed as the leaf
/// payload `L`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node<L> {
    Split {
        /// Index into the feature vector.
        feature: usize,
        threshold: f64,
        /// Index of the left child node.
        left: usize,
        /// Index of the right child node.
        right: usize,
    },
    Leaf(L),
}

/// A tree as stored in an artifact, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTree<L> {
    pub nodes: Vec<Node<L>>,
}

/// A validated tree.
///
/// Every child index points strictly forward and stays in bounds, and every
/// split feature is below the feature count the tree was validated
/// against, so evaluation always terminates at a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<L> {
    nodes: Vec<Node<L>>,
}

impl<L> Tree<L> {
    /// Validates `nodes` as tree number `index` of an ensemble over
    /// `n_features` features. `check_leaf` validates each leaf payload and
    /// returns a reason on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedTree`] describing the first bad node.
    pub fn new(
        index: usize,
        nodes: Vec<Node<L>>,
        n_features: usize,
        check_leaf: impl Fn(&L) -> Result<(), String>,
    ) -> Result<Self, ModelError> {
        let malformed = |node: usize, reason: String| ModelError::MalformedTree {
            tree: index,
            node,
            reason,
        };

        if nodes.is_empty() {
            return Err(malformed(0, "tree has no nodes".to_string()));
        }

        let len = nodes.len();
        for (idx, node) in nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(malformed(
                            idx,
                            format!("feature {feature} out of range for {n_features} features"),
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(malformed(idx, format!("threshold {threshold} is not finite")));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= len {
                            return Err(malformed(
                                idx,
                                format!("child {child} must point forward within {len} nodes"),
                            ));
                        }
                    }
                }
                Node::Leaf(leaf) => check_leaf(leaf).map_err(|reason| malformed(idx, reason))?,
            }
        }

        Ok(Self { nodes })
    }

    /// Walks from the root to the leaf `features` falls into.
    ///
    /// `features` must have at least as many entries as the feature count
    /// the tree was validated against.
    #[must_use]
    pub fn leaf(&self, features: &[f64], rule: SplitRule) -> &L {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(leaf) => return leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if rule.goes_left(features[*feature], *threshold) {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf(_)))
            .count()
    }
}
