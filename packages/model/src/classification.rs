//! Tree-based classifiers: a probability-producing random forest and a
//! single label-only decision tree.

use std::path::Path;

use serde::Deserialize;

use crate::tree::{Node, RawTree, SplitRule, Tree};
use crate::{ClassificationModel, ModelError, argmax, check_feature_count, read_artifact};

/// Leaf payload of a forest tree: per-class sample counts or weights.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributionLeaf {
    pub distribution: Vec<f64>,
}

/// Leaf payload of a label-only tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassLeaf {
    pub class: usize,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClassifierArtifact {
    Forest {
        feature_names: Vec<String>,
        n_classes: usize,
        trees: Vec<RawTree<DistributionLeaf>>,
    },
    Tree {
        feature_names: Vec<String>,
        n_classes: usize,
        nodes: Vec<Node<ClassLeaf>>,
    },
}

fn check_header(feature_names: &[String], n_classes: usize) -> Result<(), ModelError> {
    if feature_names.is_empty() {
        return Err(ModelError::InvalidArtifact(
            "classification model lists no feature names".to_string(),
        ));
    }
    if n_classes == 0 {
        return Err(ModelError::InvalidArtifact(
            "classification model has no classes".to_string(),
        ));
    }
    Ok(())
}

/// A random forest whose leaves hold class distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestClassifier {
    feature_names: Vec<String>,
    n_classes: usize,
    trees: Vec<Tree<DistributionLeaf>>,
}

impl ForestClassifier {
    fn new(
        feature_names: Vec<String>,
        n_classes: usize,
        trees: Vec<RawTree<DistributionLeaf>>,
    ) -> Result<Self, ModelError> {
        check_header(&feature_names, n_classes)?;
        if trees.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "forest has no trees".to_string(),
            ));
        }

        let n_features = feature_names.len();
        let check_leaf = |leaf: &DistributionLeaf| {
            if leaf.distribution.len() != n_classes {
                return Err(format!(
                    "distribution has {} entries, expected {n_classes}",
                    leaf.distribution.len()
                ));
            }
            if leaf
                .distribution
                .iter()
                .any(|weight| !weight.is_finite() || *weight < 0.0)
            {
                return Err("distribution weights must be finite and >= 0".to_string());
            }
            if leaf.distribution.iter().sum::<f64>() <= 0.0 {
                return Err("distribution weights sum to zero".to_string());
            }
            Ok(())
        };

        let trees = trees
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Tree::new(index, raw.nodes, n_features, check_leaf))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            feature_names,
            n_classes,
            trees,
        })
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl ClassificationModel for ForestClassifier {
    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict(&self, features: &[f64]) -> Result<usize, ModelError> {
        let proba = self.predict_proba(features)?;
        argmax(&proba).ok_or_else(|| {
            ModelError::InvalidArtifact("forest produced no probabilities".to_string())
        })
    }

    fn supports_probability(&self) -> bool {
        true
    }

    #[allow(clippy::cast_precision_loss)]
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_feature_count(self.feature_names.len(), features)?;

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = &tree.leaf(features, SplitRule::LessOrEqual).distribution;
            let total: f64 = leaf.iter().sum();
            for (acc, weight) in proba.iter_mut().zip(leaf) {
                *acc += weight / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        log::debug!("Forest class probabilities: {proba:?}");

        Ok(proba)
    }
}

/// A single decision tree whose leaves hold a class index. It cannot
/// report probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeClassifier {
    feature_names: Vec<String>,
    n_classes: usize,
    tree: Tree<ClassLeaf>,
}

impl TreeClassifier {
    fn new(
        feature_names: Vec<String>,
        n_classes: usize,
        nodes: Vec<Node<ClassLeaf>>,
    ) -> Result<Self, ModelError> {
        check_header(&feature_names, n_classes)?;
        let tree = Tree::new(0, nodes, feature_names.len(), |leaf: &ClassLeaf| {
            if leaf.class < n_classes {
                Ok(())
            } else {
                Err(format!(
                    "class {} out of range for {n_classes} classes",
                    leaf.class
                ))
            }
        })?;

        Ok(Self {
            feature_names,
            n_classes,
            tree,
        })
    }
}

impl ClassificationModel for TreeClassifier {
    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict(&self, features: &[f64]) -> Result<usize, ModelError> {
        check_feature_count(self.feature_names.len(), features)?;
        Ok(self.tree.leaf(features, SplitRule::LessOrEqual).class)
    }
}

/// Parses and validates a classification artifact of either kind.
///
/// # Errors
///
/// Returns [`ModelError`] if the JSON is malformed, has an unknown `type`,
/// or contains a structurally broken tree.
pub fn classifier_from_json(json: &str) -> Result<Box<dyn ClassificationModel>, ModelError> {
    let artifact: ClassifierArtifact = serde_json::from_str(json)?;
    Ok(match artifact {
        ClassifierArtifact::Forest {
            feature_names,
            n_classes,
            trees,
        } => {
            let forest = ForestClassifier::new(feature_names, n_classes, trees)?;
            log::debug!(
                "Parsed forest classifier ({} trees, {n_classes} classes)",
                forest.n_trees()
            );
            Box::new(forest)
        }
        ClassifierArtifact::Tree {
            feature_names,
            n_classes,
            nodes,
        } => {
            log::debug!("Parsed single-tree classifier ({n_classes} classes)");
            Box::new(TreeClassifier::new(feature_names, n_classes, nodes)?)
        }
    })
}

/// Loads a classification artifact from `path`.
///
/// # Errors
///
/// Returns [`ModelError`] if the file cannot be read or is not a valid
/// classification artifact.
pub fn load_classification_model(path: &Path) -> Result<Box<dyn ClassificationModel>, ModelError> {
    let model = classifier_from_json(&read_artifact(path)?)?;
    log::info!(
        "Loaded classification model from {} ({} classes, probabilities {})",
        path.display(),
        model.n_classes(),
        if model.supports_probability() {
            "available"
        } else {
            "unavailable"
        }
    );
    Ok(model)
}
