//! Random forest classifier exported from a fitted tree ensemble.
//!
//! Trees use the usual exported layout: a flat node array, root at index 0,
//! children always stored after their parent, and samples with
//! `x[feature] <= threshold` routed to the left child.

use serde::{Deserialize, Serialize};

/// One node of a decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Training samples (or sample weight) reaching this node
        cover: f64,
    },
    Leaf {
        /// Class distribution at the leaf (counts or fractions)
        value: Vec<f64>,
        cover: f64,
    },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

/// A single classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Check structure and turn leaf counts into class fractions
    fn prepare(&mut self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let covers: Vec<f64> = self.nodes.iter().map(TreeNode::cover).collect();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    cover,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on unknown feature {}", index, feature));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= covers.len() {
                            return Err(format!("node {} has invalid child {}", index, child));
                        }
                    }
                    let children = covers[*left] + covers[*right];
                    if *cover <= 0.0 || (children - *cover).abs() > 1e-6 * cover.abs().max(1.0) {
                        return Err(format!(
                            "node {} cover {} does not match its children ({})",
                            index, cover, children
                        ));
                    }
                }
                TreeNode::Leaf { value, cover } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} class values, expected {}",
                            index,
                            value.len(),
                            n_classes
                        ));
                    }
                    if *cover <= 0.0 {
                        return Err(format!("leaf {} has non-positive cover", index));
                    }
                    let total: f64 = value.iter().sum();
                    if total <= 0.0 {
                        return Err(format!("leaf {} has an empty class distribution", index));
                    }
                    value.iter_mut().for_each(|v| *v /= total);
                }
            }
        }
        Ok(())
    }

    /// Class distribution of the leaf reached by `x`
    pub fn leaf_value(&self, x: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value, .. } => return value,
            }
        }
    }

    /// Cover-weighted mean leaf value for one class
    pub fn expected_value(&self, class: usize) -> f64 {
        self.expected_from(0, class)
    }

    fn expected_from(&self, index: usize, class: usize) -> f64 {
        match &self.nodes[index] {
            TreeNode::Leaf { value, .. } => value[class],
            TreeNode::Split {
                left,
                right,
                cover,
                ..
            } => {
                (self.nodes[*left].cover() * self.expected_from(*left, class)
                    + self.nodes[*right].cover() * self.expected_from(*right, class))
                    / cover
            }
        }
    }
}

/// Averaging ensemble of classification trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    #[serde(default = "default_n_classes")]
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

fn default_n_classes() -> usize {
    2
}

impl RandomForest {
    pub(crate) fn prepare(&mut self) -> Result<(), String> {
        if self.n_classes != 2 {
            return Err(format!("expected a binary classifier, got {} classes", self.n_classes));
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter_mut().enumerate() {
            tree.prepare(self.n_features, self.n_classes)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Mean class distribution over all trees
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, v) in proba.iter_mut().zip(tree.leaf_value(x)) {
                *p += v;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }
}
