//! Additive feature attribution for bundle models.
//!
//! Tree models use path-dependent TreeSHAP: conditional expectations follow
//! the training cover stored on each node, so the attributions plus the
//! cover-weighted mean output add up exactly to the model's probability.
//! Linear models attribute `w_i * (x_i - mean_i)` in log-odds space.

use crate::models::classifier::Classifier;
use crate::models::forest::{DecisionTree, TreeNode};
use serde::{Deserialize, Serialize};

/// Explainer section of the artifact bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ExplainerSpec {
    Tree,
    Linear {
        /// Mean of the scaled training data; zeros when absent
        #[serde(default)]
        background_mean: Option<Vec<f64>>,
    },
}

/// Attribution for one row
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// Expected output per class
    pub base_values: [f64; 2],
    /// `values[feature][class]`
    pub values: Vec<[f64; 2]>,
}

impl Attribution {
    /// Base value and per-feature contributions for one class
    pub fn for_class(&self, class: usize) -> (f64, Vec<f64>) {
        (
            self.base_values[class],
            self.values.iter().map(|v| v[class]).collect(),
        )
    }
}

/// Explainer bound to a specific model
#[derive(Debug, Clone)]
pub enum Explainer {
    Tree(TreeExplainer),
    Linear(LinearExplainer),
}

impl Explainer {
    /// Bind an explainer spec to the model it explains
    pub fn build(spec: &ExplainerSpec, model: &Classifier) -> Result<Self, String> {
        match (spec, model) {
            (ExplainerSpec::Tree, Classifier::RandomForest(forest)) => {
                Ok(Explainer::Tree(TreeExplainer::new(forest.trees.clone(), forest.n_features)))
            }
            (ExplainerSpec::Linear { background_mean }, Classifier::LogisticRegression(lr)) => {
                let mean = background_mean
                    .clone()
                    .unwrap_or_else(|| vec![0.0; lr.n_features()]);
                if mean.len() != lr.n_features() {
                    return Err(format!(
                        "linear explainer background has {} values, model has {} features",
                        mean.len(),
                        lr.n_features()
                    ));
                }
                Ok(Explainer::Linear(LinearExplainer {
                    coef: lr.coef.clone(),
                    intercept: lr.intercept,
                    background_mean: mean,
                }))
            }
            (spec, model) => Err(format!(
                "explainer {:?} cannot explain a {} model",
                spec,
                model.name()
            )),
        }
    }

    pub fn explain(&self, x: &[f64]) -> Attribution {
        match self {
            Explainer::Tree(explainer) => explainer.explain(x),
            Explainer::Linear(explainer) => explainer.explain(x),
        }
    }
}

/// Log-odds attribution for logistic regression
#[derive(Debug, Clone)]
pub struct LinearExplainer {
    coef: Vec<f64>,
    intercept: f64,
    background_mean: Vec<f64>,
}

impl LinearExplainer {
    pub fn explain(&self, x: &[f64]) -> Attribution {
        let base = self.intercept
            + self
                .coef
                .iter()
                .zip(&self.background_mean)
                .map(|(w, m)| w * m)
                .sum::<f64>();

        let values = self
            .coef
            .iter()
            .zip(x.iter().zip(&self.background_mean))
            .map(|(w, (v, m))| {
                let phi = w * (v - m);
                [-phi, phi]
            })
            .collect();

        Attribution {
            base_values: [-base, base],
            values,
        }
    }
}

/// Path-dependent TreeSHAP over an averaging ensemble
#[derive(Debug, Clone)]
pub struct TreeExplainer {
    trees: Vec<DecisionTree>,
    n_features: usize,
    base_values: [f64; 2],
}

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

impl TreeExplainer {
    pub fn new(trees: Vec<DecisionTree>, n_features: usize) -> Self {
        let n = trees.len().max(1) as f64;
        let mut base_values = [0.0; 2];
        for (class, base) in base_values.iter_mut().enumerate() {
            *base = trees.iter().map(|t| t.expected_value(class)).sum::<f64>() / n;
        }
        Self {
            trees,
            n_features,
            base_values,
        }
    }

    pub fn base_values(&self) -> [f64; 2] {
        self.base_values
    }

    pub fn explain(&self, x: &[f64]) -> Attribution {
        let mut values = vec![[0.0; 2]; self.n_features];
        let scale = 1.0 / self.trees.len().max(1) as f64;

        for tree in &self.trees {
            let mut phi = vec![[0.0; 2]; self.n_features];
            recurse(tree, x, 0, Vec::new(), 1.0, 1.0, None, &mut phi);
            for (total, tree_phi) in values.iter_mut().zip(&phi) {
                total[0] += tree_phi[0] * scale;
                total[1] += tree_phi[1] * scale;
            }
        }

        Attribution {
            base_values: self.base_values,
            values,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &DecisionTree,
    x: &[f64],
    node: usize,
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
    phi: &mut [[f64; 2]],
) {
    extend_path(&mut path, zero_fraction, one_fraction, feature);

    match &tree.nodes[node] {
        TreeNode::Leaf { value, .. } => {
            for i in 1..path.len() {
                let weight = unwound_path_sum(&path, i);
                let element = path[i];
                if let Some(f) = element.feature {
                    let share = weight * (element.one_fraction - element.zero_fraction);
                    phi[f][0] += share * value[0];
                    phi[f][1] += share * value[1];
                }
            }
        }
        TreeNode::Split {
            feature: split,
            threshold,
            left,
            right,
            cover,
        } => {
            let (hot, cold) = if x[*split] <= *threshold {
                (*left, *right)
            } else {
                (*right, *left)
            };
            let hot_zero_fraction = tree.nodes[hot].cover() / cover;
            let cold_zero_fraction = tree.nodes[cold].cover() / cover;
            let mut incoming_zero_fraction = 1.0;
            let mut incoming_one_fraction = 1.0;

            // a feature seen higher up the path is unwound and re-split here
            if let Some(index) = path.iter().position(|e| e.feature == Some(*split)) {
                incoming_zero_fraction = path[index].zero_fraction;
                incoming_one_fraction = path[index].one_fraction;
                unwind_path(&mut path, index);
            }

            recurse(
                tree,
                x,
                hot,
                path.clone(),
                hot_zero_fraction * incoming_zero_fraction,
                incoming_one_fraction,
                Some(*split),
                phi,
            );
            recurse(
                tree,
                x,
                cold,
                path,
                cold_zero_fraction * incoming_zero_fraction,
                0.0,
                Some(*split),
                phi,
            );
        }
    }
}

fn extend_path(
    path: &mut Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if depth == 0 { 1.0 } else { 0.0 },
    });
    for i in (0..depth).rev() {
        path[i + 1].pweight +=
            one_fraction * path[i].pweight * (i + 1) as f64 / (depth + 1) as f64;
        path[i].pweight =
            zero_fraction * path[i].pweight * (depth - i) as f64 / (depth + 1) as f64;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let mut next_one_portion = path[depth].pweight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight =
                next_one_portion * (depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
            next_one_portion =
                tmp - path[i].pweight * zero_fraction * (depth - i) as f64 / (depth + 1) as f64;
        } else {
            path[i].pweight =
                path[i].pweight * (depth + 1) as f64 / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let mut next_one_portion = path[depth].pweight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * (depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion =
                path[i].pweight - tmp * zero_fraction * ((depth - i) as f64 / (depth + 1) as f64);
        } else if zero_fraction != 0.0 {
            total += (path[i].pweight / zero_fraction) / ((depth - i) as f64 / (depth + 1) as f64);
        }
    }
    total
}
