//! Gradient-Boosted Tree Ensembles
//!
//! Inference over regression tree ensembles stored in the LightGBM text model
//! format. Only numerical splits are supported; the ensemble's raw output is
//! the sum of one leaf value per tree, passed through the objective's output
//! transform.
//!
//! Each tree is stored in the flat array layout of the dump: internal node `i`
//! splits on `split_feature[i]` at `threshold[i]`, and a negative child `c`
//! refers to leaf `!c`.

use std::path::Path;

use super::activation::Activation;
use super::{ModelError, ModelResult, ScoringModel, read_model_file};
use serde::{Deserialize, Serialize};

/// Values with magnitude at most this are treated as zero by `Zero` missing handling
const ZERO_THRESHOLD: f64 = 1e-35;

const CATEGORICAL_MASK: u8 = 1;
const DEFAULT_LEFT_MASK: u8 = 2;

/// How a split treats missing feature values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum MissingType {
    None,
    Zero,
    NaN,
}

impl MissingType {
    fn from_decision_type(decision_type: u8) -> Self {
        match (decision_type >> 2) & 3 {
            1 => MissingType::Zero,
            2 => MissingType::NaN,
            _ => MissingType::None,
        }
    }
}

/// One regression tree in flat array form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    split_feature: Vec<usize>,
    threshold: Vec<f64>,
    decision_type: Vec<u8>,
    left_child: Vec<i32>,
    right_child: Vec<i32>,
    leaf_value: Vec<f64>,
}

impl RegressionTree {
    /// A tree with a single leaf
    pub fn constant(value: f64) -> Self {
        Self {
            split_feature: Vec::new(),
            threshold: Vec::new(),
            decision_type: Vec::new(),
            left_child: Vec::new(),
            right_child: Vec::new(),
            leaf_value: vec![value],
        }
    }

    /// Number of leaves
    pub fn num_leaves(&self) -> usize {
        self.leaf_value.len()
    }

    /// Largest feature index used by a split
    pub fn max_feature(&self) -> Option<usize> {
        self.split_feature.iter().copied().max()
    }

    /// Predict for a single sample
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.split_feature.is_empty() {
            return self.leaf_value[0];
        }

        let mut node = 0usize;
        loop {
            let next = if self.goes_left(node, features) {
                self.left_child[node]
            } else {
                self.right_child[node]
            };
            if next < 0 {
                return self.leaf_value[(!next) as usize];
            }
            node = next as usize;
        }
    }

    fn goes_left(&self, node: usize, features: &[f64]) -> bool {
        let decision_type = self.decision_type[node];
        let missing = MissingType::from_decision_type(decision_type);
        let mut value = features.get(self.split_feature[node]).copied().unwrap_or(0.0);

        if value.is_nan() && missing != MissingType::NaN {
            value = 0.0;
        }
        let is_missing = match missing {
            MissingType::Zero => value.abs() <= ZERO_THRESHOLD,
            MissingType::NaN => value.is_nan(),
            MissingType::None => false,
        };

        if is_missing {
            decision_type & DEFAULT_LEFT_MASK != 0
        } else {
            value <= self.threshold[node]
        }
    }

    /// Check array shapes and that every path reaches a leaf
    fn validate(&self, tree_ix: usize) -> ModelResult<()> {
        let invalid = |message: String| ModelError::InvalidTree(format!("tree {tree_ix}: {message}"));

        let leaves = self.leaf_value.len();
        if leaves == 0 {
            return Err(invalid("no leaves".to_string()));
        }
        let internal = leaves - 1;
        for (name, len) in [
            ("split_feature", self.split_feature.len()),
            ("threshold", self.threshold.len()),
            ("decision_type", self.decision_type.len()),
            ("left_child", self.left_child.len()),
            ("right_child", self.right_child.len()),
        ] {
            if len != internal {
                return Err(invalid(format!(
                    "{name} has {len} entries, expected {internal}"
                )));
            }
        }

        for node in 0..internal {
            if self.decision_type[node] & CATEGORICAL_MASK != 0 {
                return Err(invalid(format!(
                    "node {node} uses a categorical split, which is not supported"
                )));
            }
            for child in [self.left_child[node], self.right_child[node]] {
                let in_range = if child < 0 {
                    ((!child) as usize) < leaves
                } else {
                    // Children are numbered after their parent, which rules out cycles.
                    (child as usize) > node && (child as usize) < internal
                };
                if !in_range {
                    return Err(invalid(format!("node {node} has invalid child {child}")));
                }
            }
        }
        Ok(())
    }
}

/// Output transform of the training objective
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Activation applied to the scaled raw score
    pub activation: Activation,
    /// Factor applied to the raw score before the activation
    pub scale: f64,
}

impl Objective {
    /// Identity transform
    pub const RAW: Objective = Objective {
        activation: Activation::Linear,
        scale: 1.0,
    };

    /// Parse an `objective=` line value such as `binary sigmoid:1`
    fn parse(value: &str, line: usize) -> ModelResult<Self> {
        let mut parts = value.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "binary" | "cross_entropy" | "xentropy" => {
                let mut scale = 1.0;
                for part in parts {
                    if let Some(raw) = part.strip_prefix("sigmoid:") {
                        scale = raw.parse::<f64>().map_err(|e| ModelError::Parse {
                            line,
                            message: format!("invalid sigmoid parameter '{raw}': {e}"),
                        })?;
                    }
                }
                Ok(Objective {
                    activation: Activation::Sigmoid,
                    scale,
                })
            }
            _ => Ok(Self::RAW),
        }
    }

    /// Transform a raw ensemble score
    pub fn apply(&self, raw: f64) -> f64 {
        match self.activation {
            Activation::Linear => raw,
            Activation::Sigmoid => self.activation.apply(self.scale * raw),
        }
    }
}

/// Gradient-boosted regression tree ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
    num_features: usize,
    objective: Objective,
    average_output: bool,
}

impl TreeEnsemble {
    /// Create from already-built trees
    pub fn new(
        trees: Vec<RegressionTree>,
        num_features: usize,
        objective: Objective,
    ) -> ModelResult<Self> {
        if trees.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        for (tree_ix, tree) in trees.iter().enumerate() {
            tree.validate(tree_ix)?;
            if let Some(feature) = tree.max_feature().filter(|&f| f >= num_features) {
                return Err(ModelError::InvalidTree(format!(
                    "tree {tree_ix} splits on feature {feature} but the model has {num_features} features"
                )));
            }
        }
        Ok(Self {
            trees,
            num_features,
            objective,
            average_output: false,
        })
    }

    /// Parse a LightGBM text model dump
    pub fn parse(text: &str) -> ModelResult<Self> {
        let mut max_feature_idx = None;
        let mut objective = Objective::RAW;
        let mut average_output = false;
        let mut trees = Vec::new();
        let mut current: Option<TreeBuilder> = None;

        for (line_ix, raw_line) in text.lines().enumerate() {
            let line_no = line_ix + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "end of trees" {
                break;
            }

            let Some((key, value)) = line.split_once('=') else {
                if line == "average_output" {
                    average_output = true;
                }
                continue;
            };

            if key == "Tree" {
                if let Some(builder) = current.take() {
                    trees.push(builder.finish()?);
                }
                current = Some(TreeBuilder::new(line_no));
                continue;
            }

            match current.as_mut() {
                Some(builder) => builder.set(key, value, line_no)?,
                None => match key {
                    "max_feature_idx" => {
                        max_feature_idx = Some(parse_scalar::<usize>(value, line_no)?);
                    }
                    "num_class" => {
                        let classes = parse_scalar::<usize>(value, line_no)?;
                        if classes != 1 {
                            return Err(ModelError::InvalidConfig(format!(
                                "multiclass models are not supported ({classes} classes)"
                            )));
                        }
                    }
                    "objective" => objective = Objective::parse(value, line_no)?,
                    _ => {}
                },
            }
        }
        if let Some(builder) = current.take() {
            trees.push(builder.finish()?);
        }

        let Some(max_feature_idx) = max_feature_idx else {
            return Err(ModelError::Parse {
                line: 0,
                message: "missing max_feature_idx".to_string(),
            });
        };

        let mut ensemble = Self::new(trees, max_feature_idx + 1, objective)?;
        ensemble.average_output = average_output;
        Ok(ensemble)
    }

    /// Load a LightGBM text model file
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        Self::parse(&read_model_file(path.as_ref())?)
    }

    /// Sum of leaf values before the objective transform
    pub fn raw_score(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        if self.average_output {
            sum / self.trees.len() as f64
        } else {
            sum
        }
    }

    /// Number of trees
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Get the objective transform
    pub fn objective(&self) -> Objective {
        self.objective
    }
}

impl ScoringModel for TreeEnsemble {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.objective.apply(self.raw_score(features))
    }
}

/// Accumulates the `key=value` lines of one `Tree=` block
struct TreeBuilder {
    start_line: usize,
    num_leaves: Option<usize>,
    split_feature: Vec<usize>,
    threshold: Vec<f64>,
    decision_type: Vec<u8>,
    left_child: Vec<i32>,
    right_child: Vec<i32>,
    leaf_value: Vec<f64>,
}

impl TreeBuilder {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            num_leaves: None,
            split_feature: Vec::new(),
            threshold: Vec::new(),
            decision_type: Vec::new(),
            left_child: Vec::new(),
            right_child: Vec::new(),
            leaf_value: Vec::new(),
        }
    }

    fn set(&mut self, key: &str, value: &str, line: usize) -> ModelResult<()> {
        match key {
            "num_leaves" => self.num_leaves = Some(parse_scalar(value, line)?),
            "num_cat" => {
                if parse_scalar::<usize>(value, line)? != 0 {
                    return Err(ModelError::InvalidTree(format!(
                        "tree starting at line {} has categorical splits, which are not supported",
                        self.start_line
                    )));
                }
            }
            "split_feature" => self.split_feature = parse_list(value, line)?,
            "threshold" => self.threshold = parse_list(value, line)?,
            "decision_type" => self.decision_type = parse_list(value, line)?,
            "left_child" => self.left_child = parse_list(value, line)?,
            "right_child" => self.right_child = parse_list(value, line)?,
            "leaf_value" => self.leaf_value = parse_list(value, line)?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> ModelResult<RegressionTree> {
        let num_leaves = self.num_leaves.ok_or_else(|| ModelError::Parse {
            line: self.start_line,
            message: "tree without num_leaves".to_string(),
        })?;
        if num_leaves != self.leaf_value.len() {
            return Err(ModelError::InvalidTree(format!(
                "tree starting at line {} declares {} leaves but lists {} leaf values",
                self.start_line,
                num_leaves,
                self.leaf_value.len()
            )));
        }
        Ok(RegressionTree {
            split_feature: self.split_feature,
            threshold: self.threshold,
            decision_type: self.decision_type,
            left_child: self.left_child,
            right_child: self.right_child,
            leaf_value: self.leaf_value,
        })
    }
}

fn parse_scalar<T: std::str::FromStr>(value: &str, line: usize) -> ModelResult<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ModelError::Parse {
        line,
        message: format!("invalid value '{}': {e}", value.trim()),
    })
}

fn parse_list<T: std::str::FromStr>(value: &str, line: usize) -> ModelResult<Vec<T>>
where
    T::Err: std::fmt::Display,
{
    value
        .split_whitespace()
        .map(|token| parse_scalar(token, line))
        .collect()
}
