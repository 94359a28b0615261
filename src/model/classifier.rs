//! Classifier artifacts.
//!
//! Two model families are understood, mirroring what the training notebook
//! can export: a logistic regression (one weight per feature plus an
//! intercept) and a random forest stored as flat per-tree node arrays. Both
//! only ever see the scaled vector.

use serde::Deserialize;
use std::path::Path;

use super::{read_artifact, ClassLabel, Classifier, WinnerConvention};
use crate::error::PipelineError;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Marker for a leaf in `children_left` / `children_right`.
const LEAF: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierArtifact {
    #[serde(flatten)]
    pub model: ClassifierModel,
    /// Class values as listed by the trainer; must be exactly `[0, 1]`.
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
    /// Which team class 1 stands for. `None` when the export did not record it.
    #[serde(default)]
    pub label_one_means: Option<WinnerConvention>,
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogisticRegression { coef: Vec<f64>, intercept: f64 },
    RandomForest { trees: Vec<DecisionTree> },
}

/// One fitted tree. Node `i` splits on `feature[i] <= threshold[i]`; leaves
/// carry per-class sample weights in `value[i]`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl ClassifierArtifact {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let artifact: ClassifierArtifact = read_artifact("model", path.as_ref())?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let labels: Vec<Option<ClassLabel>> =
            self.classes.iter().map(|c| ClassLabel::from_raw(*c)).collect();
        if labels != [Some(ClassLabel::Zero), Some(ClassLabel::One)] {
            return Err(PipelineError::StartupError(format!(
                "model classes must be [0, 1], got {:?}",
                self.classes
            )));
        }
        match &self.model {
            ClassifierModel::LogisticRegression { coef, intercept } => {
                if coef.is_empty() {
                    return Err(PipelineError::StartupError(
                        "logistic regression has no coefficients".into(),
                    ));
                }
                if coef.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
                    return Err(PipelineError::StartupError(
                        "logistic regression weights must be finite".into(),
                    ));
                }
            }
            ClassifierModel::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(PipelineError::StartupError("random forest has no trees".into()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate()
                        .map_err(|e| PipelineError::StartupError(format!("tree {}: {}", i, e)))?;
                }
            }
        }
        Ok(())
    }

    /// Convention recorded in the artifact, or the default when absent.
    pub fn winner_convention(&self) -> WinnerConvention {
        self.label_one_means.unwrap_or_default()
    }
}

impl DecisionTree {
    fn validate(&self) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err("node arrays differ in length".into());
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has a single child", node));
                }
                let total: f64 = self.value[node].iter().sum();
                if !total.is_finite() || total <= 0.0 || self.value[node].iter().any(|v| *v < 0.0) {
                    return Err(format!("leaf {} has no class weight", node));
                }
                continue;
            }
            // Children always come after their parent, which also rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} points to invalid child {}", node, child));
                }
            }
            if self.feature[node] < 0 {
                return Err(format!("node {} splits on a negative feature", node));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("node {} has a non-finite threshold", node));
            }
        }
        Ok(())
    }

    /// Normalised class distribution of the leaf `x` falls into.
    fn leaf_distribution(&self, x: &[f64]) -> Result<[f64; 2], PipelineError> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            let value = x.get(feature).ok_or_else(|| {
                PipelineError::InferenceError(format!(
                    "tree splits on feature {} but input has {}",
                    feature,
                    x.len()
                ))
            })?;
            node = if *value <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let [w0, w1] = self.value[node];
        let total = w0 + w1;
        Ok([w0 / total, w1 / total])
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

fn check_finite(scaled: &FeatureVector) -> Result<(), PipelineError> {
    if scaled.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::InferenceError(
            "input contains a non-finite value".into(),
        ))
    }
}

/// Signed distance to the logistic decision boundary, `coef . x + intercept`.
fn decision_value(coef: &[f64], intercept: f64, x: &[f64]) -> Result<f64, PipelineError> {
    if coef.len() != FEATURE_COUNT {
        return Err(PipelineError::InferenceError(format!(
            "model expects {} features, got {}",
            coef.len(),
            x.len()
        )));
    }
    Ok(coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + intercept)
}

impl Classifier for ClassifierArtifact {
    fn predict_proba(&self, scaled: &FeatureVector) -> Result<[f64; 2], PipelineError> {
        check_finite(scaled)?;
        let x = scaled.values();
        match &self.model {
            ClassifierModel::LogisticRegression { coef, intercept } => {
                let p1 = sigmoid(decision_value(coef, *intercept, x)?);
                Ok([1.0 - p1, p1])
            }
            ClassifierModel::RandomForest { trees } => {
                let mut acc = [0.0, 0.0];
                for tree in trees {
                    let [p0, p1] = tree.leaf_distribution(x)?;
                    acc[0] += p0;
                    acc[1] += p1;
                }
                let n = trees.len() as f64;
                Ok([acc[0] / n, acc[1] / n])
            }
        }
    }

    /// Logistic models decide on the sign of the decision value, not on the
    /// rounded probability, so tiny positive margins still give class 1.
    fn predict_with_proba(
        &self,
        scaled: &FeatureVector,
    ) -> Result<(ClassLabel, [f64; 2]), PipelineError> {
        match &self.model {
            ClassifierModel::LogisticRegression { coef, intercept } => {
                check_finite(scaled)?;
                let z = decision_value(coef, *intercept, scaled.values())?;
                let p1 = sigmoid(z);
                let label = if z > 0.0 { ClassLabel::One } else { ClassLabel::Zero };
                Ok((label, [1.0 - p1, p1]))
            }
            ClassifierModel::RandomForest { .. } => {
                let proba = self.predict_proba(scaled)?;
                Ok((ClassLabel::from_proba(proba), proba))
            }
        }
    }

    fn name(&self) -> &str {
        match self.model {
            ClassifierModel::LogisticRegression { .. } => "logistic_regression",
            ClassifierModel::RandomForest { .. } => "random_forest",
        }
    }
}
