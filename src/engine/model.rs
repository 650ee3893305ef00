//! Classifier artifacts
//!
//! A model artifact is a JSON document tagged by `type`. Two families are
//! supported: linear (logistic regression) and a single decision tree. Both
//! accept an optional standard scaler applied before scoring.

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::utils::math::{argmax, dot};

use super::ModelError;

/// Read-only classifier shared by every in-flight request
pub trait Classifier: Send + Sync + 'static {
    /// Short name of the model family
    fn kind(&self) -> &'static str;

    /// Number of columns each sample must have
    fn n_features(&self) -> usize;

    /// Class labels the model can emit
    fn classes(&self) -> &[i64];

    /// Predict one label per row of `samples` (rows are samples, columns features)
    fn predict(&self, samples: ArrayView2<'_, f64>) -> Result<Array1<i64>, ModelError>;
}

/// Standardization applied as `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(ModelError::Invalid(format!(
                "scaler expects {} features, got mean={} scale={}",
                n_features,
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(idx) = self.scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ModelError::Invalid(format!("scaler scale[{}] must be finite and non-zero", idx)));
        }
        Ok(())
    }

    fn transform(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// One node of a decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: usize,
    },
}

/// Serialized model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression {
        n_features: usize,
        classes: Vec<i64>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
        #[serde(default)]
        scaler: Option<StandardScaler>,
    },
    DecisionTree {
        n_features: usize,
        classes: Vec<i64>,
        nodes: Vec<TreeNode>,
        #[serde(default)]
        scaler: Option<StandardScaler>,
    },
}

impl ModelArtifact {
    /// Parse an artifact from JSON text
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate dimensions and indices, then build the matching classifier
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ModelError> {
        match self {
            ModelArtifact::LogisticRegression {
                n_features,
                classes,
                coefficients,
                intercepts,
                scaler,
            } => {
                let model = LogisticRegression {
                    n_features,
                    classes,
                    coefficients,
                    intercepts,
                    scaler,
                };
                model.validate()?;
                Ok(Box::new(model))
            }
            ModelArtifact::DecisionTree {
                n_features,
                classes,
                nodes,
                scaler,
            } => {
                let model = DecisionTree {
                    n_features,
                    classes,
                    nodes,
                    scaler,
                };
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

fn validate_common(n_features: usize, classes: &[i64], scaler: Option<&StandardScaler>) -> Result<(), ModelError> {
    if n_features == 0 {
        return Err(ModelError::Invalid("n_features must be non-zero".into()));
    }
    if classes.len() < 2 {
        return Err(ModelError::Invalid(format!("need at least 2 classes, got {}", classes.len())));
    }
    if let Some(scaler) = scaler {
        scaler.validate(n_features)?;
    }
    Ok(())
}

fn check_columns(samples: &ArrayView2<'_, f64>, n_features: usize) -> Result<(), ModelError> {
    if samples.ncols() != n_features {
        return Err(ModelError::InvalidInput {
            expected: n_features,
            received: samples.ncols(),
        });
    }
    Ok(())
}

/// Linear classifier; one coefficient row for binary, one per class otherwise
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    n_features: usize,
    classes: Vec<i64>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), ModelError> {
        validate_common(self.n_features, &self.classes, self.scaler.as_ref())?;

        let expected_rows = if self.classes.len() == 2 { 1 } else { self.classes.len() };
        if self.coefficients.len() != expected_rows {
            return Err(ModelError::Invalid(format!(
                "expected {} coefficient rows for {} classes, got {}",
                expected_rows,
                self.classes.len(),
                self.coefficients.len()
            )));
        }
        if self.intercepts.len() != expected_rows {
            return Err(ModelError::Invalid(format!(
                "expected {} intercepts, got {}",
                expected_rows,
                self.intercepts.len()
            )));
        }
        for (i, row) in self.coefficients.iter().enumerate() {
            if row.len() != self.n_features {
                return Err(ModelError::Invalid(format!(
                    "coefficient row {} has {} values, expected {}",
                    i,
                    row.len(),
                    self.n_features
                )));
            }
        }
        Ok(())
    }

    fn decision(&self, x: &[f64]) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(self.intercepts.iter())
            .map(|(w, b)| dot(w, x) + b)
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, samples: ArrayView2<'_, f64>) -> Result<Array1<i64>, ModelError> {
        check_columns(&samples, self.n_features)?;

        let labels = samples
            .rows()
            .into_iter()
            .map(|row| {
                let x = match &self.scaler {
                    Some(scaler) => scaler.transform(row),
                    None => row.to_vec(),
                };
                let scores = self.decision(&x);
                if scores.len() == 1 {
                    if scores[0] > 0.0 {
                        self.classes[1]
                    } else {
                        self.classes[0]
                    }
                } else {
                    self.classes[argmax(&scores)]
                }
            })
            .collect();

        Ok(labels)
    }
}

/// Single decision tree; node 0 is the root, `x[feature] <= threshold` goes left
#[derive(Debug, Clone)]
pub struct DecisionTree {
    n_features: usize,
    classes: Vec<i64>,
    nodes: Vec<TreeNode>,
    scaler: Option<StandardScaler>,
}

impl DecisionTree {
    fn validate(&self) -> Result<(), ModelError> {
        validate_common(self.n_features, &self.classes, self.scaler.as_ref())?;

        if self.nodes.is_empty() {
            return Err(ModelError::Invalid("decision tree has no nodes".into()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return Err(ModelError::Invalid(format!(
                            "node {} splits on feature {} (n_features = {})",
                            idx, feature, self.n_features
                        )));
                    }
                    // Children strictly after the parent keeps traversal finite
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(ModelError::Invalid(format!(
                                "node {} has invalid child index {}",
                                idx, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { leaf } => {
                    if *leaf >= self.classes.len() {
                        return Err(ModelError::Invalid(format!(
                            "leaf node {} points at class index {} ({} classes)",
                            idx,
                            leaf,
                            self.classes.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn walk(&self, x: &[f64]) -> i64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { leaf } => return self.classes[*leaf],
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, samples: ArrayView2<'_, f64>) -> Result<Array1<i64>, ModelError> {
        check_columns(&samples, self.n_features)?;

        let labels = samples
            .rows()
            .into_iter()
            .map(|row| match &self.scaler {
                Some(scaler) => self.walk(&scaler.transform(row)),
                None => self.walk(&row.to_vec()),
            })
            .collect();

        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn binary_logreg() -> Box<dyn Classifier> {
        ModelArtifact::from_json(
            r#"{
                "type": "logistic_regression",
                "n_features": 3,
                "classes": [0, 1],
                "coefficients": [[1.0, -2.0, 0.5]],
                "intercepts": [0.25]
            }"#,
        )
        .unwrap()
        .into_classifier()
        .unwrap()
    }

    #[test]
    fn test_logreg_binary_decision() {
        let model = binary_logreg();
        assert_eq!(model.kind(), "logistic_regression");
        assert_eq!(model.n_features(), 3);

        let samples = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let labels = model.predict(samples.view()).unwrap();
        // 1.25 > 0, -1.75 <= 0, 0.25 > 0
        assert_eq!(labels.to_vec(), vec![1, 0, 1]);
    }

    #[test]
    fn test_logreg_multiclass_argmax() {
        let model = ModelArtifact::from_json(
            r#"{
                "type": "logistic_regression",
                "n_features": 2,
                "classes": [10, 20, 30],
                "coefficients": [[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]],
                "intercepts": [0.0, 0.0, 0.0]
            }"#,
        )
        .unwrap()
        .into_classifier()
        .unwrap();

        let labels = model.predict(array![[3.0, 1.0], [1.0, 3.0], [-2.0, -2.0]].view()).unwrap();
        assert_eq!(labels.to_vec(), vec![10, 20, 30]);
    }

    #[test]
    fn test_scaler_applied_before_scoring() {
        let model = ModelArtifact::from_json(
            r#"{
                "type": "logistic_regression",
                "n_features": 1,
                "classes": [0, 1],
                "coefficients": [[1.0]],
                "intercepts": [0.0],
                "scaler": {"mean": [10.0], "scale": [2.0]}
            }"#,
        )
        .unwrap()
        .into_classifier()
        .unwrap();

        let labels = model.predict(array![[9.0], [11.0]].view()).unwrap();
        assert_eq!(labels.to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_decision_tree_walk() {
        let model = ModelArtifact::from_json(
            r#"{
                "type": "decision_tree",
                "n_features": 2,
                "classes": [0, 1],
                "nodes": [
                    {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                    {"leaf": 0},
                    {"feature": 1, "threshold": -1.0, "left": 3, "right": 4},
                    {"leaf": 0},
                    {"leaf": 1}
                ]
            }"#,
        )
        .unwrap()
        .into_classifier()
        .unwrap();

        assert_eq!(model.kind(), "decision_tree");
        let labels = model
            .predict(array![[0.5, 9.0], [1.0, -2.0], [1.0, 0.0]].view())
            .unwrap();
        assert_eq!(labels.to_vec(), vec![0, 0, 1]);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let model = binary_logreg();
        let samples = Array2::<f64>::zeros((1, 4));
        match model.predict(samples.view()) {
            Err(ModelError::InvalidInput { expected, received }) => {
                assert_eq!(expected, 3);
                assert_eq!(received, 4);
            }
            other => panic!("expected InvalidInput, got {:?}", other.map(|a| a.to_vec())),
        }
    }

    #[test]
    fn test_rejects_mismatched_coefficients() {
        let err = ModelArtifact::from_json(
            r#"{
                "type": "logistic_regression",
                "n_features": 3,
                "classes": [0, 1],
                "coefficients": [[1.0, 2.0]],
                "intercepts": [0.0]
            }"#,
        )
        .unwrap()
        .into_classifier()
        .err()
        .unwrap();
        assert!(matches!(err, ModelError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let err = ModelArtifact::from_json(
            r#"{
                "type": "logistic_regression",
                "n_features": 1,
                "classes": [0, 1],
                "coefficients": [[1.0]],
                "intercepts": [0.0],
                "scaler": {"mean": [0.0], "scale": [0.0]}
            }"#,
        )
        .unwrap()
        .into_classifier()
        .err()
        .unwrap();
        assert!(matches!(err, ModelError::Invalid(_)));
    }

    #[test]
    fn test_rejects_cyclic_tree() {
        let err = ModelArtifact::from_json(
            r#"{
                "type": "decision_tree",
                "n_features": 1,
                "classes": [0, 1],
                "nodes": [
                    {"feature": 0, "threshold": 0.0, "left": 0, "right": 1},
                    {"leaf": 1}
                ]
            }"#,
        )
        .unwrap()
        .into_classifier()
        .err()
        .unwrap();
        assert!(matches!(err, ModelError::Invalid(_)));
    }

    #[test]
    fn test_rejects_leaf_out_of_range() {
        let err = ModelArtifact::from_json(
            r#"{
                "type": "decision_tree",
                "n_features": 1,
                "classes": [0, 1],
                "nodes": [{"leaf": 2}]
            }"#,
        )
        .unwrap()
        .into_classifier()
        .err()
        .unwrap();
        assert!(matches!(err, ModelError::Invalid(_)));
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let err = ModelArtifact::from_json(r#"{"type": "svm", "n_features": 2}"#).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }
}
