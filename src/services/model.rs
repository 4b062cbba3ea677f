//! Persisted regression models for the Climbing Conditions Score.
//!
//! Models are trained offline and exported as JSON: a flattened binary
//! tree in the layout scikit-learn uses internally (`children_left`,
//! `children_right`, `feature`, `threshold`, `value`), or a forest of such
//! trees. The artifact is loaded once at startup and shared read-only
//! across requests.
//!
//! Feature vector layout is `[temperature_f, humidity_pct]`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Number of input features every model in this service is trained on.
pub const FEATURE_COUNT: usize = 2;

/// Marker for "no child" in the flattened tree arrays.
const LEAF: i64 = -1;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("model returned no prediction")]
    EmptyPrediction,
}

/// Anything that predicts a score from `[temperature, humidity]` rows.
///
/// Implementations must be immutable after construction; `predict` is
/// called concurrently from in-flight requests.
pub trait PredictiveModel: Send + Sync + std::fmt::Debug {
    fn predict(&self, features: &[[f64; FEATURE_COUNT]]) -> Result<Vec<f64>, ModelError>;
}

/// A single regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeModel {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl DecisionTreeModel {
    pub fn new(
        children_left: Vec<i64>,
        children_right: Vec<i64>,
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let tree = Self {
            children_left,
            children_right,
            feature,
            threshold,
            value,
        };
        tree.validate()?;
        Ok(tree)
    }

    fn rebuilt(self) -> Result<Self, ModelError> {
        Self::new(
            self.children_left,
            self.children_right,
            self.feature,
            self.threshold,
            self.value,
        )
    }

    /// Check array lengths and index bounds so `predict_row` can't index
    /// out of range or loop forever.
    fn validate(&self) -> Result<(), ModelError> {
        let n = self.value.len();
        if n == 0 {
            return Err(ModelError::Invalid("tree has no nodes".to_string()));
        }
        if self.children_left.len() != n
            || self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
        {
            return Err(ModelError::Invalid(format!(
                "tree arrays have mismatched lengths (value has {} nodes)",
                n
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if (left == LEAF) != (right == LEAF) {
                return Err(ModelError::Invalid(format!(
                    "node {} has exactly one child",
                    node
                )));
            }
            if left == LEAF {
                continue;
            }
            // Children must point forward; this rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ModelError::Invalid(format!(
                        "node {} has out-of-range child {}",
                        node, child
                    )));
                }
            }
            let f = self.feature[node];
            if f < 0 || f >= FEATURE_COUNT as i64 {
                return Err(ModelError::Invalid(format!(
                    "node {} splits on unknown feature {}",
                    node, f
                )));
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let f = self.feature[node] as usize;
            node = if row[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

impl PredictiveModel for DecisionTreeModel {
    fn predict(&self, features: &[[f64; FEATURE_COUNT]]) -> Result<Vec<f64>, ModelError> {
        Ok(features.iter().map(|row| self.predict_row(row)).collect())
    }
}

/// Mean of several regression trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestModel {
    trees: Vec<DecisionTreeModel>,
}

impl RandomForestModel {
    pub fn new(trees: Vec<DecisionTreeModel>) -> Result<Self, ModelError> {
        let forest = Self { trees };
        forest.validate()?;
        Ok(forest)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ModelError::Invalid(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}

impl PredictiveModel for RandomForestModel {
    fn predict(&self, features: &[[f64; FEATURE_COUNT]]) -> Result<Vec<f64>, ModelError> {
        let n_trees = self.trees.len() as f64;
        Ok(features
            .iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }
}

/// On-disk artifact, tagged by model kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree(DecisionTreeModel),
    RandomForest(RandomForestModel),
}

impl ModelArtifact {
    /// Parse and validate an artifact from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        // Rebuild through the constructors so every artifact is validated.
        Ok(match serde_json::from_str(json)? {
            ModelArtifact::DecisionTree(tree) => ModelArtifact::DecisionTree(tree.rebuilt()?),
            ModelArtifact::RandomForest(RandomForestModel { trees }) => {
                ModelArtifact::RandomForest(RandomForestModel::new(trees)?)
            }
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }

    pub fn into_model(self) -> Arc<dyn PredictiveModel> {
        match self {
            ModelArtifact::DecisionTree(tree) => Arc::new(tree),
            ModelArtifact::RandomForest(forest) => Arc::new(forest),
        }
    }
}

/// Load a model artifact from disk.
pub fn load_model(path: &Path) -> Result<Arc<dyn PredictiveModel>, ModelError> {
    let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let artifact = ModelArtifact::from_json(&json)?;
    tracing::info!("Loaded {} model from {}", artifact.kind(), path.display());
    Ok(artifact.into_model())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root splits on temperature <= 60; left leaf 4.0, right splits on
    /// humidity <= 40 into 8.0 / 5.0.
    fn sample_tree() -> DecisionTreeModel {
        DecisionTreeModel::new(
            vec![1, -1, 3, -1, -1],
            vec![2, -1, 4, -1, -1],
            vec![0, -2, 1, -2, -2],
            vec![60.0, -2.0, 40.0, -2.0, -2.0],
            vec![6.0, 4.0, 6.5, 8.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn test_tree_predicts_by_threshold() {
        let tree = sample_tree();
        let out = tree
            .predict(&[[55.0, 30.0], [60.0, 90.0], [65.0, 40.0], [65.0, 41.0]])
            .unwrap();
        assert_eq!(out, vec![4.0, 4.0, 8.0, 5.0]);
    }

    #[test]
    fn test_forest_averages_trees() {
        let constant = DecisionTreeModel::new(vec![-1], vec![-1], vec![-2], vec![-2.0], vec![2.0])
            .unwrap();
        let forest = RandomForestModel::new(vec![sample_tree(), constant]).unwrap();
        let out = forest.predict(&[[65.0, 30.0]]).unwrap();
        assert_eq!(out, vec![5.0]);
    }

    #[test]
    fn test_artifact_from_json_decision_tree() {
        let json = r#"{
            "kind": "decision_tree",
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [1, -2, -2],
            "threshold": [50.0, -2.0, -2.0],
            "value": [5.0, 7.5, 3.0]
        }"#;
        let artifact = ModelArtifact::from_json(json).unwrap();
        assert_eq!(artifact.kind(), "decision_tree");
        let model = artifact.into_model();
        assert_eq!(model.predict(&[[70.0, 45.0]]).unwrap(), vec![7.5]);
        assert_eq!(model.predict(&[[70.0, 55.0]]).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_artifact_rejects_mismatched_lengths() {
        let json = r#"{
            "kind": "decision_tree",
            "children_left": [1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [50.0, -2.0, -2.0],
            "value": [5.0, 7.5, 3.0]
        }"#;
        assert!(matches!(
            ModelArtifact::from_json(json),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn test_artifact_rejects_backward_child() {
        let result = DecisionTreeModel::new(
            vec![1, 0, -1],
            vec![2, 2, -1],
            vec![0, 0, -2],
            vec![1.0, 1.0, -2.0],
            vec![0.0, 0.0, 1.0],
        );
        assert!(matches!(result, Err(ModelError::Invalid(_))));
    }

    #[test]
    fn test_artifact_rejects_unknown_feature() {
        let result = DecisionTreeModel::new(
            vec![1, -1, -1],
            vec![2, -1, -1],
            vec![2, -2, -2],
            vec![1.0, -2.0, -2.0],
            vec![0.0, 1.0, 2.0],
        );
        assert!(matches!(result, Err(ModelError::Invalid(_))));
    }

    #[test]
    fn test_artifact_rejects_empty_forest() {
        let json = r#"{ "kind": "random_forest", "trees": [] }"#;
        assert!(matches!(
            ModelArtifact::from_json(json),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn test_artifact_rejects_forest_with_invalid_tree() {
        let json = r#"{
            "kind": "random_forest",
            "trees": [
                { "children_left": [-1], "children_right": [-1], "feature": [-2],
                  "threshold": [-2.0], "value": [2.0] },
                { "children_left": [1, -1], "children_right": [5, -1], "feature": [0, -2],
                  "threshold": [1.0, -2.0], "value": [0.0, 1.0] }
            ]
        }"#;
        let err = ModelArtifact::from_json(json).unwrap_err();
        assert!(matches!(err, ModelError::Invalid(ref msg) if msg.starts_with("tree 1:")));
    }

    #[test]
    fn test_artifact_rejects_unknown_kind() {
        let json = r#"{ "kind": "svm", "weights": [] }"#;
        assert!(matches!(
            ModelArtifact::from_json(json),
            Err(ModelError::Parse(_))
        ));
    }

    #[test]
    fn test_load_model_missing_file() {
        let err = load_model(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn test_bundled_artifact_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("model")
            .join("climbing_conditions_model.json");
        let model = load_model(&path).unwrap();
        let out = model.predict(&[[55.0, 30.0]]).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0] > 0.0 && out[0] <= 10.0);
    }
}
