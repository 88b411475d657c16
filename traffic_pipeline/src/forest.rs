//! Random forest regressor on top of smartcore.
//!
//! `ForestParams` is the configurable surface (JSON config, CLI flags) and maps
//! onto smartcore's `RandomForestRegressorParameters`. The fitted smartcore
//! model is kept as-is so it can travel inside the artifact envelope.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor as SmartForest, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

use crate::error::{PipelineError, Result};

type Forest = SmartForest<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows trees until leaves are pure or too small to split.
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried at each split. `None` tries all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(PipelineError::InvalidParam("n_trees must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(PipelineError::InvalidParam(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(PipelineError::InvalidParam(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(PipelineError::InvalidParam(
                "max_features must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn to_smartcore(&self, n_features: usize) -> Result<RandomForestRegressorParameters> {
        let n_trees = self.n_trees.try_into().map_err(|_| {
            PipelineError::InvalidParam(format!("n_trees {} is too large", self.n_trees))
        })?;
        Ok(RandomForestRegressorParameters {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            min_samples_split: self.min_samples_split,
            n_trees,
            m: Some(self.max_features.unwrap_or(n_features).min(n_features)),
            keep_samples: false,
            seed: self.seed,
        })
    }
}

/// Row-major copy of `x` in smartcore's matrix type.
pub fn dense(x: &Array2<f64>) -> DenseMatrix<f64> {
    let rows: Vec<Vec<f64>> = x.outer_iter().map(|r| r.to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    n_features: usize,
    forest: Forest,
}

impl RandomForestRegressor {
    /// Fit on `x` (`n_rows` by `n_features`, already scaled) and targets `y`.
    pub fn fit(
        x: &DenseMatrix<f64>,
        y: &[f64],
        n_features: usize,
        params: &ForestParams,
    ) -> Result<Self> {
        params.validate()?;
        if y.is_empty() || n_features == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let forest = Forest::fit(x, &y.to_vec(), params.to_smartcore(n_features)?)
            .map_err(|e| PipelineError::Model(e.to_string()))?;
        debug!(trees = params.n_trees, rows = y.len(), "forest fitted");

        Ok(Self {
            params: params.clone(),
            n_features,
            forest,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.params.n_trees
    }

    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>> {
        self.forest
            .predict(x)
            .map_err(|e| PipelineError::Model(e.to_string()))
    }

    /// Mean of the trees' predictions for one scaled feature vector.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        let out = self.predict(&DenseMatrix::from_2d_vec(&vec![row.to_vec()]))?;
        out.first()
            .copied()
            .ok_or_else(|| PipelineError::Model("empty prediction".into()))
    }

    /// Structural check of every tree: split features inside the feature
    /// range, both children present and pointing forward inside the node list.
    /// A model that passes cannot index out of bounds or loop while predicting.
    pub fn validate(&self) -> Result<()> {
        let tree = serde_json::to_value(&self.forest)?;
        let mut node_lists = Vec::new();
        collect_node_lists(&tree, &mut node_lists);

        if node_lists.len() != self.params.n_trees {
            return Err(PipelineError::Model(format!(
                "holds {} trees, parameters say {}",
                node_lists.len(),
                self.params.n_trees
            )));
        }
        for (t, nodes) in node_lists.iter().enumerate() {
            check_tree(nodes, self.n_features)
                .map_err(|reason| PipelineError::Model(format!("tree {t}: {reason}")))?;
        }
        Ok(())
    }
}

fn collect_node_lists<'a>(v: &'a Value, out: &mut Vec<&'a Vec<Value>>) {
    match v {
        Value::Object(map) => {
            if let Some(Value::Array(nodes)) = map.get("nodes") {
                out.push(nodes);
                return;
            }
            map.values().for_each(|child| collect_node_lists(child, out));
        }
        Value::Array(items) => items.iter().for_each(|child| collect_node_lists(child, out)),
        _ => {}
    }
}

fn child(node: &Value, key: &str) -> std::result::Result<Option<usize>, String> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|i| Some(i as usize))
            .ok_or_else(|| format!("{key} is not an index")),
    }
}

fn check_tree(nodes: &[Value], n_features: usize) -> std::result::Result<(), String> {
    if nodes.is_empty() {
        return Err("no nodes".into());
    }
    for (i, node) in nodes.iter().enumerate() {
        match (child(node, "true_child")?, child(node, "false_child")?) {
            (None, None) => {}
            (Some(t), Some(f)) => {
                for c in [t, f] {
                    if c <= i || c >= nodes.len() {
                        return Err(format!("node {i} points to child {c} of {}", nodes.len()));
                    }
                }
                let feature = node
                    .get("split_feature")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| format!("node {i} has no split feature"))?;
                if feature as usize >= n_features {
                    return Err(format!(
                        "node {i} splits on feature {feature}, model has {n_features}"
                    ));
                }
            }
            _ => return Err(format!("node {i} has a single child")),
        }
    }
    Ok(())
}
