use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::mean_squared_error;
use smartcore::model_selection::train_test_split;

use crate::error::{PipelineError, Result};

/// Shuffled train/test partition of a feature matrix and its targets.
#[derive(Debug)]
pub struct Holdout {
    pub x_train: DenseMatrix<f64>,
    pub x_test: DenseMatrix<f64>,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
}

/// Rows smartcore puts in the test part: `floor(n * test_size)` in `f32`.
pub fn test_rows(n: usize, test_size: f64) -> usize {
    (n as f32 * test_size as f32) as usize
}

/// Seeded holdout split. Sizes are checked up front since smartcore panics
/// on an empty test part.
pub fn holdout(x: &DenseMatrix<f64>, y: &[f64], test_size: f64, seed: u64) -> Result<Holdout> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InvalidParam(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    let n = y.len();
    let n_test = test_rows(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::InvalidParam(format!(
            "cannot split {n} rows with test_size {test_size}"
        )));
    }

    let (x_train, x_test, y_train, y_test) =
        train_test_split(x, &y.to_vec(), test_size as f32, true, Some(seed));
    Ok(Holdout {
        x_train,
        x_test,
        y_train,
        y_test,
    })
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.len() != predicted.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }
    let mse: f64 = mean_squared_error(&actual.to_vec(), &predicted.to_vec());
    Ok(mse.sqrt())
}
