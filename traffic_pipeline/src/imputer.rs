//! Stage 2 of missing-value handling: per-column mean imputation on the
//! feature matrix. Missing cells are `NaN`.

use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::record::FEATURE_ORDER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    pub means: Vec<f64>,
}

impl MeanImputer {
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let mut means = Vec::with_capacity(x.ncols());
        for (j, col) in x.axis_iter(Axis(1)).enumerate() {
            let (sum, n) = col
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if n == 0 {
                let name = FEATURE_ORDER.get(j).copied().unwrap_or("feature");
                return Err(PipelineError::EmptyFeature(name));
            }
            means.push(sum / n as f64);
        }
        Ok(Self { means })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn transform_inplace(&self, x: &mut Array2<f64>) -> Result<()> {
        if x.ncols() != self.means.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.means.len(),
                got: x.ncols(),
            });
        }
        for row in x.axis_iter_mut(Axis(0)) {
            self.fill_row(row);
        }
        Ok(())
    }

    pub fn transform_row(&self, row: &mut [f64]) -> Result<()> {
        if row.len() != self.means.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.means.len(),
                got: row.len(),
            });
        }
        self.fill_row(ArrayViewMut1::from(row));
        Ok(())
    }

    fn fill_row(&self, mut row: ArrayViewMut1<f64>) {
        for (v, mean) in row.iter_mut().zip(&self.means) {
            if v.is_nan() {
                *v = *mean;
            }
        }
    }

    /// Number of missing cells per column, used for logging.
    pub fn count_missing(col: ArrayView1<f64>) -> usize {
        col.iter().filter(|v| v.is_nan()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fills_nan_with_column_mean() {
        let mut x = array![[f64::NAN, 1.0], [2.0, 3.0], [4.0, f64::NAN]];
        let imp = MeanImputer::fit(&x).unwrap();
        assert_eq!(imp.means, vec![3.0, 2.0]);
        imp.transform_inplace(&mut x).unwrap();
        assert_eq!(x, array![[3.0, 1.0], [2.0, 3.0], [4.0, 2.0]]);
    }

    #[test]
    fn all_missing_column_is_an_error() {
        let x = array![[1.0, f64::NAN], [2.0, f64::NAN]];
        assert!(matches!(
            MeanImputer::fit(&x),
            Err(PipelineError::EmptyFeature("temp"))
        ));
    }

    #[test]
    fn row_width_is_checked() {
        let imp = MeanImputer { means: vec![0.0; 5] };
        let mut row = [1.0, 2.0];
        assert!(matches!(
            imp.transform_row(&mut row),
            Err(PipelineError::ShapeMismatch { expected: 5, got: 2 })
        ));
    }
}
