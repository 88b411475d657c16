use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Standardizes each feature with training-time mean and population
/// standard deviation. Constant features keep a scale of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        let n = x.nrows() as f64;
        let mut mean = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());
        for col in x.axis_iter(Axis(1)) {
            let m = col.sum() / n;
            let var = col.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n;
            let sd = var.sqrt();
            mean.push(m);
            scale.push(if sd > f64::EPSILON { sd } else { 1.0 });
        }
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_inplace(&self, x: &mut Array2<f64>) -> Result<()> {
        if x.ncols() != self.mean.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.mean.len(),
                got: x.ncols(),
            });
        }
        for mut row in x.axis_iter_mut(Axis(0)) {
            for ((v, m), s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
                *v = (*v - m) / s;
            }
        }
        Ok(())
    }

    pub fn transform_row(&self, row: &mut [f64]) -> Result<()> {
        if row.len() != self.mean.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.mean.len(),
                got: row.len(),
            });
        }
        for ((v, m), s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
            *v = (*v - m) / s;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizes_columns() {
        let mut x = array![[1.0, 5.0], [3.0, 5.0]];
        let sc = StandardScaler::fit(&x).unwrap();
        assert_eq!(sc.mean, vec![2.0, 5.0]);
        // constant column keeps unit scale
        assert_eq!(sc.scale, vec![1.0, 1.0]);
        sc.transform_inplace(&mut x).unwrap();
        assert_eq!(x, array![[-1.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn row_and_matrix_agree() {
        let x = array![[2.0, 10.0], [4.0, 30.0], [9.0, 20.0]];
        let sc = StandardScaler::fit(&x).unwrap();
        let mut m = x.clone();
        sc.transform_inplace(&mut m).unwrap();
        let mut row = [4.0, 30.0];
        sc.transform_row(&mut row).unwrap();
        assert_eq!(row.to_vec(), m.row(1).to_vec());
    }
}
