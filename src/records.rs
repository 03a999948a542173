//! Sparse document-term records
//!
//! Vectorized documents are stored in compressed sparse row format. The classifiers either work
//! on the rows directly (linear SVM) or densify a subset of columns (random forest).

use linfa::dataset::Records;
use ndarray::{Array1, Array2};
use sprs::{CsMat, CsVecView};

use crate::error::{Error, Result};

/// Document-term matrix with one row per document
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRecords(CsMat<f64>);

impl SparseRecords {
    /// Wrap a matrix, converting it to row-major storage if necessary
    pub fn new(matrix: CsMat<f64>) -> Self {
        if matrix.is_csr() {
            SparseRecords(matrix)
        } else {
            SparseRecords(matrix.to_csr())
        }
    }

    pub fn matrix(&self) -> &CsMat<f64> {
        &self.0
    }

    pub fn row(&self, i: usize) -> CsVecView<'_, f64> {
        self.0
            .outer_view(i)
            .unwrap_or_else(|| panic!("row {} out of bounds for {} rows", i, self.0.rows()))
    }

    /// Dot product of row `i` with a dense weight vector
    pub fn dot_row(&self, i: usize, weights: &[f64]) -> f64 {
        self.row(i)
            .iter()
            .map(|(col, val)| val * weights[col])
            .sum()
    }

    /// Squared euclidean norm of row `i`
    pub fn row_norm_sq(&self, i: usize) -> f64 {
        self.row(i).iter().map(|(_, val)| val * val).sum()
    }

    /// Select `rows` and `columns` into a dense matrix
    ///
    /// Row `k` of the result is row `rows[k]`, column `j` of the result is column `columns[j]`.
    /// Rows may repeat (bootstrap samples), columns must be unique.
    pub fn densify(&self, rows: &[usize], columns: &[usize]) -> Array2<f64> {
        let mut position = vec![None; self.0.cols()];
        for (j, col) in columns.iter().enumerate() {
            position[*col] = Some(j);
        }

        let mut dense = Array2::zeros((rows.len(), columns.len()));
        for (k, row) in rows.iter().enumerate() {
            for (col, val) in self.row(*row).iter() {
                if let Some(j) = position[col] {
                    dense[(k, j)] = *val;
                }
            }
        }

        dense
    }
}

impl Records for SparseRecords {
    type Elem = f64;

    fn nsamples(&self) -> usize {
        self.0.rows()
    }

    fn nfeatures(&self) -> usize {
        self.0.cols()
    }
}

/// Weight of each class, inversely proportional to its frequency
///
/// Entry `k` is the weight of label `k`. Fails unless every label is `0` or `1` and both occur.
pub fn balanced_class_weights(labels: &Array1<usize>) -> Result<[f64; 2]> {
    let mut counts = [0usize; 2];
    for label in labels.iter() {
        match counts.get_mut(*label) {
            Some(count) => *count += 1,
            None => return Err(Error::NonBinaryLabel(*label)),
        }
    }
    if counts.contains(&0) {
        return Err(Error::SingleClass);
    }

    let n = labels.len() as f64;
    Ok([n / (2.0 * counts[0] as f64), n / (2.0 * counts[1] as f64)])
}
