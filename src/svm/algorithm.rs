use linfa::dataset::{DatasetBase, Records};
use linfa::traits::Fit;
use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use super::{ExitReason, LinearSvc, LinearSvcValidParams};
use crate::error::{Error, Result};
use crate::records::{balanced_class_weights, SparseRecords};

/// Dual coordinate descent for the L2-regularized squared hinge loss
///
/// The dual problem has the form
/// ```ignore
/// min_a 1/2 a^T (Q + D) a - e^T a s.t. 0 <= a_i
/// ```
/// with `Q_ij = y_i y_j (<x_i, x_j> + 1)` and `D_ii = 1 / (2 C_i)`. The bias is learned as the
/// weight of a constant feature. Every pass visits the coordinates in a fresh random order.
struct DualSolver<'a> {
    records: &'a SparseRecords,
    targets: &'a [f64],
    diag: Vec<f64>,
    qd: Vec<f64>,
    alpha: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
}

impl<'a> DualSolver<'a> {
    fn new(records: &'a SparseRecords, targets: &'a [f64], bounds: Vec<f64>) -> Self {
        let diag = bounds.iter().map(|c| 0.5 / c).collect::<Vec<_>>();
        let qd = (0..targets.len())
            .map(|i| records.row_norm_sq(i) + 1.0 + diag[i])
            .collect();

        DualSolver {
            records,
            targets,
            diag,
            qd,
            alpha: vec![0.0; targets.len()],
            weights: vec![0.0; records.nfeatures()],
            bias: 0.0,
        }
    }

    /// One pass over all coordinates, returns the spread of the projected gradient
    fn sweep(&mut self, order: &[usize]) -> f64 {
        let mut pg_max = f64::NEG_INFINITY;
        let mut pg_min = f64::INFINITY;

        for &i in order {
            let y = self.targets[i];
            let margin = self.records.dot_row(i, &self.weights) + self.bias;
            let grad = y * margin - 1.0 + self.diag[i] * self.alpha[i];

            let projected = if self.alpha[i] == 0.0 {
                grad.min(0.0)
            } else {
                grad
            };
            pg_max = pg_max.max(projected);
            pg_min = pg_min.min(projected);

            if projected.abs() > 1e-12 {
                let old = self.alpha[i];
                self.alpha[i] = (old - grad / self.qd[i]).max(0.0);
                let step = (self.alpha[i] - old) * y;
                for (col, val) in self.records.row(i).iter() {
                    self.weights[col] += step * val;
                }
                self.bias += step;
            }
        }

        pg_max - pg_min
    }

    /// Value of the dual objective
    fn objective(&self) -> f64 {
        let w_sq = self.weights.iter().map(|w| w * w).sum::<f64>() + self.bias * self.bias;
        let reg = self
            .alpha
            .iter()
            .zip(&self.diag)
            .map(|(a, d)| a * a * d)
            .sum::<f64>();
        let sum_alpha = self.alpha.iter().sum::<f64>();

        0.5 * (w_sq + reg) - sum_alpha
    }
}

impl Fit<SparseRecords, Array1<usize>, Error> for LinearSvcValidParams {
    type Object = LinearSvc;

    /// Fit a linear SVM on sparse records with binary `0`/`1` labels
    fn fit(&self, dataset: &DatasetBase<SparseRecords, Array1<usize>>) -> Result<Self::Object> {
        let records = dataset.records();
        let labels = dataset.targets();
        let class_weights = balanced_class_weights(labels)?;
        let targets = labels
            .iter()
            .map(|label| if *label == 1 { 1.0 } else { -1.0 })
            .collect::<Vec<_>>();
        let bounds = labels
            .iter()
            .map(|label| self.c() * class_weights[*label])
            .collect();

        let mut solver = DualSolver::new(records, &targets, bounds);
        let mut rng = SmallRng::seed_from_u64(self.seed());
        let mut order = (0..targets.len()).collect::<Vec<_>>();

        let mut exit_reason = ExitReason::ReachedIterations;
        let mut iterations = 0;
        while iterations < self.max_iter() {
            order.shuffle(&mut rng);
            let spread = solver.sweep(&order);
            iterations += 1;

            if spread <= self.eps() {
                exit_reason = ExitReason::ReachedThreshold;
                break;
            }
        }

        let obj = solver.objective();
        match exit_reason {
            ExitReason::ReachedThreshold => {
                debug!(iterations, obj, "linear svm converged")
            }
            ExitReason::ReachedIterations => warn!(
                max_iter = self.max_iter(),
                obj, "linear svm did not converge, consider increasing max_iter"
            ),
        }

        Ok(LinearSvc {
            weights: Array1::from(solver.weights),
            bias: solver.bias,
            exit_reason,
            iterations,
            obj,
        })
    }
}
