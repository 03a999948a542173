//! Binary classification metrics
//!
//! All scores are derived from the four cells of a [`BinaryConfusionMatrix`], with label `1` as
//! the positive class. A ratio whose denominator is zero evaluates to zero instead of `NaN`.

use ndarray::{ArrayBase, Data, Ix1};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Counts of the four outcomes of a binary classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

fn ratio(num: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        num / denom
    }
}

impl BinaryConfusionMatrix {
    /// Compare `prediction` against `ground_truth`
    ///
    /// Both sequences have to be of equal length and contain only `0` and `1`.
    pub fn from_predictions<D: Data<Elem = usize>, E: Data<Elem = usize>>(
        prediction: &ArrayBase<D, Ix1>,
        ground_truth: &ArrayBase<E, Ix1>,
    ) -> Result<Self> {
        if prediction.len() != ground_truth.len() {
            return Err(Error::Parameters(format!(
                "{} predictions for {} samples",
                prediction.len(),
                ground_truth.len()
            )));
        }

        let mut cm = BinaryConfusionMatrix::default();
        for (pred, truth) in prediction.iter().zip(ground_truth.iter()) {
            match (*pred, *truth) {
                (1, 1) => cm.true_positives += 1,
                (0, 0) => cm.true_negatives += 1,
                (1, 0) => cm.false_positives += 1,
                (0, 1) => cm.false_negatives += 1,
                (label, 0) | (label, 1) | (_, label) => return Err(Error::NonBinaryLabel(label)),
            }
        }

        Ok(cm)
    }

    /// Number of evaluated samples
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Same outcomes with the negative class treated as positive
    pub fn swapped(&self) -> Self {
        BinaryConfusionMatrix {
            true_positives: self.true_negatives,
            true_negatives: self.true_positives,
            false_positives: self.false_negatives,
            false_negatives: self.false_positives,
        }
    }

    /// Cells in the `[[TN, FP], [FN, TP]]` layout, rows are true labels
    pub fn to_array(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }

    pub fn accuracy(&self) -> f64 {
        ratio(
            (self.true_positives + self.true_negatives) as f64,
            self.total() as f64,
        )
    }

    pub fn error_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            1.0 - self.accuracy()
        }
    }

    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives as f64,
            (self.true_positives + self.false_positives) as f64,
        )
    }

    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives as f64,
            (self.true_positives + self.false_negatives) as f64,
        )
    }

    /// Harmonic mean of precision and recall
    pub fn f1_score(&self) -> f64 {
        let tp = self.true_positives as f64;
        ratio(
            2.0 * tp,
            2.0 * tp + (self.false_positives + self.false_negatives) as f64,
        )
    }

    /// Matthews correlation coefficient
    ///
    /// Lies in `[-1, 1]`, where `0` means no better than chance.
    pub fn mcc(&self) -> f64 {
        let tp = self.true_positives as f64;
        let tn = self.true_negatives as f64;
        let fp = self.false_positives as f64;
        let fn_ = self.false_negatives as f64;

        let denom = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        ratio(tp * tn - fp * fn_, denom)
    }

    pub fn metrics(&self) -> ClassificationMetrics {
        ClassificationMetrics {
            accuracy: self.accuracy(),
            error_rate: self.error_rate(),
            precision: self.precision(),
            recall: self.recall(),
            f1_score: self.f1_score(),
            mcc: self.mcc(),
        }
    }
}

/// Scores of a binary classifier on a labeled set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub error_rate: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub mcc: f64,
}
