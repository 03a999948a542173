//! Linear support vector classification on sparse document vectors
//!
//! The classifier separates the two sentiment classes by a hyperplane `w^T x + b`. It is trained
//! with dual coordinate descent, which only touches the non-zero entries of every document and
//! therefore scales to vocabularies with tens of thousands of terms.
use std::fmt;

use linfa::dataset::Records;
use linfa::traits::{Predict, PredictInplace};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::records::SparseRecords;

mod algorithm;
mod hyperparams;

pub use hyperparams::{LinearSvcParams, LinearSvcValidParams};

/// Reason for stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    ReachedThreshold,
    ReachedIterations,
}

/// Fitted linear SVM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvc {
    weights: Array1<f64>,
    bias: f64,
    exit_reason: ExitReason,
    iterations: usize,
    obj: f64,
}

impl LinearSvc {
    /// Coefficient of every feature
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn exit_reason(&self) -> ExitReason {
        self.exit_reason
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Margin of sample `i`, positive on the side of the positive class
    pub fn decision_function(&self, x: &SparseRecords, i: usize) -> f64 {
        x.dot_row(i, self.weights.as_slice().unwrap_or(&[])) + self.bias
    }
}

impl PredictInplace<SparseRecords, Array1<usize>> for LinearSvc {
    fn predict_inplace(&self, x: &SparseRecords, y: &mut Array1<usize>) {
        assert_eq!(
            x.nsamples(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.nfeatures(),
            self.weights.len(),
            "The number of features must match the fitted model."
        );

        for (i, target) in y.iter_mut().enumerate() {
            *target = usize::from(self.decision_function(x, i) > 0.0);
        }
    }

    fn default_target(&self, x: &SparseRecords) -> Array1<usize> {
        Array1::zeros(x.nsamples())
    }
}

/// Predict the sentiment of every document
impl<'a> Predict<&'a SparseRecords, Array1<usize>> for LinearSvc {
    fn predict(&self, x: &'a SparseRecords) -> Array1<usize> {
        let mut y = self.default_target(x);
        self.predict_inplace(x, &mut y);
        y
    }
}

impl fmt::Display for LinearSvc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.exit_reason {
            ExitReason::ReachedThreshold => write!(
                f,
                "Exited after {} iterations with obj = {} and {} features",
                self.iterations,
                self.obj,
                self.weights.len()
            ),
            ExitReason::ReachedIterations => write!(
                f,
                "Reached maximal iterations {} with obj = {} and {} features",
                self.iterations,
                self.obj,
                self.weights.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::vectorizer::{TextVectorizer, VectorizerKind};
    use linfa::prelude::*;
    use ndarray::array;
    use sprs::TriMat;

    fn toy_records() -> (SparseRecords, Array1<usize>) {
        // positives have a large first feature, negatives a large second one
        let mut tri = TriMat::new((6, 2));
        for (i, (a, b)) in [(2.0, 0.1), (1.5, 0.0), (3.0, 0.5), (0.1, 2.0), (0.0, 1.0), (0.4, 2.5)]
            .iter()
            .enumerate()
        {
            tri.add_triplet(i, 0, *a);
            tri.add_triplet(i, 1, *b);
        }

        (
            SparseRecords::new(tri.to_csr()),
            array![1usize, 1, 1, 0, 0, 0],
        )
    }

    #[test]
    fn separates_linear_problem() {
        let (records, targets) = toy_records();
        let dataset = DatasetBase::new(records.clone(), targets.clone());
        let model = LinearSvc::params().c(10.0).fit(&dataset).unwrap();

        assert_eq!(model.predict(&records), targets);
        assert_eq!(model.exit_reason(), ExitReason::ReachedThreshold);
        assert!(model.weights()[0] > 0.0);
        assert!(model.weights()[1] < 0.0);
    }

    #[test]
    fn stops_at_iteration_bound() {
        let (records, targets) = toy_records();
        let dataset = DatasetBase::new(records, targets);
        let model = LinearSvc::params()
            .max_iter(1)
            .eps(1e-12)
            .fit(&dataset)
            .unwrap();

        assert_eq!(model.iterations(), 1);
        assert_eq!(model.exit_reason(), ExitReason::ReachedIterations);
    }

    #[test]
    fn fit_is_deterministic_for_a_seed() {
        let (records, targets) = toy_records();
        let dataset = DatasetBase::new(records, targets);
        let a = LinearSvc::params().seed(7).fit(&dataset).unwrap();
        let b = LinearSvc::params().seed(7).fit(&dataset).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn single_class_is_rejected() {
        let (records, _) = toy_records();
        let dataset = DatasetBase::new(records, Array1::<usize>::ones(6));
        let res = LinearSvc::params().fit(&dataset);

        assert!(matches!(res, Err(Error::SingleClass)));
    }

    #[test]
    fn non_binary_labels_are_rejected() {
        let (records, _) = toy_records();
        let dataset = DatasetBase::new(records, array![0usize, 1, 2, 0, 1, 0]);
        let res = LinearSvc::params().fit(&dataset);

        assert!(matches!(res, Err(Error::NonBinaryLabel(2))));
    }

    #[test]
    fn classifies_sentences() {
        let train = [
            "a delightful and moving film",
            "moving performances and a witty script",
            "witty and delightful",
            "a dull and tedious film",
            "tedious script and dull performances",
            "dull and lifeless",
        ];
        let labels = array![1usize, 1, 1, 0, 0, 0];
        let vectorizer = TextVectorizer::params(VectorizerKind::Tfidf)
            .fit(&train)
            .unwrap();
        let dataset = DatasetBase::new(vectorizer.transform(&train).unwrap(), labels);
        let model = LinearSvc::params().fit(&dataset).unwrap();

        let test = vectorizer
            .transform(&["a witty film", "a tedious film"])
            .unwrap();
        assert_eq!(model.predict(&test), array![1usize, 0]);
    }
}
