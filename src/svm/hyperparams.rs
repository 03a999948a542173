use linfa::ParamGuard;
use serde::{Deserialize, Serialize};

use super::LinearSvc;
use crate::error::Error;

/// Linear SVM Hyperparameters
///
/// The optimizer minimizes the squared hinge loss with L2 regularization in its dual form. `c`
/// weights the loss against the regularization, larger values fit the training data closer.
/// Each class is additionally weighted inversely to its frequency.
///
/// ## Example
///
/// ```ignore
/// use linfa_sentiment::svm::LinearSvc;
/// let model = LinearSvc::params()
///     .c(10.0)
///     .max_iter(2000)
///     .fit(&dataset)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvcValidParams {
    c: f64,
    max_iter: usize,
    eps: f64,
    seed: u64,
}

impl LinearSvcValidParams {
    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearSvcParams(LinearSvcValidParams);

impl LinearSvcParams {
    /// Create hyper parameter set
    ///
    /// Defaults:
    ///  * C of 1
    ///  * 1000 passes over the data
    ///  * Eps of 1e-4
    ///  * Seed 42 for the order of coordinate updates
    pub fn new() -> Self {
        Self(LinearSvcValidParams {
            c: 1.0,
            max_iter: 1000,
            eps: 1e-4,
            seed: 42,
        })
    }

    /// Set the penalty of misclassified samples
    pub fn c(mut self, c: f64) -> Self {
        self.0.c = c;
        self
    }

    /// Set the maximal number of passes over the training data
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.0.max_iter = max_iter;
        self
    }

    /// Set stopping condition
    ///
    /// The optimization stops once the spread of the projected gradients falls below this
    /// threshold.
    pub fn eps(mut self, eps: f64) -> Self {
        self.0.eps = eps;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for LinearSvcParams {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSvc {
    pub fn params() -> LinearSvcParams {
        LinearSvcParams::new()
    }
}

impl ParamGuard for LinearSvcParams {
    type Checked = LinearSvcValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if !(self.0.c > 0.0) || !self.0.c.is_finite() {
            Err(Error::Parameters(format!(
                "C should be positive and finite, but is {}",
                self.0.c
            )))
        } else if self.0.max_iter == 0 {
            Err(Error::Parameters(
                "at least one iteration is required".to_string(),
            ))
        } else if !(self.0.eps > 0.0) {
            Err(Error::Parameters(format!(
                "eps should be positive, but is {}",
                self.0.eps
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
