use linfa::ParamGuard;
use serde::{Deserialize, Serialize};

use super::RandomForest;
use crate::error::Error;

/// The set of hyperparameters that can be specified for fitting a
/// [random forest](RandomForest).
///
/// ### Attributes
///
/// * `n_estimators`: number of decision trees. Defaults to `100`.
/// * `max_depth`: optional maximum depth of every tree. Defaults to `None`.
/// * `min_samples_split`: minimum number of samples required to split a node. Defaults to `2`.
/// * `seed`: seed of the bootstrap and feature sampling. Tree `i` draws from `seed + i`.
///   Defaults to `42`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForestValidParams {
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    seed: u64,
}

impl RandomForestValidParams {
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RandomForestParams(RandomForestValidParams);

impl RandomForestParams {
    pub fn new() -> Self {
        Self(RandomForestValidParams {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        })
    }

    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.0.n_estimators = n_estimators;
        self
    }

    /// Set the optional limit to the depth of the trees
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    pub fn min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.0.min_samples_split = min_samples_split;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomForest {
    pub fn params() -> RandomForestParams {
        RandomForestParams::new()
    }
}

impl ParamGuard for RandomForestParams {
    type Checked = RandomForestValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_estimators == 0 {
            Err(Error::Parameters(
                "a forest needs at least one tree".to_string(),
            ))
        } else if self.0.min_samples_split < 2 {
            Err(Error::Parameters(format!(
                "min_samples_split should be at least 2, but is {}",
                self.0.min_samples_split
            )))
        } else if self.0.max_depth == Some(0) {
            Err(Error::Parameters(
                "max_depth should be positive".to_string(),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
