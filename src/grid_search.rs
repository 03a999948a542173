//! Exhaustive hyperparameter search with stratified k-fold cross-validation
//!
//! Every candidate of a [`ParamGrid`] is scored by its mean validation accuracy over `k` folds.
//! The whole pipeline, vectorizer included, is refitted on the training part of each fold so that
//! no vocabulary statistics leak from the validation part. All `(candidate, fold)` fits are
//! independent and run on the rayon thread pool. The best candidate is finally refitted on the
//! complete training set.

use std::collections::BTreeMap;

use linfa::ParamGuard;
use ndarray::Array1;
use rayon::prelude::*;
use tracing::info;

use sentiment_datasets::LabeledSentences;

use crate::error::{Error, Result};
use crate::forest::RandomForest;
use crate::metrics::BinaryConfusionMatrix;
use crate::pipeline::{ClassifierParams, FittedPipeline, TextPipeline};
use crate::svm::LinearSvc;

/// Candidate hyperparameters of a single classifier family
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    candidates: Vec<ClassifierParams>,
}

impl ParamGrid {
    /// Cartesian product of the penalty `c` and the iteration bound of a linear SVM
    pub fn svm(c: &[f64], max_iter: &[usize], seed: u64) -> Result<Self> {
        let mut candidates = Vec::with_capacity(c.len() * max_iter.len());
        for c in c {
            for max_iter in max_iter {
                let params = LinearSvc::params()
                    .c(*c)
                    .max_iter(*max_iter)
                    .seed(seed)
                    .check()?;
                candidates.push(ClassifierParams::Svm(params));
            }
        }

        Self::from_candidates(candidates)
    }

    /// Cartesian product of forest size, tree depth and minimal split size
    pub fn random_forest(
        n_estimators: &[usize],
        max_depth: &[Option<usize>],
        min_samples_split: &[usize],
        seed: u64,
    ) -> Result<Self> {
        let mut candidates = Vec::new();
        for n_estimators in n_estimators {
            for max_depth in max_depth {
                for min_samples_split in min_samples_split {
                    let params = RandomForest::params()
                        .n_estimators(*n_estimators)
                        .max_depth(*max_depth)
                        .min_samples_split(*min_samples_split)
                        .seed(seed)
                        .check()?;
                    candidates.push(ClassifierParams::RandomForest(params));
                }
            }
        }

        Self::from_candidates(candidates)
    }

    /// Grid over explicit candidates, which all have to belong to the same classifier family
    pub fn from_candidates(candidates: Vec<ClassifierParams>) -> Result<Self> {
        match candidates.first() {
            None => Err(Error::Parameters("empty parameter grid".to_string())),
            Some(first) if candidates.iter().any(|c| c.kind() != first.kind()) => Err(
                Error::Parameters("parameter grid mixes classifier families".to_string()),
            ),
            Some(_) => Ok(ParamGrid { candidates }),
        }
    }

    pub fn candidates(&self) -> &[ClassifierParams] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Split sample indices into `k` folds that preserve the class proportions
///
/// The samples of each class are divided, in order, into `k` contiguous chunks whose sizes differ
/// by at most one. Fold `j` validates on chunk `j` of every class and trains on the rest. Returns
/// `(train, validation)` index pairs with ascending indices.
pub fn stratified_folds(labels: &Array1<usize>, k: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    if k < 2 {
        return Err(Error::Parameters(format!(
            "cross-validation needs at least 2 folds, but got {}",
            k
        )));
    }

    let mut classes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        classes.entry(*label).or_default().push(idx);
    }
    if let Some((label, members)) = classes.iter().find(|(_, members)| members.len() < k) {
        return Err(Error::NotEnoughSamples(format!(
            "class {} has {} samples, fewer than the {} folds",
            label,
            members.len(),
            k
        )));
    }

    let mut fold_of = vec![0; labels.len()];
    for members in classes.values() {
        let (base, extra) = (members.len() / k, members.len() % k);
        let mut start = 0;
        for fold in 0..k {
            let size = base + usize::from(fold < extra);
            for idx in &members[start..start + size] {
                fold_of[*idx] = fold;
            }
            start += size;
        }
    }

    Ok((0..k)
        .map(|fold| {
            let (validation, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|idx| fold_of[*idx] == fold);
            (train, validation)
        })
        .collect())
}

/// Scores of one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CvResult {
    pub params: ClassifierParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Outcome of a grid search
#[derive(Debug)]
pub struct GridSearchResult {
    /// Best candidate refitted on the complete training set
    pub best_model: FittedPipeline,
    pub best_params: ClassifierParams,
    /// Mean cross-validation accuracy of the best candidate
    pub best_score: f64,
    /// Scores of all candidates in grid order
    pub cv_results: Vec<CvResult>,
}

/// Grid search over the classifier hyperparameters of a pipeline
#[derive(Debug, Clone)]
pub struct GridSearch {
    pipeline: TextPipeline,
    grid: ParamGrid,
    n_folds: usize,
}

impl GridSearch {
    /// Search with 3-fold cross-validation
    pub fn new(pipeline: TextPipeline, grid: ParamGrid) -> Self {
        GridSearch {
            pipeline,
            grid,
            n_folds: 3,
        }
    }

    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    pub fn fit(&self, data: &LabeledSentences) -> Result<GridSearchResult> {
        if self.grid.candidates()[0].kind() != self.pipeline.classifier().kind() {
            return Err(Error::Parameters(
                "parameter grid does not match the pipeline classifier".to_string(),
            ));
        }

        let folds = stratified_folds(data.labels(), self.n_folds)?
            .into_iter()
            .map(|(train, validation)| (data.select(&train), data.select(&validation)))
            .collect::<Vec<_>>();

        info!(
            candidates = self.grid.len(),
            folds = self.n_folds,
            fits = self.grid.len() * self.n_folds,
            "starting grid search"
        );

        let jobs = (0..self.grid.len())
            .flat_map(|candidate| (0..folds.len()).map(move |fold| (candidate, fold)))
            .collect::<Vec<_>>();
        let scores = jobs
            .par_iter()
            .map(|(candidate, fold)| -> Result<f64> {
                let (train, validation) = &folds[*fold];
                let model = self
                    .pipeline
                    .with_classifier(self.grid.candidates()[*candidate].clone())
                    .fit(train)?;
                let prediction = model.predict(validation.sentences())?;
                let cm = BinaryConfusionMatrix::from_predictions(&prediction, validation.labels())?;

                Ok(cm.accuracy())
            })
            .collect::<Result<Vec<f64>>>()?;

        let cv_results = self
            .grid
            .candidates()
            .iter()
            .zip(scores.chunks(folds.len()))
            .map(|(params, fold_scores)| CvResult {
                params: params.clone(),
                fold_scores: fold_scores.to_vec(),
                mean_score: fold_scores.iter().sum::<f64>() / fold_scores.len() as f64,
            })
            .collect::<Vec<_>>();

        // first candidate wins ties
        let mut best = &cv_results[0];
        for result in &cv_results[1..] {
            if result.mean_score > best.mean_score {
                best = result;
            }
        }
        info!(params = %best.params, score = best.mean_score, "best candidate");

        let best_model = self
            .pipeline
            .with_classifier(best.params.clone())
            .fit(data)?;

        Ok(GridSearchResult {
            best_model,
            best_params: best.params.clone(),
            best_score: best.mean_score,
            cv_results,
        })
    }
}
