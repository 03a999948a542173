//! Training with hyperparameter search

use std::time::{Duration, Instant};

use tracing::info;

use sentiment_datasets::LabeledSentences;

use crate::config::ExperimentSettings;
use crate::error::Result;
use crate::grid_search::GridSearch;
use crate::pipeline::{build_pipeline, ClassifierKind, ClassifierParams, FittedPipeline};
use crate::vectorizer::VectorizerKind;

/// Best pipeline found by the grid search, refitted on the full training set
#[derive(Debug)]
pub struct TrainedModel {
    pub model: FittedPipeline,
    pub suffix: String,
    /// Wall-clock time of search and refit
    pub train_time: Duration,
    pub best_params: ClassifierParams,
    pub best_score: f64,
}

/// Tune and train a pipeline of `classifier` and `vectorizer` on `train`
pub fn train_model(
    train: &LabeledSentences,
    classifier: ClassifierKind,
    vectorizer: VectorizerKind,
    remove_stop_words: bool,
    settings: &ExperimentSettings,
) -> Result<TrainedModel> {
    let (pipeline, suffix) = build_pipeline(classifier, vectorizer, remove_stop_words)?;
    let grid = settings.param_grid(classifier)?;

    info!(
        classifier = classifier.label(),
        vectorizer = vectorizer.label(),
        remove_stop_words,
        "performing grid search"
    );

    let start = Instant::now();
    let result = GridSearch::new(pipeline, grid)
        .n_folds(settings.n_folds)
        .fit(train)?;
    let train_time = start.elapsed();

    info!(
        "training completed in {:.2} seconds",
        train_time.as_secs_f64()
    );
    info!("best parameters: {}", result.best_params);
    info!("best cross-validation score: {:.4}", result.best_score);

    Ok(TrainedModel {
        model: result.best_model,
        suffix,
        train_time,
        best_params: result.best_params,
        best_score: result.best_score,
    })
}
