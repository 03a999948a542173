//! Experiment driver
//!
//! Every combination of classifier, vectorizer and stop-word handling is trained and evaluated in
//! turn, producing one [`ResultRecord`] per combination. Experiments run strictly one after the
//! other, each grid search already saturates the thread pool. The first failing experiment aborts
//! the whole batch.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use sentiment_datasets::Sst2;

use crate::config::ExperimentSettings;
use crate::error::Result;
use crate::evaluation::{evaluate_model, EvaluationReport};
use crate::metrics::{BinaryConfusionMatrix, ClassificationMetrics};
use crate::pipeline::{model_suffix, ClassifierKind};
use crate::plot;
use crate::trainer::train_model;
use crate::vectorizer::VectorizerKind;

/// Number of vocabulary entries listed by a single forest run
pub const TOP_FEATURES: usize = 15;
/// Chart of the most important vocabulary entries
pub const FEATURE_IMPORTANCE_FILE: &str = "feature_importances_rf.png";

/// One combination of classifier, vectorizer and stop-word handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExperimentConfig {
    pub classifier: ClassifierKind,
    pub vectorizer: VectorizerKind,
    pub remove_stop_words: bool,
}

impl ExperimentConfig {
    /// All eight combinations: SVM before RF, TF-IDF before bag-of-words, stop-word removal
    /// before keeping the stop words
    pub fn all() -> Vec<ExperimentConfig> {
        let mut configs = Vec::with_capacity(8);
        for classifier in [ClassifierKind::Svm, ClassifierKind::RandomForest] {
            for vectorizer in [VectorizerKind::Tfidf, VectorizerKind::BagOfWords] {
                for remove_stop_words in [true, false] {
                    configs.push(ExperimentConfig {
                        classifier,
                        vectorizer,
                        remove_stop_words,
                    });
                }
            }
        }

        configs
    }

    pub fn suffix(&self) -> String {
        model_suffix(self.classifier, self.vectorizer, self.remove_stop_words)
    }

    /// Human readable summary, e.g. `SVM with TFIDF, without stop words`
    pub fn describe(&self) -> String {
        format!(
            "{} with {}, {} stop words",
            self.classifier.label(),
            self.vectorizer.label(),
            if self.remove_stop_words {
                "without"
            } else {
                "with"
            }
        )
    }
}

/// Outcome of a single experiment
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub config: ExperimentConfig,
    pub confusion: BinaryConfusionMatrix,
    pub metrics: ClassificationMetrics,
    pub train_time: Duration,
    pub prediction_time: Duration,
    /// Mean cross-validation accuracy of the selected hyperparameters
    pub best_score: f64,
    pub best_params: String,
}

impl ResultRecord {
    fn new(config: ExperimentConfig, train: TrainSummary, eval: EvaluationReport) -> Self {
        ResultRecord {
            config,
            confusion: eval.confusion,
            metrics: eval.metrics,
            train_time: train.train_time,
            prediction_time: eval.prediction_time,
            best_score: train.best_score,
            best_params: train.best_params,
        }
    }

    /// `Yes` if the stop words were kept in the vocabulary
    pub fn stop_words(&self) -> &'static str {
        if self.config.remove_stop_words {
            "No"
        } else {
            "Yes"
        }
    }

    /// Row label of the result tables, e.g. `SVM (TFIDF, Stop Words: No)`
    pub fn model_label(&self) -> String {
        format!(
            "{} ({}, Stop Words: {})",
            self.config.classifier.label(),
            self.config.vectorizer.label(),
            self.stop_words()
        )
    }

    /// Axis label of the comparison chart, e.g. `SVM (TFIDF, SW:No)`
    pub fn short_label(&self) -> String {
        format!(
            "{} ({}, SW:{})",
            self.config.classifier.label(),
            self.config.vectorizer.label(),
            self.stop_words()
        )
    }
}

struct TrainSummary {
    train_time: Duration,
    best_score: f64,
    best_params: String,
}

/// Train and evaluate `config` on the SST-2 splits
pub fn run_experiment(
    config: ExperimentConfig,
    data: &Sst2,
    settings: &ExperimentSettings,
) -> Result<ResultRecord> {
    let trained = train_model(
        &data.train,
        config.classifier,
        config.vectorizer,
        config.remove_stop_words,
        settings,
    )?;
    let eval = evaluate_model(
        &trained.model,
        &data.validation,
        &trained.suffix,
        settings.plot_dir(),
    )?;

    let summary = TrainSummary {
        train_time: trained.train_time,
        best_score: trained.best_score,
        best_params: trained.best_params.to_string(),
    };
    Ok(ResultRecord::new(config, summary, eval))
}

/// Run all eight experiments in order
pub fn run_experiments(data: &Sst2, settings: &ExperimentSettings) -> Result<Vec<ResultRecord>> {
    run_configs(&ExperimentConfig::all(), data, settings)
}

/// Run `configs` in order, one record per configuration
pub fn run_configs(
    configs: &[ExperimentConfig],
    data: &Sst2,
    settings: &ExperimentSettings,
) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::with_capacity(configs.len());
    for config in configs {
        println!("\n{}", "=".repeat(80));
        println!("Running experiment: {}", config.describe());
        println!("{}", "=".repeat(80));

        records.push(run_experiment(*config, data, settings)?);
    }

    Ok(records)
}

/// Outcome of training a single random forest
#[derive(Debug, Clone, PartialEq)]
pub struct SingleRun {
    pub record: ResultRecord,
    /// Most important vocabulary entries, most important first
    pub top_features: Vec<(String, f64)>,
    pub model_path: PathBuf,
}

/// File name of a persisted pipeline
pub fn model_file_name(suffix: &str) -> String {
    format!("model_{}.bin", suffix)
}

/// Train, evaluate and persist a single random forest pipeline
///
/// Besides the evaluation this lists the most important vocabulary entries and saves the fitted
/// pipeline to `model_{suffix}.bin` in the output directory.
pub fn run_single(
    vectorizer: VectorizerKind,
    remove_stop_words: bool,
    data: &Sst2,
    settings: &ExperimentSettings,
) -> Result<SingleRun> {
    let config = ExperimentConfig {
        classifier: ClassifierKind::RandomForest,
        vectorizer,
        remove_stop_words,
    };
    println!("Running experiment: {}", config.describe());

    let trained = train_model(
        &data.train,
        config.classifier,
        config.vectorizer,
        config.remove_stop_words,
        settings,
    )?;

    let top_features = trained
        .model
        .top_features(TOP_FEATURES)
        .unwrap_or_default();
    if let Some(dir) = settings.plot_dir() {
        let path = dir.join(FEATURE_IMPORTANCE_FILE);
        plot::feature_importance_chart(&top_features, &path)?;
        info!(path = %path.display(), "saved feature importances");
    }

    let eval = evaluate_model(
        &trained.model,
        &data.validation,
        &trained.suffix,
        settings.plot_dir(),
    )?;

    let model_path = settings.output_path(model_file_name(&trained.suffix));
    trained.model.save(&model_path)?;
    info!(path = %model_path.display(), "saved model");

    let summary = TrainSummary {
        train_time: trained.train_time,
        best_score: trained.best_score,
        best_params: trained.best_params.to_string(),
    };
    Ok(SingleRun {
        record: ResultRecord::new(config, summary, eval),
        top_features,
        model_path,
    })
}
