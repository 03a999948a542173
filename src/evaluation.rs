//! Evaluation of a fitted pipeline on held-out sentences

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::info;

use sentiment_datasets::LabeledSentences;

use crate::error::Result;
use crate::metrics::{BinaryConfusionMatrix, ClassificationMetrics};
use crate::pipeline::FittedPipeline;
use crate::plot;

/// Confusion counts, scores and timing of a single evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationReport {
    pub confusion: BinaryConfusionMatrix,
    pub metrics: ClassificationMetrics,
    /// Wall-clock time of vectorizing and classifying the sentences
    pub prediction_time: Duration,
}

/// File name of the confusion heatmap of a pipeline
pub fn heatmap_file_name(suffix: &str) -> String {
    format!("confusion_matrix_{}.png", suffix)
}

/// Predict `validation`, score the predictions and, given a `plot_dir`, render the confusion
/// heatmap `confusion_matrix_{suffix}.png` into it
pub fn evaluate_model(
    model: &FittedPipeline,
    validation: &LabeledSentences,
    suffix: &str,
    plot_dir: Option<&Path>,
) -> Result<EvaluationReport> {
    let start = Instant::now();
    let prediction = model.predict(validation.sentences())?;
    let prediction_time = start.elapsed();

    let confusion = BinaryConfusionMatrix::from_predictions(&prediction, validation.labels())?;
    let metrics = confusion.metrics();
    info!(
        suffix,
        accuracy = metrics.accuracy,
        mcc = metrics.mcc,
        "evaluated on validation set"
    );

    if let Some(dir) = plot_dir {
        let path = dir.join(heatmap_file_name(suffix));
        plot::confusion_heatmap(&confusion, &format!("Confusion Matrix - {}", suffix), &path)?;
        info!(path = %path.display(), "saved confusion matrix");
    }

    Ok(EvaluationReport {
        confusion,
        metrics,
        prediction_time,
    })
}
