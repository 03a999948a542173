//! Result tables, CSV export and the comparison chart

use std::fmt;
use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::config::ExperimentSettings;
use crate::error::Result;
use crate::experiment::{ResultRecord, SingleRun};
use crate::metrics::BinaryConfusionMatrix;
use crate::plot::{self, BarPanel};

pub const CONFUSION_CSV: &str = "confusion_matrix_results.csv";
pub const METRICS_CSV: &str = "metrics_results.csv";
pub const COMPARISON_CHART: &str = "performance_metrics_comparison.png";

/// Rectangular table of formatted cells
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Write header and rows as CSV, overwriting `path`
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        Ok(())
    }

    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Right-aligned columns separated by two spaces
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        writeln!(f, "{}", align(&self.headers, &widths))?;
        for row in &self.rows {
            writeln!(f, "{}", align(row, &widths))?;
        }

        Ok(())
    }
}

fn align(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Confusion counts per model, positive label 1
pub fn confusion_table(records: &[ResultRecord]) -> Table {
    let mut table = Table::new(&["Model", "TP", "FN", "FP", "TN"]);
    for record in records {
        let cm = &record.confusion;
        table.rows.push(vec![
            record.model_label(),
            cm.true_positives.to_string(),
            cm.false_negatives.to_string(),
            cm.false_positives.to_string(),
            cm.true_negatives.to_string(),
        ]);
    }

    table
}

/// Scores and timings per model
pub fn metrics_table(records: &[ResultRecord]) -> Table {
    let mut table = Table::new(&[
        "Model",
        "Accuracy",
        "Error Rate",
        "Precision",
        "Recall",
        "F1 Score",
        "MCC",
        "Training Time",
        "Prediction Time",
    ]);
    for record in records {
        let m = &record.metrics;
        table.rows.push(vec![
            record.model_label(),
            format!("{:.4}", m.accuracy),
            format!("{:.4}", m.error_rate),
            format!("{:.4}", m.precision),
            format!("{:.4}", m.recall),
            format!("{:.4}", m.f1_score),
            format!("{:.4}", m.mcc),
            format!("{:.2}s", record.train_time.as_secs_f64()),
            format!("{:.4}s", record.prediction_time.as_secs_f64()),
        ]);
    }

    table
}

/// Accuracy, MCC, F1 score and training time of every model
pub fn comparison_panels(records: &[ResultRecord]) -> Vec<BarPanel> {
    let panel = |title: &str, value: fn(&ResultRecord) -> f64| BarPanel {
        title: title.to_string(),
        values: records.iter().map(value).collect(),
    };

    vec![
        panel("Accuracy", |r| r.metrics.accuracy),
        panel("MCC", |r| r.metrics.mcc),
        panel("F1 Score", |r| r.metrics.f1_score),
        panel("Training Time (seconds)", |r| r.train_time.as_secs_f64()),
    ]
}

/// Export both tables, print them and draw the comparison chart
pub fn write_report(records: &[ResultRecord], settings: &ExperimentSettings) -> Result<()> {
    let confusion = confusion_table(records);
    let metrics = metrics_table(records);

    confusion.write_csv(settings.output_path(CONFUSION_CSV))?;
    metrics.write_csv(settings.output_path(METRICS_CSV))?;
    info!(dir = %settings.output_dir.display(), "saved result tables");

    println!("\n==== CONFUSION MATRIX COMPONENTS ====");
    print!("{}", confusion);
    println!("\n==== PERFORMANCE METRICS ====");
    print!("{}", metrics);

    if let Some(dir) = settings.plot_dir() {
        let labels = records
            .iter()
            .map(ResultRecord::short_label)
            .collect::<Vec<_>>();
        let path = dir.join(COMPARISON_CHART);
        plot::comparison_chart(&labels, &comparison_panels(records), &path)?;
        info!(path = %path.display(), "saved performance comparison");
    }

    Ok(())
}

/// Per-class precision, recall, F1 score and support
pub fn classification_report(cm: &BinaryConfusionMatrix) -> String {
    let mut out = format!(
        "{:>12}  {:>9}  {:>9}  {:>9}  {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    );

    // the negative class is scored from the swapped matrix
    for (label, cls) in [(0, cm.swapped()), (1, *cm)] {
        let _ = writeln!(
            out,
            "{:>12}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
            label,
            cls.precision(),
            cls.recall(),
            cls.f1_score(),
            cls.true_positives + cls.false_negatives
        );
    }

    let _ = writeln!(
        out,
        "\n{:>12}  {:>9}  {:>9}  {:>9.2}  {:>9}",
        "accuracy",
        "",
        "",
        cm.accuracy(),
        cm.total()
    );

    out
}

/// Console summary of a single forest run
pub fn single_report(run: &SingleRun) -> String {
    let record = &run.record;
    let m = &record.metrics;
    let mut out = String::new();

    if !run.top_features.is_empty() {
        out.push_str("Top important features:\n");
        for (term, importance) in &run.top_features {
            let _ = writeln!(out, "{}: {:.4}", term, importance);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Prediction completed in {:.2} seconds",
        record.prediction_time.as_secs_f64()
    );
    let _ = writeln!(out, "Validation Accuracy: {:.4}", m.accuracy);
    let _ = writeln!(out, "Error Rate: {:.4}", m.error_rate);
    let _ = writeln!(out, "Matthews Correlation Coefficient (MCC): {:.4}", m.mcc);

    out.push_str("\nClassification Report:\n");
    out.push_str(&classification_report(&record.confusion));

    let cells = record.confusion.to_array();
    out.push_str("\nConfusion Matrix:\n");
    for row in &cells {
        let _ = writeln!(out, "{:>8} {:>8}", row[0], row[1]);
    }

    out.push_str("\n===== Final Report =====\n");
    let _ = writeln!(
        out,
        "Model: RandomForest with {} features",
        record.config.suffix().to_uppercase()
    );
    let _ = writeln!(out, "Validation Accuracy: {:.4}", m.accuracy);
    let _ = writeln!(out, "Error Rate: {:.4}", m.error_rate);
    let _ = writeln!(out, "Matthews Correlation Coefficient: {:.4}", m.mcc);
    let _ = writeln!(out, "Model saved to {}", run.model_path.display());
    out.push_str("========================\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ExperimentConfig;
    use std::time::Duration;

    fn record(config: ExperimentConfig, cm: BinaryConfusionMatrix) -> ResultRecord {
        ResultRecord {
            config,
            confusion: cm,
            metrics: cm.metrics(),
            train_time: Duration::from_millis(1500),
            prediction_time: Duration::from_micros(12_345),
            best_score: 0.8,
            best_params: "C=1, max_iter=1000".to_string(),
        }
    }

    fn records() -> Vec<ResultRecord> {
        let cm = BinaryConfusionMatrix {
            true_positives: 55,
            true_negatives: 0,
            false_positives: 45,
            false_negatives: 0,
        };
        ExperimentConfig::all()
            .into_iter()
            .take(2)
            .map(|config| record(config, cm))
            .collect()
    }

    #[test]
    fn table_layout() {
        let records = records();
        let confusion = confusion_table(&records);
        assert_eq!(confusion.headers, vec!["Model", "TP", "FN", "FP", "TN"]);
        assert_eq!(
            confusion.rows[0],
            vec!["SVM (TFIDF, Stop Words: No)", "55", "0", "45", "0"]
        );
        assert_eq!(confusion.rows[1][0], "SVM (TFIDF, Stop Words: Yes)");

        let metrics = metrics_table(&records);
        assert_eq!(metrics.headers.len(), 9);
        assert_eq!(
            metrics.rows[0][1..],
            ["0.5500", "0.4500", "0.5500", "1.0000", "0.7097", "0.0000", "1.50s", "0.0123s"]
        );
    }

    #[test]
    fn csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ExperimentSettings {
            output_dir: dir.path().to_path_buf(),
            plots: false,
            ..Default::default()
        };

        write_report(&records(), &settings).unwrap();

        let content = std::fs::read_to_string(dir.path().join(CONFUSION_CSV)).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Model,TP,FN,FP,TN"));
        assert_eq!(lines.next(), Some("\"SVM (TFIDF, Stop Words: No)\",55,0,45,0"));
        assert_eq!(content.lines().count(), 3);

        let mut reader = csv::Reader::from_path(dir.path().join(METRICS_CSV)).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 9);
        assert_eq!(reader.records().count(), 2);
        assert!(!dir.path().join(COMPARISON_CHART).exists());
    }

    #[test]
    fn aligned_text() {
        let table = confusion_table(&records());
        let text = table.to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn per_class_report() {
        let cm = BinaryConfusionMatrix {
            true_positives: 40,
            true_negatives: 30,
            false_positives: 20,
            false_negatives: 10,
        };
        let report = classification_report(&cm);
        let lines = report.lines().collect::<Vec<_>>();

        // class 0: precision 30/40, recall 30/50
        assert!(lines[2].trim_start().starts_with('0'));
        assert!(lines[2].contains("0.75") && lines[2].contains("0.60") && lines[2].ends_with("50"));
        // class 1: precision 40/60, recall 40/50
        assert!(lines[3].contains("0.67") && lines[3].contains("0.80"));
        assert!(report.contains("accuracy") && report.contains("0.70"));
    }

    #[test]
    fn panels_follow_records() {
        let panels = comparison_panels(&records());
        let titles = panels.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(
            titles,
            ["Accuracy", "MCC", "F1 Score", "Training Time (seconds)"]
        );
        assert!(panels.iter().all(|p| p.values.len() == 2));
        assert_eq!(panels[3].values[0], 1.5);
    }
}
