//! PNG charts rendered with plotters
//!
//! All charts are drawn on a bitmap backend and written to the given path, overwriting an existing
//! file.

use std::fmt::Display;
use std::path::Path;

use plotters::prelude::*;

use crate::error::{Error, Result};
use crate::metrics::BinaryConfusionMatrix;

const CLASS_NAMES: [&str; 2] = ["Negative", "Positive"];

fn plot_err<E: Display>(err: E) -> Error {
    Error::Plot(err.to_string())
}

/// Sequential blue color scale, `t` in `[0, 1]`
fn blues(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(lerp(247, 8), lerp(251, 48), lerp(255, 107))
}

/// 2x2 heatmap of a confusion matrix with the counts annotated
///
/// Rows are the true labels, columns the predicted ones, negative first.
pub fn confusion_heatmap(cm: &BinaryConfusionMatrix, title: &str, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let cells = cm.to_array();
    let max = cells.iter().flatten().copied().max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..2).into_segmented(), (0u32..2).into_segmented())
        .map_err(plot_err)?;

    // true label `row` is drawn top to bottom
    let class_of = |v: &SegmentValue<u32>, flip: bool| match v {
        SegmentValue::CenterOf(i) if *i < 2 => {
            let idx = if flip { 1 - *i } else { *i };
            CLASS_NAMES[idx as usize].to_string()
        }
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Predicted labels")
        .y_desc("True labels")
        .x_label_formatter(&|v| class_of(v, false))
        .y_label_formatter(&|v| class_of(v, true))
        .draw()
        .map_err(plot_err)?;

    for (row, counts) in cells.iter().enumerate() {
        for (col, count) in counts.iter().enumerate() {
            let (x, y) = (col as u32, 1 - row as u32);
            let shade = *count as f64 / max;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [
                        (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                    ],
                    blues(shade).filled(),
                )))
                .map_err(plot_err)?;

            let color = if shade > 0.5 { &WHITE } else { &BLACK };
            chart
                .draw_series(std::iter::once(Text::new(
                    count.to_string(),
                    (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                    ("sans-serif", 28).into_font().color(color),
                )))
                .map_err(plot_err)?;
        }
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Values of one bar panel, one per model
#[derive(Debug, Clone)]
pub struct BarPanel {
    pub title: String,
    pub values: Vec<f64>,
}

fn value_range(values: &[f64]) -> std::ops::Range<f64> {
    let min = values.iter().copied().fold(0.0, f64::min);
    let max = values.iter().copied().fold(0.0, f64::max);
    let pad = ((max - min) * 0.1).max(1e-3);

    (if min < 0.0 { min - pad } else { 0.0 })..(max + pad)
}

/// Grid of 2x2 bar charts sharing the model labels on the x axis
pub fn comparison_chart(labels: &[String], panels: &[BarPanel], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (1800, 1200)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let n = labels.len() as u32;
    for (area, panel) in root.split_evenly((2, 2)).iter().zip(panels) {
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", 22).into_font())
            .margin(10)
            .x_label_area_size(160)
            .y_label_area_size(60)
            .build_cartesian_2d((0..n).into_segmented(), value_range(&panel.values))
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_style(
                ("sans-serif", 12)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(panel.values.iter().enumerate().map(|(i, value)| {
                let i = i as u32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), *value),
                    ],
                    Palette99::pick(i as usize).filled(),
                );
                bar.set_margin(0, 0, 8, 8);
                bar
            }))
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Horizontal bars of the most important vocabulary entries, most important on top
pub fn feature_importance_chart(features: &[(String, f64)], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let n = features.len() as u32;
    let max = features.iter().map(|(_, v)| *v).fold(0.0, f64::max).max(1e-6);
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Top {} Feature Importances", features.len()),
            ("sans-serif", 22).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(0.0..max * 1.1, (0..n).into_segmented())
        .map_err(plot_err)?;

    // feature `k` sits at row `n - 1 - k`
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Feature Importance")
        .y_desc("Feature")
        .y_labels(features.len())
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(row) if *row < n => features[(n - 1 - *row) as usize].0.clone(),
            _ => String::new(),
        })
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(features.iter().enumerate().map(|(k, (_, value))| {
            let row = n - 1 - k as u32;
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(row)),
                    (*value, SegmentValue::Exact(row + 1)),
                ],
                BLUE.filled(),
            );
            bar.set_margin(4, 4, 0, 0);
            bar
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blue_scale_endpoints() {
        let rgb = |c: RGBColor| (c.0, c.1, c.2);
        assert_eq!(rgb(blues(0.0)), (247, 251, 255));
        assert_eq!(rgb(blues(1.0)), (8, 48, 107));
        assert_eq!(rgb(blues(2.0)), rgb(blues(1.0)));
    }

    #[test]
    fn ranges_include_zero() {
        let range = value_range(&[0.2, 0.9]);
        assert_eq!(range.start, 0.0);
        assert!(range.end > 0.9);

        let range = value_range(&[-0.5, 0.5]);
        assert!(range.start < -0.5);

        let range = value_range(&[]);
        assert!(range.end > range.start);
    }

    fn assert_png(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", path.display());
    }

    #[test]
    fn heatmap_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confusion_matrix_svm_tfidf.png");
        let cm = BinaryConfusionMatrix {
            true_positives: 40,
            true_negatives: 35,
            false_positives: 7,
            false_negatives: 3,
        };

        confusion_heatmap(&cm, "SVM with TFIDF", &path).unwrap();
        assert_png(&path);
    }

    #[test]
    fn comparison_chart_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("performance_metrics_comparison.png");
        let labels = vec!["SVM-TFIDF".to_string(), "RF-BOW".to_string()];
        let panels = ["Accuracy", "F1 Score", "Training Time (s)", "Prediction Time (s)"]
            .iter()
            .map(|title| BarPanel {
                title: title.to_string(),
                values: vec![0.8, 0.7],
            })
            .collect::<Vec<_>>();

        comparison_chart(&labels, &panels, &path).unwrap();
        assert_png(&path);
    }

    #[test]
    fn feature_chart_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_importances_rf.png");
        let features = vec![
            ("dull".to_string(), 0.3),
            ("delightful".to_string(), 0.2),
            ("film".to_string(), 0.0),
        ];

        feature_importance_chart(&features, &path).unwrap();
        assert_png(&path);
    }
}
