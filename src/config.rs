//! Settings shared by all experiments of a run

use std::path::{Path, PathBuf};

use sentiment_datasets::Sst2Source;

use crate::error::Result;
use crate::grid_search::ParamGrid;
use crate::pipeline::ClassifierKind;

/// Number of cross-validation folds of the grid search
pub const CV_FOLDS: usize = 3;
/// Seed of every random choice made while training
pub const SEED: u64 = 42;

pub const SVM_C: &[f64] = &[0.1, 1.0, 10.0];
pub const SVM_MAX_ITER: &[usize] = &[1000, 2000];

pub const RF_N_ESTIMATORS: &[usize] = &[100, 200];
pub const RF_MAX_DEPTH: &[Option<usize>] = &[None, Some(10), Some(20)];
pub const RF_MIN_SAMPLES_SPLIT: &[usize] = &[2, 5];

/// Where data comes from, where artifacts go and which grids are searched
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSettings {
    pub source: Sst2Source,
    pub output_dir: PathBuf,
    /// Render PNG charts next to the tables
    pub plots: bool,
    pub n_folds: usize,
    pub seed: u64,
    pub svm_c: Vec<f64>,
    pub svm_max_iter: Vec<usize>,
    pub rf_n_estimators: Vec<usize>,
    pub rf_max_depth: Vec<Option<usize>>,
    pub rf_min_samples_split: Vec<usize>,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        ExperimentSettings {
            source: Sst2Source::default(),
            output_dir: PathBuf::from("."),
            plots: true,
            n_folds: CV_FOLDS,
            seed: SEED,
            svm_c: SVM_C.to_vec(),
            svm_max_iter: SVM_MAX_ITER.to_vec(),
            rf_n_estimators: RF_N_ESTIMATORS.to_vec(),
            rf_max_depth: RF_MAX_DEPTH.to_vec(),
            rf_min_samples_split: RF_MIN_SAMPLES_SPLIT.to_vec(),
        }
    }
}

impl ExperimentSettings {
    /// Hyperparameter candidates searched for `kind`
    pub fn param_grid(&self, kind: ClassifierKind) -> Result<ParamGrid> {
        match kind {
            ClassifierKind::Svm => ParamGrid::svm(&self.svm_c, &self.svm_max_iter, self.seed),
            ClassifierKind::RandomForest => ParamGrid::random_forest(
                &self.rf_n_estimators,
                &self.rf_max_depth,
                &self.rf_min_samples_split,
                self.seed,
            ),
        }
    }

    /// Path of an artifact in the output directory
    pub fn output_path<P: AsRef<Path>>(&self, file_name: P) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Directory for charts, `None` if plotting is disabled
    pub fn plot_dir(&self) -> Option<&Path> {
        if self.plots {
            Some(&self.output_dir)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grids() {
        let settings = ExperimentSettings::default();
        assert_eq!(settings.param_grid(ClassifierKind::Svm).unwrap().len(), 6);
        assert_eq!(
            settings
                .param_grid(ClassifierKind::RandomForest)
                .unwrap()
                .len(),
            12
        );
        assert_eq!(settings.n_folds, 3);
    }

    #[test]
    fn plots_can_be_disabled() {
        let mut settings = ExperimentSettings {
            output_dir: PathBuf::from("out"),
            ..Default::default()
        };
        assert_eq!(settings.plot_dir(), Some(Path::new("out")));
        assert_eq!(
            settings.output_path("metrics_results.csv"),
            Path::new("out").join("metrics_results.csv")
        );

        settings.plots = false;
        assert!(settings.plot_dir().is_none());
    }
}
