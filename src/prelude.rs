//! linfa-sentiment prelude.
//!
//! This module contains the most used types and functions of an experiment run that you can
//! import easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{Error, Result};

#[doc(no_inline)]
pub use crate::config::ExperimentSettings;

#[doc(no_inline)]
pub use crate::pipeline::{
    build_pipeline, ClassifierKind, ClassifierParams, FittedPipeline, TextPipeline,
};

#[doc(no_inline)]
pub use crate::vectorizer::{TextVectorizer, VectorizerKind};

#[doc(no_inline)]
pub use crate::forest::RandomForest;

#[doc(no_inline)]
pub use crate::svm::LinearSvc;

#[doc(no_inline)]
pub use crate::grid_search::{GridSearch, ParamGrid};

#[doc(no_inline)]
pub use crate::metrics::{BinaryConfusionMatrix, ClassificationMetrics};

#[doc(no_inline)]
pub use crate::experiment::{run_experiments, run_single, ExperimentConfig, ResultRecord};

#[doc(no_inline)]
pub use crate::report::write_report;
