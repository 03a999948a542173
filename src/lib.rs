//! `linfa-sentiment` compares text classifiers on the Stanford Sentiment Treebank (SST-2).
//!
//! ## The Big Picture
//!
//! Each experiment couples a vectorizer, either TF-IDF or bag-of-words with or without English
//! stop words, to a classifier, either a linear support vector machine or a random forest. The
//! hyperparameters of the classifier are tuned by a grid search with stratified 3-fold
//! cross-validation on the training split, the best pipeline is refitted and then scored on the
//! validation split. All eight combinations are run one after the other and summarized in tables
//! and charts.
//!
//! Term counts and TF-IDF weights come from `linfa-preprocessing`, decision trees from
//! `linfa-trees`.
//!
//! The crate follows the `linfa` conventions: hyperparameters are checked through
//! [`ParamGuard`](linfa::ParamGuard), models are fitted with [`Fit`](linfa::traits::Fit) on a
//! [`DatasetBase`](linfa::DatasetBase) of [`SparseRecords`](records::SparseRecords) and predict
//! through [`PredictInplace`](linfa::traits::PredictInplace).
//!
//! ## Example
//!
//! ```no_run
//! use linfa_sentiment::prelude::*;
//! use sentiment_datasets::load_sst2;
//!
//! let settings = ExperimentSettings::default();
//! let data = load_sst2(&settings.source)?;
//! let records = run_experiments(&data, &settings)?;
//! write_report(&records, &settings)?;
//! # Ok::<(), linfa_sentiment::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod experiment;
pub mod forest;
pub mod grid_search;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod prelude;
pub mod records;
pub mod report;
pub mod svm;
pub mod trainer;
pub mod vectorizer;

pub use error::{Error, Result};
