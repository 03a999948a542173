//! Error types in linfa-sentiment
//!

use thiserror::Error;

use sentiment_datasets::DatasetError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Linfa(#[from] linfa::Error),
    #[error(transparent)]
    Preprocessing(#[from] linfa_preprocessing::PreprocessingError),
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("unknown classifier `{0}`, expected one of `svm`, `rf`")]
    UnknownClassifier(String),
    #[error("unknown vectorizer `{0}`, expected one of `tfidf`, `bow`")]
    UnknownVectorizer(String),
    #[error("no term satisfies the document frequency thresholds")]
    EmptyVocabulary,
    #[error("not enough samples: {0}")]
    NotEnoughSamples(String),
    #[error("training data contains a single class")]
    SingleClass,
    #[error("label {0} is not binary, expected 0 or 1")]
    NonBinaryLabel(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not write table: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not (de)serialize model: {0}")]
    Persist(#[from] bincode::Error),
    #[error("could not render plot: {0}")]
    Plot(String),
}
