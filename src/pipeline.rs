//! Text classification pipelines
//!
//! A pipeline chains a text vectorizer with a classifier. Fitting learns the vocabulary from the
//! training sentences, vectorizes them and trains the classifier on the result. Prediction applies
//! the same two steps to unseen sentences.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use linfa::prelude::*;
use linfa::ParamGuard;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sentiment_datasets::LabeledSentences;

use crate::error::{Error, Result};
use crate::forest::{RandomForest, RandomForestValidParams};
use crate::records::SparseRecords;
use crate::svm::{LinearSvc, LinearSvcValidParams};
use crate::vectorizer::{TextVectorizer, TextVectorizerValidParams, VectorizerKind};

/// Minimum number of training documents a vocabulary entry has to appear in
pub const MIN_DF: usize = 5;
/// Maximum fraction of training documents a vocabulary entry may appear in
pub const MAX_DF: f32 = 0.8;

/// Family of the classifier at the end of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifierKind {
    Svm,
    RandomForest,
}

impl ClassifierKind {
    /// Short name used in artifact file names
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierKind::Svm => "svm",
            ClassifierKind::RandomForest => "rf",
        }
    }

    /// Upper-case name used in reports
    pub fn label(&self) -> &'static str {
        match self {
            ClassifierKind::Svm => "SVM",
            ClassifierKind::RandomForest => "RF",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClassifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "svm" => Ok(ClassifierKind::Svm),
            "rf" => Ok(ClassifierKind::RandomForest),
            other => Err(Error::UnknownClassifier(other.to_string())),
        }
    }
}

/// Checked hyperparameters of either classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassifierParams {
    Svm(LinearSvcValidParams),
    RandomForest(RandomForestValidParams),
}

impl ClassifierParams {
    /// Default hyperparameters of `kind`
    pub fn default_for(kind: ClassifierKind) -> Result<Self> {
        Ok(match kind {
            ClassifierKind::Svm => ClassifierParams::Svm(LinearSvc::params().check()?),
            ClassifierKind::RandomForest => {
                ClassifierParams::RandomForest(RandomForest::params().check()?)
            }
        })
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            ClassifierParams::Svm(_) => ClassifierKind::Svm,
            ClassifierParams::RandomForest(_) => ClassifierKind::RandomForest,
        }
    }

    pub fn fit(
        &self,
        dataset: &DatasetBase<SparseRecords, Array1<usize>>,
    ) -> Result<FittedClassifier> {
        Ok(match self {
            ClassifierParams::Svm(params) => FittedClassifier::Svm(params.fit(dataset)?),
            ClassifierParams::RandomForest(params) => {
                FittedClassifier::RandomForest(params.fit(dataset)?)
            }
        })
    }
}

impl fmt::Display for ClassifierParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierParams::Svm(p) => write!(f, "C={}, max_iter={}", p.c(), p.max_iter()),
            ClassifierParams::RandomForest(p) => {
                let depth = p
                    .max_depth()
                    .map_or_else(|| "None".to_string(), |d| d.to_string());
                write!(
                    f,
                    "n_estimators={}, max_depth={}, min_samples_split={}",
                    p.n_estimators(),
                    depth,
                    p.min_samples_split()
                )
            }
        }
    }
}

/// File name suffix identifying a pipeline, e.g. `svm_tfidf_nostop`
pub fn model_suffix(
    classifier: ClassifierKind,
    vectorizer: VectorizerKind,
    remove_stop_words: bool,
) -> String {
    let mut suffix = format!("{}_{}", classifier.name(), vectorizer.name());
    if remove_stop_words {
        suffix.push_str("_nostop");
    }

    suffix
}

/// Assemble an unfitted pipeline and its file name suffix
///
/// The vectorizer keeps terms that occur in at least [`MIN_DF`] and at most [`MAX_DF`] of the
/// training documents. The classifier starts with its default hyperparameters.
pub fn build_pipeline(
    classifier: ClassifierKind,
    vectorizer: VectorizerKind,
    remove_stop_words: bool,
) -> Result<(TextPipeline, String)> {
    let mut params = TextVectorizer::params(vectorizer).document_frequency(MIN_DF, MAX_DF);
    if remove_stop_words {
        params = params.english_stopwords();
    }

    let pipeline = TextPipeline {
        vectorizer: params.check()?,
        classifier: ClassifierParams::default_for(classifier)?,
    };

    Ok((
        pipeline,
        model_suffix(classifier, vectorizer, remove_stop_words),
    ))
}

/// Unfitted vectorizer and classifier
#[derive(Debug, Clone, PartialEq)]
pub struct TextPipeline {
    vectorizer: TextVectorizerValidParams,
    classifier: ClassifierParams,
}

impl TextPipeline {
    pub fn new(vectorizer: TextVectorizerValidParams, classifier: ClassifierParams) -> Self {
        TextPipeline {
            vectorizer,
            classifier,
        }
    }

    pub fn vectorizer(&self) -> &TextVectorizerValidParams {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &ClassifierParams {
        &self.classifier
    }

    /// Same vectorizer with different classifier hyperparameters
    pub fn with_classifier(&self, classifier: ClassifierParams) -> Self {
        TextPipeline {
            vectorizer: self.vectorizer.clone(),
            classifier,
        }
    }

    /// Same classifier with a different vectorizer
    pub fn with_vectorizer(&self, vectorizer: TextVectorizerValidParams) -> Self {
        TextPipeline {
            vectorizer,
            classifier: self.classifier.clone(),
        }
    }

    pub fn fit(&self, data: &LabeledSentences) -> Result<FittedPipeline> {
        let vectorizer = self.vectorizer.fit(data.sentences())?;
        let records = vectorizer.transform(data.sentences())?;
        debug!(
            samples = records.nsamples(),
            vocabulary = records.nfeatures(),
            "vectorized training sentences"
        );

        let dataset = DatasetBase::new(records, data.labels().clone());
        let classifier = self.classifier.fit(&dataset)?;

        Ok(FittedPipeline {
            vectorizer,
            classifier,
        })
    }
}

/// Fitted classifier of either family
#[derive(Debug, Serialize, Deserialize)]
pub enum FittedClassifier {
    Svm(LinearSvc),
    RandomForest(RandomForest),
}

impl FittedClassifier {
    pub fn kind(&self) -> ClassifierKind {
        match self {
            FittedClassifier::Svm(_) => ClassifierKind::Svm,
            FittedClassifier::RandomForest(_) => ClassifierKind::RandomForest,
        }
    }

    pub fn predict(&self, records: &SparseRecords) -> Array1<usize> {
        match self {
            FittedClassifier::Svm(model) => model.predict(records),
            FittedClassifier::RandomForest(model) => model.predict(records),
        }
    }
}

/// Fitted vectorizer and classifier, the artifact of a training run
#[derive(Debug, Serialize, Deserialize)]
pub struct FittedPipeline {
    vectorizer: TextVectorizer,
    classifier: FittedClassifier,
}

impl FittedPipeline {
    pub fn vectorizer(&self) -> &TextVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &FittedClassifier {
        &self.classifier
    }

    /// Predict the sentiment of every sentence
    pub fn predict<S: AsRef<str>>(&self, sentences: &[S]) -> Result<Array1<usize>> {
        let records = self.vectorizer.transform(sentences)?;
        Ok(self.classifier.predict(&records))
    }

    /// The `k` vocabulary entries with the highest importance, most important first
    ///
    /// Only random forests report importances, `None` otherwise.
    pub fn top_features(&self, k: usize) -> Option<Vec<(String, f64)>> {
        let forest = match &self.classifier {
            FittedClassifier::RandomForest(forest) => forest,
            FittedClassifier::Svm(_) => return None,
        };

        let mut ranked = self
            .vectorizer
            .vocabulary()
            .iter()
            .cloned()
            .zip(forest.feature_importance().to_vec())
            .collect::<Vec<_>>();
        // stable sort keeps vocabulary order among equal importances
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        Some(ranked)
    }

    /// Persist the pipeline with bincode
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}
