use std::collections::HashSet;

use linfa::ParamGuard;
use serde::{Deserialize, Serialize};

use super::{stopwords::ENGLISH_STOP_WORDS, VectorizerKind};
use crate::error::Error;

/// Text vectorizer: learns a vocabulary from a sequence of documents and maps each document to a
/// sparse row of term weights.
///
/// Tokenization and counting are done by `linfa-preprocessing` with its defaults: documents are
/// lower-cased and split on `\b\w\w+\b`, which selects words of at least two characters.
///
/// ### Attributes
///
/// * `kind`: raw term counts (bag-of-words) or TF-IDF weights.
/// * `min_df`: minimum number of training documents a term must appear in. Defaults to `1`.
/// * `max_df`: maximum fraction of training documents a term may appear in. Defaults to `1.0`.
/// * `stopwords`: optional set of terms excluded from the vocabulary. Defaults to `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextVectorizerValidParams {
    kind: VectorizerKind,
    min_df: usize,
    max_df: f32,
    stopwords: Option<HashSet<String>>,
}

impl TextVectorizerValidParams {
    pub fn kind(&self) -> VectorizerKind {
        self.kind
    }

    pub fn min_df(&self) -> usize {
        self.min_df
    }

    pub fn max_df(&self) -> f32 {
        self.max_df
    }

    pub fn stopwords(&self) -> Option<&HashSet<String>> {
        self.stopwords.as_ref()
    }

    /// Relative lower document frequency bound for a corpus of `n_documents`
    ///
    /// The fraction is nudged up by half a document so that truncating `min_df * n` back to a
    /// count gives exactly `min_df`. Returns `None` if no term can satisfy both bounds.
    pub(crate) fn relative_min_df(&self, n_documents: usize) -> Option<f32> {
        let n = n_documents as f32;
        let max_abs_df = (self.max_df * n) as usize;
        if n_documents == 0 || self.min_df > max_abs_df {
            return None;
        }
        Some(((self.min_df as f32 + 0.5) / n).min(self.max_df))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextVectorizerParams(TextVectorizerValidParams);

impl TextVectorizerParams {
    pub fn new(kind: VectorizerKind) -> Self {
        Self(TextVectorizerValidParams {
            kind,
            min_df: 1,
            max_df: 1.0,
            stopwords: None,
        })
    }

    /// Specifies the minimum (absolute) and maximum (relative) document frequency of each
    /// vocabulary entry.
    ///
    /// `max_df` must lie in `(0, 1]`.
    pub fn document_frequency(mut self, min_df: usize, max_df: f32) -> Self {
        self.0.min_df = min_df;
        self.0.max_df = max_df;
        self
    }

    /// List of entries to be excluded from the generated vocabulary
    pub fn stopwords<T: ToString>(mut self, stopwords: &[T]) -> Self {
        self.0.stopwords = Some(stopwords.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Exclude the English stop word list from the vocabulary
    pub fn english_stopwords(self) -> Self {
        self.stopwords(ENGLISH_STOP_WORDS)
    }
}

impl ParamGuard for TextVectorizerParams {
    type Checked = TextVectorizerValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.max_df <= 0.0 || self.0.max_df > 1.0 || self.0.max_df.is_nan() {
            Err(Error::Parameters(format!(
                "maximum document frequency should lie in (0, 1], but is {}",
                self.0.max_df
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
