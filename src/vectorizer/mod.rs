//! Text vectorization
//!
//! Tokenization, vocabulary fitting and term weighting are delegated to `linfa-preprocessing`:
//! its `CountVectorizer` produces raw term counts (bag-of-words) and its `TfIdfVectorizer` with
//! smoothed inverse document frequency produces TF-IDF weights. TF-IDF rows are L2 normalised
//! here before being handed to the classifiers.

use std::fmt;
use std::str::FromStr;

use linfa::ParamGuard;
use linfa_preprocessing::CountVectorizer;
use linfa_preprocessing::tf_idf_vectorization::{
    FittedTfIdfVectorizer, TfIdfVectorizer,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use sprs::CsMat;

use crate::error::{Error, Result};
use crate::records::SparseRecords;

mod hyperparams;
mod stopwords;

pub use hyperparams::{TextVectorizerParams, TextVectorizerValidParams};
pub use stopwords::ENGLISH_STOP_WORDS;

/// Weighting applied to the term counts of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorizerKind {
    Tfidf,
    BagOfWords,
}

impl VectorizerKind {
    /// Short name used in artifact file names
    pub fn name(&self) -> &'static str {
        match self {
            VectorizerKind::Tfidf => "tfidf",
            VectorizerKind::BagOfWords => "bow",
        }
    }

    /// Upper-case name used in reports
    pub fn label(&self) -> &'static str {
        match self {
            VectorizerKind::Tfidf => "TFIDF",
            VectorizerKind::BagOfWords => "BOW",
        }
    }
}

impl fmt::Display for VectorizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VectorizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tfidf" => Ok(VectorizerKind::Tfidf),
            "bow" => Ok(VectorizerKind::BagOfWords),
            other => Err(Error::UnknownVectorizer(other.to_string())),
        }
    }
}

impl TextVectorizerValidParams {
    /// Learns a vocabulary from `documents` and, for TF-IDF, the inverse document frequency of
    /// every entry.
    ///
    /// Returns `Error::EmptyVocabulary` if no term satisfies the document frequency thresholds.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Result<TextVectorizer> {
        let min_df = self
            .relative_min_df(documents.len())
            .ok_or(Error::EmptyVocabulary)?;
        let corpus = corpus(documents);
        let stopwords = self
            .stopwords()
            .map(|words| words.iter().collect::<Vec<_>>());

        let weighting = match self.kind() {
            VectorizerKind::BagOfWords => {
                let mut params = CountVectorizer::params().document_frequency(min_df, self.max_df());
                if let Some(words) = &stopwords {
                    params = params.stopwords(words);
                }
                Weighting::Counts(params.fit(&corpus)?)
            }
            VectorizerKind::Tfidf => {
                let mut params = TfIdfVectorizer::default()
                    .document_frequency(min_df, self.max_df());
                if let Some(words) = &stopwords {
                    params = params.stopwords(words);
                }
                Weighting::Tfidf(params.fit(&corpus)?)
            }
        };

        let vectorizer = TextVectorizer {
            weighting,
            properties: self.clone(),
        };
        if vectorizer.nentries() == 0 {
            return Err(Error::EmptyVocabulary);
        }
        Ok(vectorizer)
    }
}

impl TextVectorizerParams {
    /// Checks the parameters and learns a vocabulary from `documents`
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Result<TextVectorizer> {
        self.check_ref().and_then(|params| params.fit(documents))
    }
}

fn corpus<S: AsRef<str>>(documents: &[S]) -> Array1<String> {
    documents
        .iter()
        .map(|document| document.as_ref().to_string())
        .collect()
}

/// Scales every row with a non-zero entry to unit euclidean norm
fn l2_normalize_rows(matrix: CsMat<f64>) -> CsMat<f64> {
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };
    let shape = matrix.shape();
    let (indptr, indices, mut data) = matrix.into_raw_storage();

    for bounds in indptr.windows(2) {
        let row = &mut data[bounds[0]..bounds[1]];
        let norm = row.iter().map(|val| val * val).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|val| *val /= norm);
        }
    }

    CsMat::new(shape, indptr, indices, data)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Weighting {
    Counts(CountVectorizer),
    Tfidf(FittedTfIdfVectorizer),
}

/// Fitted text vectorizer
///
/// Vocabulary entry `j` is the `j`-th term in lexicographic order and indexes column `j` of the
/// transformed documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextVectorizer {
    weighting: Weighting,
    properties: TextVectorizerValidParams,
}

impl TextVectorizer {
    pub fn params(kind: VectorizerKind) -> TextVectorizerParams {
        TextVectorizerParams::new(kind)
    }

    /// Number of vocabulary entries learned during fitting
    pub fn nentries(&self) -> usize {
        self.vocabulary().len()
    }

    pub fn vocabulary(&self) -> &[String] {
        match &self.weighting {
            Weighting::Counts(vectorizer) => vectorizer.vocabulary(),
            Weighting::Tfidf(vectorizer) => vectorizer.vocabulary(),
        }
    }

    pub fn kind(&self) -> VectorizerKind {
        self.properties.kind()
    }

    /// Maps `documents` to a sparse matrix of shape `(documents.len(), nentries())`
    ///
    /// Terms outside the vocabulary are ignored, a document without any known term becomes an
    /// empty row.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<SparseRecords> {
        let corpus = corpus(documents);
        let matrix = match &self.weighting {
            Weighting::Counts(vectorizer) => vectorizer
                .transform(&corpus)
                .map(|count| *count as f64),
            Weighting::Tfidf(vectorizer) => l2_normalize_rows(vectorizer.transform(&corpus)),
        };
        Ok(SparseRecords::new(matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linfa::dataset::Records;
    use ndarray::{array, Array2};

    fn dense(records: &SparseRecords) -> Array2<f64> {
        records.matrix().to_dense()
    }

    #[test]
    fn counts_follow_sorted_vocabulary() {
        let texts = ["oNe two three four", "TWO three four", "three;four", "four"];
        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .fit(&texts)
            .unwrap();

        assert_eq!(vectorizer.vocabulary(), &["four", "one", "three", "two"]);
        let counts = dense(&vectorizer.transform(&texts).unwrap());
        assert_eq!(
            counts,
            array![
                [1., 1., 1., 1.],
                [1., 0., 1., 1.],
                [1., 0., 1., 0.],
                [1., 0., 0., 0.]
            ]
        );
    }

    #[test]
    fn single_characters_are_not_tokens() {
        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .fit(&["a b cd", "cd e"])
            .unwrap();
        assert_eq!(vectorizer.vocabulary(), &["cd"]);
    }

    #[test]
    fn document_frequency_thresholds() {
        let texts = [
            "common rare", "common often", "common often", "common often", "common other",
        ];
        // min 2 documents, at most 80% of the 5 documents
        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .document_frequency(2, 0.8)
            .fit(&texts)
            .unwrap();

        assert_eq!(vectorizer.vocabulary(), &["often"]);
    }

    #[test]
    fn stop_words_are_removed() {
        let texts = ["the film is great", "the film is dull"];
        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .english_stopwords()
            .fit(&texts)
            .unwrap();

        assert_eq!(vectorizer.vocabulary(), &["dull", "film", "great"]);
    }

    #[test]
    fn minimum_document_count_is_exact() {
        // "often" appears in 5 of 9 documents, "seldom" in 4
        let mut texts = vec!["often seldom"; 4];
        texts.push("often");
        texts.extend(std::iter::repeat("filler").take(4));
        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .document_frequency(5, 1.0)
            .fit(&texts)
            .unwrap();

        assert_eq!(vectorizer.vocabulary(), &["often"]);
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let res = TextVectorizer::params(VectorizerKind::Tfidf)
            .document_frequency(3, 1.0)
            .fit(&["one two", "three four"]);
        assert!(matches!(res, Err(Error::EmptyVocabulary)));

        let res = TextVectorizer::params(VectorizerKind::BagOfWords)
            .english_stopwords()
            .fit(&["the is", "is it"]);
        assert!(matches!(res, Err(Error::EmptyVocabulary)));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let res = TextVectorizer::params(VectorizerKind::Tfidf)
            .document_frequency(1, 0.0)
            .fit(&["one two"]);
        assert!(matches!(res, Err(Error::Parameters(_))));

        let res = TextVectorizer::params(VectorizerKind::Tfidf)
            .document_frequency(1, 1.5)
            .fit(&["one two"]);
        assert!(matches!(res, Err(Error::Parameters(_))));
    }

    #[test]
    fn tfidf_weights() {
        let texts = ["one two two", "one three"];
        let vectorizer = TextVectorizer::params(VectorizerKind::Tfidf)
            .fit(&texts)
            .unwrap();
        assert_eq!(vectorizer.vocabulary(), &["one", "three", "two"]);

        // smooth idf: ln((1 + n) / (1 + df)) + 1
        let rare = (3.0f64 / 2.0).ln() + 1.0;
        let weights = dense(&vectorizer.transform(&texts).unwrap());
        let norm0 = (1.0 + (2.0 * rare).powi(2)).sqrt();
        let norm1 = (1.0 + rare * rare).sqrt();
        assert_abs_diff_eq!(
            weights,
            array![
                [1.0 / norm0, 0.0, 2.0 * rare / norm0],
                [1.0 / norm1, rare / norm1, 0.0]
            ],
            epsilon = 1e-12
        );
    }

    #[test]
    fn fitted_vectorizer_survives_serialization() {
        let texts = ["good movie", "bad movie", "good plot"];
        let vectorizer = TextVectorizer::params(VectorizerKind::Tfidf)
            .fit(&texts)
            .unwrap();

        let bytes = bincode::serialize(&vectorizer).unwrap();
        let restored: TextVectorizer = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.vocabulary(), vectorizer.vocabulary());
        assert_eq!(restored.kind(), VectorizerKind::Tfidf);
        assert_abs_diff_eq!(
            dense(&restored.transform(&texts).unwrap()),
            dense(&vectorizer.transform(&texts).unwrap()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn unknown_terms_give_empty_rows() {
        let vectorizer = TextVectorizer::params(VectorizerKind::Tfidf)
            .fit(&["good movie", "bad movie"])
            .unwrap();
        let records = vectorizer.transform(&["nothing known here"]).unwrap();

        assert_eq!(records.nsamples(), 1);
        assert_eq!(records.nfeatures(), 3);
        assert_eq!(records.matrix().nnz(), 0);
    }

    #[test]
    fn kinds_parse_strictly() {
        assert_eq!("tfidf".parse::<VectorizerKind>().unwrap(), VectorizerKind::Tfidf);
        assert_eq!("bow".parse::<VectorizerKind>().unwrap(), VectorizerKind::BagOfWords);
        assert!(matches!(
            "word2vec".parse::<VectorizerKind>(),
            Err(Error::UnknownVectorizer(name)) if name == "word2vec"
        ));
        assert!("TFIDF".parse::<VectorizerKind>().is_err());
    }
}
