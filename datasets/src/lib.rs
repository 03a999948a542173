//! `sentiment-datasets` loads the Stanford Sentiment Treebank (SST-2) binary sentiment corpus.
//!
//! ## The Big Picture
//!
//! The corpus is published as two parquet files, a training and a validation split, each with a
//! `sentence` text column and a `label` column (`0` negative, `1` positive). This crate fetches
//! both files, either from the Hugging Face hub or from a local copy with the same layout, and
//! decodes them into [`LabeledSentences`].
//!
//! ## Using the dataset
//!
//! ```no_run
//! use sentiment_datasets::{load_sst2, Sst2Source};
//!
//! let sst2 = load_sst2(&Sst2Source::default()).unwrap();
//! println!("{} training sentences", sst2.train.len());
//! ```
//!
//! Failures are fatal to the caller, there is no retry.

use std::path::PathBuf;

use bytes::Bytes;
use tracing::info;

mod dataset;
mod error;
pub mod generate;

pub use dataset::{sentences_from_parquet, LabeledSentences, LABEL_COLUMN, SENTENCE_COLUMN};
pub use error::{DatasetError, Result};

/// Default location of the SST-2 files on the Hugging Face hub
pub const SST2_BASE_URL: &str = "https://huggingface.co/datasets/stanfordnlp/sst2/resolve/main";
/// Relative path of the training split
pub const TRAIN_FILE: &str = "data/train-00000-of-00001.parquet";
/// Relative path of the validation split
pub const VALIDATION_FILE: &str = "data/validation-00000-of-00001.parquet";

/// Where the two SST-2 parquet files are read from
#[derive(Debug, Clone, PartialEq)]
pub enum Sst2Source {
    /// Fetch the files over HTTP below this base url
    Remote { base_url: String },
    /// Read the files below this directory
    Local { dir: PathBuf },
}

impl Default for Sst2Source {
    fn default() -> Self {
        Sst2Source::Remote {
            base_url: SST2_BASE_URL.to_string(),
        }
    }
}

impl Sst2Source {
    fn read(&self, file: &str) -> Result<Bytes> {
        match self {
            Sst2Source::Remote { base_url } => {
                let url = format!("{}/{}", base_url.trim_end_matches('/'), file);
                info!(%url, "fetching split");
                fetch(&url)
            }
            Sst2Source::Local { dir } => {
                let path = dir.join(file);
                info!(path = %path.display(), "reading split");
                Ok(Bytes::from(std::fs::read(path)?))
            }
        }
    }
}

fn fetch(url: &str) -> Result<Bytes> {
    let wrap = |source| DatasetError::Fetch {
        url: url.to_string(),
        source,
    };

    reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(wrap)
}

/// Training and validation split of SST-2
#[derive(Debug, Clone)]
pub struct Sst2 {
    pub train: LabeledSentences,
    pub validation: LabeledSentences,
}

/// Load both splits of SST-2 from `source`
pub fn load_sst2(source: &Sst2Source) -> Result<Sst2> {
    let train = sentences_from_parquet(source.read(TRAIN_FILE)?)?;
    let validation = sentences_from_parquet(source.read(VALIDATION_FILE)?)?;

    info!(
        train = train.len(),
        validation = validation.len(),
        "loaded SST-2"
    );
    info!(
        train = ?train.class_distribution(),
        validation = ?validation.class_distribution(),
        "class distribution"
    );

    Ok(Sst2 { train, validation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::fs::{self, File};
    use std::sync::Arc;

    fn write_split(path: &std::path::Path, sentences: Vec<&str>, labels: Vec<i64>) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("sentence", DataType::Utf8, false),
            Field::new("label", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(sentences)),
                Arc::new(Int64Array::from(labels)),
            ],
        )
        .unwrap();

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn loads_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        write_split(
            &dir.path().join(TRAIN_FILE),
            vec!["great", "awful", "lovely"],
            vec![1, 0, 1],
        );
        write_split(&dir.path().join(VALIDATION_FILE), vec!["boring"], vec![0]);

        let sst2 = load_sst2(&Sst2Source::Local {
            dir: dir.path().to_path_buf(),
        })
        .unwrap();

        assert_eq!(sst2.train.len(), 3);
        assert_eq!(sst2.validation.sentences(), &["boring"]);
    }

    #[test]
    fn missing_local_copy_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sst2(&Sst2Source::Local {
            dir: dir.path().to_path_buf(),
        })
        .unwrap_err();

        assert!(matches!(err, DatasetError::Io(_)));
    }
}
