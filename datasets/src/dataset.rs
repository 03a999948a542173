use std::collections::BTreeMap;

use arrow::array::{Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use ndarray::Array1;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{DatasetError, Result};

/// Name of the text column in the SST-2 parquet files
pub const SENTENCE_COLUMN: &str = "sentence";
/// Name of the label column in the SST-2 parquet files
pub const LABEL_COLUMN: &str = "label";

/// An ordered collection of labeled sentences
///
/// Sentences and labels are stored column-wise, the `i`-th label belongs to the `i`-th sentence.
/// Labels are `0` for negative and `1` for positive sentiment.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSentences {
    sentences: Vec<String>,
    labels: Array1<usize>,
}

impl LabeledSentences {
    /// Create a new collection from sentences and labels of equal length
    ///
    /// # Panics
    ///
    /// If the number of sentences does not match the number of labels.
    pub fn new(sentences: Vec<String>, labels: Array1<usize>) -> Self {
        assert_eq!(
            sentences.len(),
            labels.len(),
            "every sentence needs exactly one label"
        );

        LabeledSentences { sentences, labels }
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Number of samples for each label, ordered by label
    pub fn class_distribution(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for label in self.labels.iter() {
            *counts.entry(*label).or_insert(0) += 1;
        }

        counts
    }

    /// Copy the samples at `indices` into a new collection, keeping the order of `indices`
    pub fn select(&self, indices: &[usize]) -> LabeledSentences {
        let sentences = indices.iter().map(|i| self.sentences[*i].clone()).collect();
        let labels = indices.iter().map(|i| self.labels[*i]).collect();

        LabeledSentences { sentences, labels }
    }
}

/// Decode a parquet file with a `sentence` and a `label` column
pub fn sentences_from_parquet(data: Bytes) -> Result<LabeledSentences> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;

    let mut sentences = Vec::new();
    let mut labels = Vec::new();
    for batch in reader {
        let batch = batch?;
        read_batch(&batch, sentences.len(), &mut sentences, &mut labels)?;
    }

    Ok(LabeledSentences::new(sentences, Array1::from(labels)))
}

fn read_batch(
    batch: &RecordBatch,
    offset: usize,
    sentences: &mut Vec<String>,
    labels: &mut Vec<usize>,
) -> Result<()> {
    let sentence_column = batch
        .column_by_name(SENTENCE_COLUMN)
        .ok_or(DatasetError::MissingColumn(SENTENCE_COLUMN))?;
    let label_column = batch
        .column_by_name(LABEL_COLUMN)
        .ok_or(DatasetError::MissingColumn(LABEL_COLUMN))?;

    match sentence_column.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {}
        other => {
            return Err(DatasetError::ColumnType {
                column: SENTENCE_COLUMN,
                found: other.to_string(),
                expected: "string",
            })
        }
    }
    if !label_column.data_type().is_integer() {
        return Err(DatasetError::ColumnType {
            column: LABEL_COLUMN,
            found: label_column.data_type().to_string(),
            expected: "integer",
        });
    }

    // normalize to plain utf8 strings and 64bit labels
    let sentence_column = cast(sentence_column, &DataType::Utf8)?;
    let label_column = cast(label_column, &DataType::Int64)?;
    let sentence_column = sentence_column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or(DatasetError::MissingColumn(SENTENCE_COLUMN))?;
    let label_column = label_column
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or(DatasetError::MissingColumn(LABEL_COLUMN))?;

    for (row, (sentence, label)) in sentence_column.iter().zip(label_column.iter()).enumerate() {
        let sentence = sentence.ok_or(DatasetError::NullValue {
            column: SENTENCE_COLUMN,
            row: offset + row,
        })?;
        let label = label.ok_or(DatasetError::NullValue {
            column: LABEL_COLUMN,
            row: offset + row,
        })?;
        if label < 0 {
            return Err(DatasetError::InvalidLabel(label));
        }

        sentences.push(sentence.to_string());
        labels.push(label as usize);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use ndarray::array;
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    fn write_parquet(batch: &RecordBatch) -> Bytes {
        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();

        Bytes::from(buf)
    }

    #[test]
    fn decodes_sentences_and_labels() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("idx", DataType::Int32, false),
            Field::new("sentence", DataType::Utf8, false),
            Field::new("label", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![0, 1, 2])),
                Arc::new(StringArray::from(vec!["a gripping film", "dull", "fine"])),
                Arc::new(Int64Array::from(vec![1, 0, 1])),
            ],
        )
        .unwrap();

        let data = sentences_from_parquet(write_parquet(&batch)).unwrap();
        assert_eq!(data.sentences(), &["a gripping film", "dull", "fine"]);
        assert_eq!(data.labels(), &array![1usize, 0, 1]);
        assert_eq!(data.class_distribution().get(&1), Some(&2));
    }

    #[test]
    fn narrow_label_types_are_accepted() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("sentence", DataType::Utf8, false),
            Field::new("label", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["good", "bad"])),
                Arc::new(Int32Array::from(vec![1, 0])),
            ],
        )
        .unwrap();

        let data = sentences_from_parquet(write_parquet(&batch)).unwrap();
        assert_eq!(data.labels(), &array![1usize, 0]);
    }

    #[test]
    fn missing_label_column_is_reported() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "sentence",
            DataType::Utf8,
            false,
        )]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["good"]))]).unwrap();

        let err = sentences_from_parquet(write_parquet(&batch)).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("label")));
    }

    #[test]
    fn string_labels_are_rejected() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("sentence", DataType::Utf8, false),
            Field::new("label", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["good"])),
                Arc::new(StringArray::from(vec!["positive"])),
            ],
        )
        .unwrap();

        let err = sentences_from_parquet(write_parquet(&batch)).unwrap_err();
        assert!(matches!(err, DatasetError::ColumnType { column: "label", .. }));
    }

    #[test]
    fn select_keeps_index_order() {
        let data = LabeledSentences::new(
            vec!["a".into(), "b".into(), "c".into()],
            array![0, 1, 0],
        );
        let subset = data.select(&[2, 0]);

        assert_eq!(subset.sentences(), &["c", "a"]);
        assert_eq!(subset.labels(), &array![0usize, 0]);
    }
}
