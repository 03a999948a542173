//! Random forest classification on sparse document vectors
//!
//! Every tree of the forest is a CART decision tree fitted on a bootstrap sample of the
//! documents, restricted to a random subset of `ceil(sqrt(n_features))` vocabulary entries.
//! Only these columns are densified, which keeps the memory of a single tree small even for large
//! vocabularies. Both classes are weighted inversely to their frequency. A document is assigned
//! the class predicted by the majority of the trees.

use linfa::dataset::Records;
use linfa::traits::{Predict, PredictInplace};
use linfa_trees::DecisionTree;
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::records::SparseRecords;

mod algorithm;
mod hyperparams;

pub use hyperparams::{RandomForestParams, RandomForestValidParams};

/// Fitted random forest
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree<f64, usize>>,
    tree_features: Vec<Vec<usize>>,
    n_features: usize,
}

impl RandomForest {
    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    /// Global feature indices each tree was trained on
    pub fn tree_features(&self) -> &[Vec<usize>] {
        &self.tree_features
    }

    /// Mean decrease in impurity of every feature, averaged over the trees
    ///
    /// Features that were not selected by a tree contribute zero for that tree, as do all features
    /// of a tree without a single split, whose normalised importances are undefined.
    pub fn feature_importance(&self) -> Array1<f64> {
        let mut importance = Array1::zeros(self.n_features);
        for (tree, features) in self.trees.iter().zip(&self.tree_features) {
            for (local, value) in tree.feature_importance().into_iter().enumerate() {
                if !value.is_finite() {
                    continue;
                }
                if let Some(global) = features.get(local) {
                    importance[*global] += value;
                }
            }
        }

        importance / self.trees.len().max(1) as f64
    }

    /// Per-row vote counts of the two classes
    fn votes(&self, x: &SparseRecords) -> Vec<[usize; 2]> {
        let rows = (0..x.nsamples()).collect::<Vec<_>>();
        let predictions = self
            .trees
            .par_iter()
            .zip(self.tree_features.par_iter())
            .map(|(tree, features)| tree.predict(&x.densify(&rows, features)))
            .collect::<Vec<Array1<usize>>>();

        let mut votes = vec![[0usize; 2]; x.nsamples()];
        for prediction in predictions {
            for (vote, label) in votes.iter_mut().zip(prediction.iter()) {
                vote[(*label).min(1)] += 1;
            }
        }

        votes
    }
}

impl PredictInplace<SparseRecords, Array1<usize>> for RandomForest {
    /// Majority vote of the trees, ties go to the negative class
    fn predict_inplace(&self, x: &SparseRecords, y: &mut Array1<usize>) {
        assert_eq!(
            x.nsamples(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.nfeatures(),
            self.n_features,
            "The number of features must match the fitted model."
        );

        for (target, vote) in y.iter_mut().zip(self.votes(x)) {
            *target = usize::from(vote[1] > vote[0]);
        }
    }

    fn default_target(&self, x: &SparseRecords) -> Array1<usize> {
        Array1::zeros(x.nsamples())
    }
}

/// Predict the sentiment of every document
impl<'a> Predict<&'a SparseRecords, Array1<usize>> for RandomForest {
    fn predict(&self, x: &'a SparseRecords) -> Array1<usize> {
        let mut y = self.default_target(x);
        self.predict_inplace(x, &mut y);
        y
    }
}

#[cfg(test)]
mod tests {
    use super::algorithm::subspace_size;
    use super::*;
    use crate::error::Error;
    use crate::vectorizer::{TextVectorizer, VectorizerKind};
    use crate::records::balanced_class_weights;
    use approx::assert_abs_diff_eq;
    use linfa::prelude::*;
    use ndarray::{array, Array2};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sentiment_datasets::generate::sentiment_corpus;
    use sprs::CsMat;

    #[test]
    fn subspace_is_square_root() {
        assert_eq!(subspace_size(1), 1);
        assert_eq!(subspace_size(4), 2);
        assert_eq!(subspace_size(10), 4);
        assert_eq!(subspace_size(10_000), 100);
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(RandomForest::params().n_estimators(0).check().is_err());
        assert!(RandomForest::params().min_samples_split(1).check().is_err());
        assert!(RandomForest::params().max_depth(Some(0)).check().is_err());
        assert!(RandomForest::params()
            .n_estimators(200)
            .max_depth(Some(20))
            .min_samples_split(5)
            .check()
            .is_ok());
    }

    #[test]
    fn learns_polar_corpus() {
        let mut rng = SmallRng::seed_from_u64(42);
        let train = sentiment_corpus(200, 4, &mut rng);
        let test = sentiment_corpus(40, 4, &mut rng);

        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .fit(train.sentences())
            .unwrap();
        let dataset = DatasetBase::new(
            vectorizer.transform(train.sentences()).unwrap(),
            train.labels().clone(),
        );
        let model = RandomForest::params()
            .n_estimators(50)
            .fit(&dataset)
            .unwrap();

        let pred = model.predict(&vectorizer.transform(test.sentences()).unwrap());
        let correct = pred
            .iter()
            .zip(test.labels())
            .filter(|(a, b)| a == b)
            .count();
        assert!(correct as f64 / test.len() as f64 > 0.8);
    }

    #[test]
    fn importance_covers_all_features() {
        let mut rng = SmallRng::seed_from_u64(3);
        let train = sentiment_corpus(100, 4, &mut rng);
        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .fit(train.sentences())
            .unwrap();
        let records = vectorizer.transform(train.sentences()).unwrap();
        let n_features = records.nfeatures();
        let model = RandomForest::params()
            .n_estimators(10)
            .fit(&DatasetBase::new(records, train.labels().clone()))
            .unwrap();

        let importance = model.feature_importance();
        assert_eq!(importance.len(), n_features);
        assert!(importance.iter().all(|v| *v >= 0.0));
        assert!(model
            .tree_features()
            .iter()
            .all(|f| f.len() == subspace_size(n_features)));
    }

    #[test]
    fn same_seed_same_forest() {
        let mut rng = SmallRng::seed_from_u64(9);
        let train = sentiment_corpus(60, 3, &mut rng);
        let vectorizer = TextVectorizer::params(VectorizerKind::Tfidf)
            .fit(train.sentences())
            .unwrap();
        let records = vectorizer.transform(train.sentences()).unwrap();
        let dataset = DatasetBase::new(records.clone(), train.labels().clone());

        let a = RandomForest::params().n_estimators(5).seed(1).fit(&dataset).unwrap();
        let b = RandomForest::params().n_estimators(5).seed(1).fit(&dataset).unwrap();
        assert_eq!(a.tree_features(), b.tree_features());
        assert_eq!(a.predict(&records), b.predict(&records));
    }

    #[test]
    fn unsplittable_trees_have_zero_importance() {
        // identical rows leave no split to make
        let matrix = CsMat::new(
            (4, 2),
            vec![0, 2, 4, 6, 8],
            vec![0, 1, 0, 1, 0, 1, 0, 1],
            vec![1.0; 8],
        );
        let dataset = DatasetBase::new(SparseRecords::new(matrix), array![0usize, 0, 1, 1]);
        let model = RandomForest::params().n_estimators(5).fit(&dataset).unwrap();

        let importance = model.feature_importance();
        assert!(importance.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(importance, array![0.0, 0.0]);
    }

    #[test]
    fn unbounded_trees_isolate_minority_samples() {
        // positives enclosed by a majority of negatives on a single feature
        let x = Array2::from_shape_fn((12, 1), |(i, _)| i as f64);
        let labels = array![0usize, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0];
        let class_weights = balanced_class_weights(&labels).unwrap();
        let weights = labels.mapv(|label| class_weights[label] as f32);
        let dataset = DatasetBase::new(x, labels.clone()).with_weights(weights);

        let params = RandomForest::params().check().unwrap();
        let tree = Fit::<_, _, linfa::Error>::fit(&params.tree_params(&class_weights), &dataset)
            .unwrap();

        assert_eq!(tree.predict(dataset.records()), labels);
    }

    #[test]
    fn single_class_is_rejected() {
        let vectorizer = TextVectorizer::params(VectorizerKind::BagOfWords)
            .fit(&["good film", "great film"])
            .unwrap();
        let records = vectorizer.transform(&["good film", "great film"]).unwrap();
        let res = RandomForest::params().fit(&DatasetBase::new(records, array![1usize, 1]));

        assert!(matches!(res, Err(Error::SingleClass)));
    }
}
