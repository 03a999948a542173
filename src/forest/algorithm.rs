use linfa::dataset::{DatasetBase, Records};
use linfa::traits::Fit;
use linfa_trees::{DecisionTree, DecisionTreeParams};
use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use super::{RandomForest, RandomForestValidParams};
use crate::error::{Error, Result};
use crate::records::{balanced_class_weights, SparseRecords};

/// Number of features every tree is trained on
pub(crate) fn subspace_size(n_features: usize) -> usize {
    ((n_features as f64).sqrt().ceil() as usize).clamp(1, n_features.max(1))
}

impl RandomForestValidParams {
    /// Fit tree `idx` on a bootstrap sample of the rows and a random subset of the columns
    fn fit_tree(
        &self,
        idx: usize,
        records: &SparseRecords,
        labels: &Array1<usize>,
        class_weights: &[f64; 2],
    ) -> Result<(DecisionTree<f64, usize>, Vec<usize>)> {
        let mut rng = SmallRng::seed_from_u64(self.seed().wrapping_add(idx as u64));
        let n_samples = records.nsamples();
        let n_features = records.nfeatures();

        let rows = (0..n_samples)
            .map(|_| rng.gen_range(0..n_samples))
            .collect::<Vec<_>>();
        let mut features = sample(&mut rng, n_features, subspace_size(n_features)).into_vec();
        features.sort_unstable();

        let targets = rows.iter().map(|i| labels[*i]).collect::<Array1<_>>();
        let weights = targets
            .iter()
            .map(|label| class_weights[*label] as f32)
            .collect::<Array1<f32>>();
        let dataset =
            DatasetBase::new(records.densify(&rows, &features), targets).with_weights(weights);

        let tree = Fit::<_, _, linfa::Error>::fit(&self.tree_params(class_weights), &dataset)?;

        Ok((tree, features))
    }

    /// Tree settings for samples weighted by `class_weights`
    pub(crate) fn tree_params(&self, class_weights: &[f64; 2]) -> DecisionTreeParams<f64, usize> {
        // thresholds count samples of the lighter class, so a node of `min_samples_split`
        // samples can always be split and a single sample can form a leaf
        let unit = class_weights[0].min(class_weights[1]) as f32;
        DecisionTree::params()
            .max_depth(self.max_depth())
            .min_weight_split(self.min_samples_split() as f32 * unit)
            .min_weight_leaf(unit)
    }
}

impl Fit<SparseRecords, Array1<usize>, Error> for RandomForestValidParams {
    type Object = RandomForest;

    /// Fit all trees of the forest in parallel
    fn fit(&self, dataset: &DatasetBase<SparseRecords, Array1<usize>>) -> Result<Self::Object> {
        let records = dataset.records();
        let labels = dataset.targets();
        if records.nfeatures() == 0 {
            return Err(Error::Parameters(
                "cannot fit a forest without features".to_string(),
            ));
        }
        let class_weights = balanced_class_weights(labels)?;

        let (trees, tree_features): (Vec<_>, Vec<_>) = (0..self.n_estimators())
            .into_par_iter()
            .map(|idx| self.fit_tree(idx, records, labels, &class_weights))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        debug!(
            trees = trees.len(),
            features_per_tree = subspace_size(records.nfeatures()),
            "fitted random forest"
        );

        Ok(RandomForest {
            trees,
            tree_features,
            n_features: records.nfeatures(),
        })
    }
}
