//! Utility functions for randomly generating sentiment corpora

use ndarray::Array1;
use rand::Rng;

use crate::LabeledSentences;

const POSITIVE: &[&str] = &[
    "brilliant", "moving", "delightful", "charming", "superb", "gripping", "witty", "beautiful",
];
const NEGATIVE: &[&str] = &[
    "dull", "tedious", "clumsy", "boring", "awful", "lifeless", "predictable", "bland",
];
const NEUTRAL: &[&str] = &[
    "film", "story", "cast", "director", "script", "scenes", "performance", "plot", "the", "and",
];

/// Generate `n_samples` short reviews with a binary sentiment label
///
/// Every sentence mixes `sentence_len` neutral filler words with at least one word drawn from the
/// vocabulary of its class. Labels alternate so that both classes are (almost) equally frequent.
pub fn sentiment_corpus(
    n_samples: usize,
    sentence_len: usize,
    rng: &mut impl Rng,
) -> LabeledSentences {
    let mut sentences = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);

    for i in 0..n_samples {
        let label = i % 2;
        let polar = if label == 1 { POSITIVE } else { NEGATIVE };

        let mut words = (0..sentence_len.max(1))
            .map(|_| NEUTRAL[rng.gen_range(0..NEUTRAL.len())])
            .collect::<Vec<_>>();
        let n_polar = rng.gen_range(1..=2);
        for _ in 0..n_polar {
            let pos = rng.gen_range(0..=words.len());
            words.insert(pos, polar[rng.gen_range(0..polar.len())]);
        }

        sentences.push(words.join(" "));
        labels.push(label);
    }

    LabeledSentences::new(sentences, Array1::from(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn corpus_is_balanced_and_polar() {
        let mut rng = SmallRng::seed_from_u64(42);
        let corpus = sentiment_corpus(50, 6, &mut rng);

        assert_eq!(corpus.len(), 50);
        assert_eq!(corpus.class_distribution().get(&0), Some(&25));
        for (sentence, label) in corpus.sentences().iter().zip(corpus.labels()) {
            let vocab = if *label == 1 { POSITIVE } else { NEGATIVE };
            assert!(sentence.split(' ').any(|w| vocab.contains(&w)));
        }
    }
}
