// k-nearest-neighbor gesture classifier over flattened landmark vectors

use crate::core::evaluation::{self, EvaluationResult};
use crate::core::feature_extractor::{euclidean_distance, extract};
use crate::models::gesture::{
    ClassificationResult, EvaluationReport, FeatureVector, Label, LabelDistance,
};
use crate::models::landmark::Landmark;
use thiserror::Error;
use tracing::debug;

/// Neighbors consulted per vote unless configured otherwise
pub const DEFAULT_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("Dimension mismatch: training data has {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Feature vector is empty")]
    EmptyVector,

    #[error("k must be at least 1")]
    InvalidK,
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// A stored example; `label` indexes into `KnnClassifier::labels`
#[derive(Debug, Clone)]
struct TrainingExample {
    label: usize,
    features: FeatureVector,
}

/// Training set plus the nearest-neighbor vote over it.
///
/// Examples are kept in global insertion order, which is what breaks ties
/// between equally distant neighbors. Labels are kept in the order they were
/// first learned.
#[derive(Debug, Clone, Default)]
pub struct KnnClassifier {
    labels: Vec<Label>,
    examples: Vec<TrainingExample>,
    dimension: Option<usize>,
}

impl KnnClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `vector` under `label`, creating the label on first use.
    ///
    /// The first vector fixes the dimension of the training set.
    pub fn learn(&mut self, vector: FeatureVector, label: &str) -> ClassifierResult<()> {
        if vector.is_empty() {
            return Err(ClassifierError::EmptyVector);
        }
        if let Some(expected) = self.dimension {
            if vector.len() != expected {
                return Err(ClassifierError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let label_index = match self.label_index(label) {
            Some(index) => index,
            None => {
                debug!(label, "Adding new gesture label");
                self.labels.push(label.to_string());
                self.labels.len() - 1
            }
        };

        self.dimension = Some(vector.len());
        self.examples.push(TrainingExample {
            label: label_index,
            features: vector,
        });
        Ok(())
    }

    /// Extract and learn a raw landmark sequence
    pub fn learn_landmarks(&mut self, landmarks: &[Landmark], label: &str) -> ClassifierResult<()> {
        self.learn(extract(landmarks), label)
    }

    /// Majority label among the `k` nearest stored examples.
    ///
    /// When fewer than `k` examples exist all of them vote. Tied labels are
    /// resolved in favour of the one whose nearest example comes first in the
    /// distance ordering.
    pub fn classify(&self, vector: &FeatureVector, k: usize) -> ClassifierResult<Label> {
        if k == 0 {
            return Err(ClassifierError::InvalidK);
        }

        let neighbors = self.sorted_neighbors(vector)?;

        // (label, votes) in order of first appearance among the neighbors
        let mut tally: Vec<(usize, usize)> = Vec::new();
        for &(label, _) in neighbors.iter().take(k) {
            match tally.iter_mut().find(|(l, _)| *l == label) {
                Some(entry) => entry.1 += 1,
                None => tally.push((label, 1)),
            }
        }

        let mut winner = tally[0];
        for &candidate in &tally[1..] {
            if candidate.1 > winner.1 {
                winner = candidate;
            }
        }

        Ok(self.labels[winner.0].clone())
    }

    /// Classify and attach the per-label distance diagnostics
    pub fn predict(&self, vector: &FeatureVector, k: usize) -> ClassifierResult<ClassificationResult> {
        let label = self.classify(vector, k)?;
        let distances = self.average_distance_per_label(vector)?;
        Ok(ClassificationResult { label, distances })
    }

    /// Mean distance from `vector` to every stored example of each label.
    ///
    /// Covers all examples, not only the nearest ones. Labels are returned in
    /// the order they were first learned.
    pub fn average_distance_per_label(&self, vector: &FeatureVector) -> ClassifierResult<Vec<LabelDistance>> {
        self.check_query(vector)?;

        let mut sums = vec![(0.0f64, 0usize); self.labels.len()];
        for example in &self.examples {
            let entry = &mut sums[example.label];
            entry.0 += euclidean_distance(vector.as_slice(), example.features.as_slice());
            entry.1 += 1;
        }

        Ok(self
            .labels
            .iter()
            .zip(sums)
            .map(|(label, (sum, count))| LabelDistance {
                label: label.clone(),
                average_distance: sum / count as f64,
            })
            .collect())
    }

    /// Score this classifier against a labeled test set (see `core::evaluation`)
    pub fn evaluate(
        &self,
        test_set: &[(Label, Vec<FeatureVector>)],
        k: usize,
    ) -> EvaluationResult<EvaluationReport> {
        evaluation::evaluate(self, test_set, k)
    }

    /// Number of stored examples across all labels
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Length shared by every stored vector, once anything has been learned
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Labels in the order they were first learned
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Stored vectors of one label in capture order
    pub fn examples_for<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a FeatureVector> + 'a {
        let index = self.label_index(label);
        self.examples
            .iter()
            .filter(move |e| Some(e.label) == index)
            .map(|e| &e.features)
    }

    pub fn count_for(&self, label: &str) -> usize {
        self.examples_for(label).count()
    }

    /// Drop every stored example and label
    pub fn clear(&mut self) {
        self.labels.clear();
        self.examples.clear();
        self.dimension = None;
    }

    fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    fn check_query(&self, vector: &FeatureVector) -> ClassifierResult<()> {
        let expected = self.dimension.ok_or(ClassifierError::EmptyTrainingSet)?;
        if vector.len() != expected {
            return Err(ClassifierError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// (label, distance) for every example, nearest first, stable on ties
    fn sorted_neighbors(&self, vector: &FeatureVector) -> ClassifierResult<Vec<(usize, f64)>> {
        self.check_query(vector)?;

        let mut neighbors: Vec<(usize, f64)> = self
            .examples
            .iter()
            .map(|e| (e.label, euclidean_distance(vector.as_slice(), e.features.as_slice())))
            .collect();

        neighbors.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(neighbors)
    }
}
