// Accuracy evaluation for the gesture classifier
//
// `evaluate` scores whatever test set it is handed. Callers in this crate pass
// the training data itself, so reported accuracy is optimistic: every vector's
// own copy is among its neighbors. `evaluate_held_out` is the opt-in mode that
// keeps test samples out of the training set.

use crate::core::knn::{ClassifierError, KnnClassifier};
use crate::models::gesture::{percentage, EvaluationReport, FeatureVector, Label, LabelScore};
use thiserror::Error;
use tracing::info;

/// Label-ordered samples, e.g. everything captured in a session
pub type LabeledVectors = Vec<(Label, Vec<FeatureVector>)>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Holdout interval must be at least 2, got {0}")]
    InvalidHoldout(usize),
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Classify every test vector and compare against its ground-truth label
pub fn evaluate(
    classifier: &KnnClassifier,
    test_set: &[(Label, Vec<FeatureVector>)],
    k: usize,
) -> EvaluationResult<EvaluationReport> {
    let mut correct = 0;
    let mut total = 0;
    let mut label_scores = Vec::with_capacity(test_set.len());

    for (label, samples) in test_set {
        let mut label_correct = 0;
        for sample in samples {
            let prediction = classifier.classify(sample, k)?;
            if prediction == *label {
                label_correct += 1;
            }
        }

        correct += label_correct;
        total += samples.len();
        label_scores.push(LabelScore {
            label: label.clone(),
            correct: label_correct,
            total: samples.len(),
            percent: percentage(label_correct, samples.len(), 1),
        });
    }

    let report = EvaluationReport {
        correct,
        total,
        accuracy: percentage(correct, total, 2),
        label_scores,
    };

    info!(
        correct = report.correct,
        total = report.total,
        accuracy = report.accuracy,
        "Evaluation finished"
    );
    Ok(report)
}

/// Train on all but every `holdout_every`-th sample of each label, then
/// evaluate on the held-out samples only.
pub fn evaluate_held_out(
    data: &[(Label, Vec<FeatureVector>)],
    holdout_every: usize,
    k: usize,
) -> EvaluationResult<EvaluationReport> {
    if holdout_every < 2 {
        return Err(EvaluationError::InvalidHoldout(holdout_every));
    }

    let mut classifier = KnnClassifier::new();
    let mut test_set: LabeledVectors = Vec::with_capacity(data.len());

    for (label, samples) in data {
        let mut held_out = Vec::new();
        for (position, sample) in samples.iter().enumerate() {
            if (position + 1) % holdout_every == 0 {
                held_out.push(sample.clone());
            } else {
                classifier.learn(sample.clone(), label)?;
            }
        }
        test_set.push((label.clone(), held_out));
    }

    evaluate(&classifier, &test_set, k)
}
