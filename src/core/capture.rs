// Capture session - collects labeled hand poses for training and export

use crate::core::config::TrainerConfig;
use crate::core::evaluation::{EvaluationError, LabeledVectors};
use crate::core::example_store::{self, ExampleStoreError, LoadReport, MissingLabel};
use crate::core::feature_extractor::extract;
use crate::core::knn::{ClassifierError, KnnClassifier};
use crate::models::gesture::{EvaluationReport, Label};
use crate::models::landmark::{Frame, Landmark, LandmarkSequence};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Unknown label: {0}")]
    UnknownLabel(Label),

    #[error("No hand detected")]
    NoHandDetected,

    #[error("Hand has {actual} landmarks, expected {expected}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Example store error: {0}")]
    Store(#[from] ExampleStoreError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Captured landmark sequences per configured label, in capture order.
///
/// Captures keep the raw landmarks so they can be exported unchanged;
/// flattening only happens when a classifier is trained.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    captures: Vec<(Label, Vec<LandmarkSequence>)>,
    feature_length: usize,
}

impl CaptureSession {
    /// Start an empty session for a fixed label vocabulary and hand size
    pub fn new(labels: &[Label], landmark_count: usize) -> Self {
        Self {
            captures: labels.iter().map(|l| (l.clone(), Vec::new())).collect(),
            feature_length: landmark_count * 3,
        }
    }

    pub fn from_config(config: &TrainerConfig) -> Self {
        Self::new(&config.labels, config.landmark_count)
    }

    /// Append previously saved examples from `dir` to the session.
    ///
    /// Labels without a readable file, or whose hands are not the configured
    /// size, are reported and keep their captures.
    pub fn load_existing(&mut self, dir: &Path) -> LoadReport {
        let mut report = LoadReport::default();
        let feature_length = self.feature_length;

        for (label, samples) in &mut self.captures {
            let loaded = example_store::read_label(dir, label).and_then(|sequences| {
                example_store::validate_sequences(label, &sequences, feature_length)?;
                Ok(sequences)
            });

            match loaded {
                Ok(sequences) => {
                    report.loaded.push((label.clone(), sequences.len()));
                    samples.extend(sequences);
                }
                Err(e) => {
                    warn!(label = %label, error = %e, "No saved examples for label");
                    report.loaded.push((label.clone(), 0));
                    report.missing.push(MissingLabel {
                        label: label.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Store the detected hand under `label`. Returns the label's new sample count.
    pub fn capture(&mut self, label: &str, hand: Option<&[Landmark]>) -> CaptureResult<usize> {
        let samples = self
            .captures
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, samples)| samples)
            .ok_or_else(|| CaptureError::UnknownLabel(label.to_string()))?;

        let hand = match hand {
            Some(hand) if !hand.is_empty() => hand,
            _ => {
                warn!(label, "Capture requested but no hand was found");
                return Err(CaptureError::NoHandDetected);
            }
        };

        if hand.len() * 3 != self.feature_length {
            return Err(CaptureError::LandmarkCount {
                expected: self.feature_length / 3,
                actual: hand.len(),
            });
        }

        samples.push(hand.to_vec());
        info!(label, count = samples.len(), "Captured pose");
        Ok(samples.len())
    }

    /// Capture the primary hand of a detector frame
    pub fn capture_frame(&mut self, label: &str, frame: &Frame) -> CaptureResult<usize> {
        let hand = frame.primary_hand().map(|h| h.landmarks.as_slice());
        self.capture(label, hand)
    }

    pub fn samples(&self, label: &str) -> Option<&[LandmarkSequence]> {
        self.captures
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, samples)| samples.as_slice())
    }

    /// Sample count per label, in configuration order
    pub fn counts(&self) -> Vec<(Label, usize)> {
        self.captures
            .iter()
            .map(|(l, samples)| (l.clone(), samples.len()))
            .collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.captures.iter().map(|(l, _)| l)
    }

    pub fn total(&self) -> usize {
        self.captures.iter().map(|(_, samples)| samples.len()).sum()
    }

    /// A label's captures in the persisted JSON form, `None` when nothing was captured
    pub fn export(&self, label: &str) -> CaptureResult<Option<String>> {
        let samples = self
            .samples(label)
            .ok_or_else(|| CaptureError::UnknownLabel(label.to_string()))?;

        if samples.is_empty() {
            return Ok(None);
        }

        Ok(Some(example_store::export_label(samples)?))
    }

    /// Write every non-empty label to `dir`. Returns the labels written.
    pub fn save(&self, dir: &Path) -> CaptureResult<Vec<Label>> {
        let mut saved = Vec::new();
        for (label, samples) in &self.captures {
            if example_store::save_label(dir, label, samples)? {
                saved.push(label.clone());
            }
        }
        Ok(saved)
    }

    /// Flattened captures, ready to use as a test set
    pub fn feature_sets(&self) -> LabeledVectors {
        self.captures
            .iter()
            .map(|(label, samples)| (label.clone(), samples.iter().map(|s| extract(s)).collect()))
            .collect()
    }

    /// Build a fresh classifier from every capture
    pub fn train(&self) -> CaptureResult<KnnClassifier> {
        let mut classifier = KnnClassifier::new();
        for (label, samples) in &self.captures {
            for sample in samples {
                classifier.learn_landmarks(sample, label)?;
            }
        }

        info!(examples = classifier.len(), "Trained gesture classifier");
        Ok(classifier)
    }

    /// Score `classifier` against the captured data.
    ///
    /// This is the same data `train` uses, so the result is a training-set
    /// accuracy.
    pub fn evaluate(&self, classifier: &KnnClassifier, k: usize) -> CaptureResult<EvaluationReport> {
        Ok(classifier.evaluate(&self.feature_sets(), k)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knn::DEFAULT_K;
    use crate::models::landmark::HandPose;
    use tempfile::tempdir;

    fn labels() -> Vec<Label> {
        vec!["good_job".to_string(), "rock".to_string()]
    }

    const TEST_LANDMARKS: usize = 5;

    fn create_test_hand(offset: f32) -> LandmarkSequence {
        (0..TEST_LANDMARKS).map(|i| Landmark::new(offset, i as f32 * 0.1, 0.0)).collect()
    }

    #[test]
    fn test_capture_appends_in_order() {
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        assert_eq!(session.capture("rock", Some(create_test_hand(0.1).as_slice())).unwrap(), 1);
        assert_eq!(session.capture("rock", Some(create_test_hand(0.2).as_slice())).unwrap(), 2);

        let samples = session.samples("rock").unwrap();
        assert_eq!(samples[0], create_test_hand(0.1));
        assert_eq!(samples[1], create_test_hand(0.2));
        assert_eq!(session.counts(), vec![("good_job".to_string(), 0), ("rock".to_string(), 2)]);
    }

    #[test]
    fn test_capture_without_hand() {
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        assert!(matches!(session.capture("rock", None), Err(CaptureError::NoHandDetected)));
        assert!(matches!(
            session.capture_frame("rock", &Frame::empty(0)),
            Err(CaptureError::NoHandDetected)
        ));
        assert_eq!(session.total(), 0);
    }

    #[test]
    fn test_capture_unknown_label() {
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        let result = session.capture("peace", Some(create_test_hand(0.1).as_slice()));
        assert!(matches!(result, Err(CaptureError::UnknownLabel(ref l)) if l == "peace"));
    }

    #[test]
    fn test_capture_frame_uses_primary_hand() {
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        let frame = Frame::new(
            10,
            vec![HandPose::new(create_test_hand(0.3)), HandPose::new(create_test_hand(0.9))],
        );

        session.capture_frame("good_job", &frame).unwrap();
        assert_eq!(session.samples("good_job").unwrap(), &[create_test_hand(0.3)]);
    }

    #[test]
    fn test_capture_rejects_wrong_hand_size() {
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        let short = create_test_hand(0.1)[..3].to_vec();

        let result = session.capture("rock", Some(short.as_slice()));
        assert!(matches!(result, Err(CaptureError::LandmarkCount { expected: 5, actual: 3 })));
        assert_eq!(session.total(), 0);
    }

    #[test]
    fn test_load_existing_skips_wrong_hand_size() {
        let dir = tempdir().unwrap();
        let short = create_test_hand(0.8)[..2].to_vec();
        example_store::save_label(dir.path(), "good_job", &[short]).unwrap();
        example_store::save_label(dir.path(), "rock", &[create_test_hand(0.1)]).unwrap();

        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        let report = session.load_existing(dir.path());

        assert!(report.is_missing("good_job"));
        assert_eq!(report.count_for("rock"), Some(1));
        assert!(session.samples("good_job").unwrap().is_empty());

        // The bad file must not block training of the other labels
        let classifier = session.train().unwrap();
        assert_eq!(classifier.len(), 1);
        assert_eq!(classifier.count_for("rock"), 1);
    }

    #[test]
    fn test_export_empty_label() {
        let session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        assert!(session.export("rock").unwrap().is_none());
        assert!(matches!(session.export("peace"), Err(CaptureError::UnknownLabel(_))));
    }

    #[test]
    fn test_train_and_evaluate() {
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        for offset in [0.1, 0.11, 0.12] {
            session.capture("rock", Some(create_test_hand(offset).as_slice())).unwrap();
        }
        for offset in [0.8, 0.81, 0.82] {
            session.capture("good_job", Some(create_test_hand(offset).as_slice())).unwrap();
        }

        let classifier = session.train().unwrap();
        assert_eq!(classifier.len(), 6);
        assert_eq!(classifier.labels(), &["good_job".to_string(), "rock".to_string()]);

        let report = session.evaluate(&classifier, DEFAULT_K).unwrap();
        assert_eq!(report.accuracy, 100.0);
        assert_eq!(report.score_for("rock").unwrap().total, 3);
    }

    #[test]
    fn test_evaluate_untrained_classifier() {
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        session.capture("rock", Some(create_test_hand(0.1).as_slice())).unwrap();

        let result = session.evaluate(&KnnClassifier::new(), DEFAULT_K);
        assert!(matches!(
            result,
            Err(CaptureError::Evaluation(EvaluationError::Classifier(ClassifierError::EmptyTrainingSet)))
        ));
    }

    #[test]
    fn test_save_and_load_existing() {
        let dir = tempdir().unwrap();
        let mut session = CaptureSession::new(&labels(), TEST_LANDMARKS);
        session.capture("rock", Some(create_test_hand(0.1).as_slice())).unwrap();

        let saved = session.save(dir.path()).unwrap();
        assert_eq!(saved, vec!["rock".to_string()]);

        let mut reloaded = CaptureSession::new(&labels(), TEST_LANDMARKS);
        let report = reloaded.load_existing(dir.path());
        assert!(report.is_missing("good_job"));
        assert_eq!(report.count_for("rock"), Some(1));
        assert_eq!(reloaded.samples("rock").unwrap(), session.samples("rock").unwrap());
    }
}
