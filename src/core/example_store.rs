// Example store - per-label JSON example files on disk
//
// Each `<label>.json` holds an array of captured hands, each an array of
// `{x, y, z}` objects in landmark order.

use crate::core::feature_extractor::extract;
use crate::core::knn::KnnClassifier;
use crate::models::gesture::Label;
use crate::models::landmark::LandmarkSequence;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExampleStoreError {
    #[error("Missing example data for {label}: {reason}")]
    MissingExampleData { label: Label, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExampleStoreResult<T> = Result<T, ExampleStoreError>;

/// A label whose examples could not be loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingLabel {
    pub label: Label,
    pub reason: String,
}

/// Outcome of loading a label vocabulary from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Examples learned per label, in configuration order (zero for missing labels)
    pub loaded: Vec<(Label, usize)>,
    pub missing: Vec<MissingLabel>,
}

impl LoadReport {
    pub fn count_for(&self, label: &str) -> Option<usize> {
        self.loaded.iter().find(|(l, _)| l == label).map(|(_, n)| *n)
    }

    pub fn total(&self) -> usize {
        self.loaded.iter().map(|(_, n)| n).sum()
    }

    pub fn is_missing(&self, label: &str) -> bool {
        self.missing.iter().any(|m| m.label == label)
    }
}

/// Location of a label's example file
pub fn example_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{}.json", label))
}

/// Read one label's captured hands.
///
/// An absent or unparsable file is reported as `MissingExampleData`.
pub fn read_label(dir: &Path, label: &str) -> ExampleStoreResult<Vec<LandmarkSequence>> {
    let path = example_path(dir, label);
    let missing = |reason: String| ExampleStoreError::MissingExampleData {
        label: label.to_string(),
        reason,
    };

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| missing(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&contents).map_err(|e| missing(format!("{}: {}", path.display(), e)))
}

/// Learn already-parsed example data for one label.
///
/// Returns the number of examples learned.
pub fn load_label_value(
    label: &str,
    value: serde_json::Value,
    feature_length: usize,
    classifier: &mut KnnClassifier,
) -> ExampleStoreResult<usize> {
    let sequences: Vec<LandmarkSequence> =
        serde_json::from_value(value).map_err(|e| ExampleStoreError::MissingExampleData {
            label: label.to_string(),
            reason: e.to_string(),
        })?;

    learn_sequences(label, &sequences, feature_length, classifier)
}

/// Check that every sequence flattens to exactly `feature_length` values.
///
/// The length comes from configuration, never from whichever file happened
/// to load first.
pub fn validate_sequences(
    label: &str,
    sequences: &[LandmarkSequence],
    feature_length: usize,
) -> ExampleStoreResult<()> {
    for (position, sequence) in sequences.iter().enumerate() {
        let length = sequence.len() * 3;
        if length == 0 || length != feature_length {
            return Err(ExampleStoreError::MissingExampleData {
                label: label.to_string(),
                reason: format!(
                    "example {} has {} landmarks, expected {}",
                    position,
                    sequence.len(),
                    feature_length / 3
                ),
            });
        }
    }
    Ok(())
}

/// Learn every sequence under `label`, or none of them.
pub fn learn_sequences(
    label: &str,
    sequences: &[LandmarkSequence],
    feature_length: usize,
    classifier: &mut KnnClassifier,
) -> ExampleStoreResult<usize> {
    validate_sequences(label, sequences, feature_length)?;

    // Sequences share one length, so only the first learn can be rejected
    for sequence in sequences {
        classifier
            .learn(extract(sequence), label)
            .map_err(|e| ExampleStoreError::MissingExampleData {
                label: label.to_string(),
                reason: e.to_string(),
            })?;
    }

    Ok(sequences.len())
}

/// Load the example file of every configured label into `classifier`.
///
/// Every example must flatten to `feature_length` values. A label whose file
/// is missing, malformed or of the wrong hand size starts with zero examples;
/// a warning is logged and the remaining labels still load.
pub fn load_examples(
    dir: &Path,
    labels: &[Label],
    feature_length: usize,
    classifier: &mut KnnClassifier,
) -> LoadReport {
    let mut report = LoadReport::default();

    for label in labels {
        let result = read_label(dir, label)
            .and_then(|sequences| learn_sequences(label, &sequences, feature_length, classifier));

        match result {
            Ok(count) => report.loaded.push((label.clone(), count)),
            Err(e) => {
                warn!(label = %label, error = %e, "Example data not loaded");
                report.loaded.push((label.clone(), 0));
                report.missing.push(MissingLabel {
                    label: label.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        dir = %dir.display(),
        examples = report.total(),
        missing = report.missing.len(),
        "Loaded gesture examples"
    );
    report
}

/// Serialize captured hands into the persisted example form
pub fn export_label(sequences: &[LandmarkSequence]) -> ExampleStoreResult<String> {
    Ok(serde_json::to_string_pretty(sequences)?)
}

/// Write a label's example file. Nothing is written for an empty capture.
pub fn save_label(dir: &Path, label: &str, sequences: &[LandmarkSequence]) -> ExampleStoreResult<bool> {
    if sequences.is_empty() {
        return Ok(false);
    }

    std::fs::create_dir_all(dir)?;
    let path = example_path(dir, label);
    std::fs::write(&path, export_label(sequences)?)?;

    info!(label, count = sequences.len(), path = %path.display(), "Saved gesture examples");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knn::ClassifierError;
    use crate::models::landmark::{Landmark, HAND_LANDMARK_COUNT};
    use serde_json::json;
    use tempfile::tempdir;

    const HAND_FEATURES: usize = HAND_LANDMARK_COUNT * 3;

    fn create_test_hand(offset: f32) -> LandmarkSequence {
        (0..HAND_LANDMARK_COUNT)
            .map(|i| Landmark::new(offset + i as f32 * 0.01, offset, -0.02))
            .collect()
    }

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_missing_file_leaves_label_empty() {
        let dir = tempdir().unwrap();
        save_label(dir.path(), "rock", &[create_test_hand(0.1), create_test_hand(0.12)]).unwrap();
        save_label(dir.path(), "loser", &[create_test_hand(0.6)]).unwrap();

        let mut knn = KnnClassifier::new();
        let report = load_examples(dir.path(), &labels(&["rock", "call_me", "loser"]), HAND_FEATURES, &mut knn);

        assert_eq!(report.count_for("rock"), Some(2));
        assert_eq!(report.count_for("call_me"), Some(0));
        assert_eq!(report.count_for("loser"), Some(1));
        assert!(report.is_missing("call_me"));
        assert_eq!(report.missing.len(), 1);

        assert_eq!(knn.count_for("rock"), 2);
        assert_eq!(knn.count_for("call_me"), 0);
        assert_eq!(knn.count_for("loser"), 1);
    }

    #[test]
    fn test_malformed_file_does_not_abort_loading() {
        let dir = tempdir().unwrap();
        std::fs::write(example_path(dir.path(), "good_job"), "{ not json").unwrap();
        save_label(dir.path(), "rock", &[create_test_hand(0.1)]).unwrap();

        let mut knn = KnnClassifier::new();
        let report = load_examples(dir.path(), &labels(&["good_job", "rock"]), HAND_FEATURES, &mut knn);

        assert!(report.is_missing("good_job"));
        assert_eq!(report.count_for("rock"), Some(1));
        assert_eq!(knn.len(), 1);
    }

    #[test]
    fn test_mismatched_file_is_not_half_loaded() {
        let dir = tempdir().unwrap();
        save_label(dir.path(), "rock", &[create_test_hand(0.1)]).unwrap();
        let short = vec![Landmark::new(0.1, 0.1, 0.1)];
        save_label(dir.path(), "loser", &[create_test_hand(0.5), short]).unwrap();

        let mut knn = KnnClassifier::new();
        let report = load_examples(dir.path(), &labels(&["rock", "loser"]), HAND_FEATURES, &mut knn);

        assert!(report.is_missing("loser"));
        assert_eq!(knn.count_for("loser"), 0);
        assert_eq!(knn.count_for("rock"), 1);
    }

    #[test]
    fn test_truncated_first_file_does_not_block_later_labels() {
        let dir = tempdir().unwrap();
        let truncated = vec![Landmark::new(0.1, 0.1, 0.0), Landmark::new(0.2, 0.2, 0.0)];
        save_label(dir.path(), "good_luck", &[truncated]).unwrap();
        for (i, label) in ["good_job", "loser", "call_me", "rock"].iter().enumerate() {
            save_label(dir.path(), label, &[create_test_hand(0.2 * i as f32)]).unwrap();
        }

        let mut knn = KnnClassifier::new();
        let all = labels(&["good_luck", "good_job", "loser", "call_me", "rock"]);
        let report = load_examples(dir.path(), &all, HAND_FEATURES, &mut knn);

        assert_eq!(report.missing.len(), 1);
        assert!(report.is_missing("good_luck"));
        assert_eq!(report.count_for("good_luck"), Some(0));
        assert_eq!(report.count_for("rock"), Some(1));
        assert_eq!(report.total(), 4);
        assert_eq!(knn.dimension(), Some(HAND_FEATURES));
        assert_eq!(knn.count_for("good_luck"), 0);
    }

    #[test]
    fn test_validate_sequences() {
        let hand = create_test_hand(0.1);
        assert!(validate_sequences("rock", &[hand.clone()], HAND_FEATURES).is_ok());
        assert!(validate_sequences("rock", &[], HAND_FEATURES).is_ok());
        assert!(validate_sequences("rock", &[hand.clone(), hand[..20].to_vec()], HAND_FEATURES).is_err());
        assert!(validate_sequences("rock", &[Vec::new()], 0).is_err());
    }

    #[test]
    fn test_load_label_value() {
        let value = json!([
            [{"x": 0.0, "y": 0.0, "z": 0.0}],
            [{"x": 0.0, "y": 0.0, "z": 1.0}]
        ]);

        let mut knn = KnnClassifier::new();
        assert_eq!(load_label_value("A", value, 3, &mut knn).unwrap(), 2);
        assert_eq!(knn.dimension(), Some(3));

        let bad = json!({"not": "a list"});
        let err = load_label_value("B", bad, 3, &mut knn).unwrap_err();
        assert!(matches!(err, ExampleStoreError::MissingExampleData { ref label, .. } if label == "B"));
    }

    #[test]
    fn test_export_matches_persisted_form() {
        let hand = vec![Landmark::new(0.5, 0.25, -0.125)];
        let json = export_label(&[hand.clone()]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, json!([[{"x": 0.5, "y": 0.25, "z": -0.125}]]));

        let parsed: Vec<LandmarkSequence> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![hand]);
    }

    #[test]
    fn test_save_skips_empty_capture() {
        let dir = tempdir().unwrap();
        assert!(!save_label(dir.path(), "rock", &[]).unwrap());
        assert!(!example_path(dir.path(), "rock").exists());
    }

    #[test]
    fn test_saved_examples_classify() {
        let dir = tempdir().unwrap();
        save_label(dir.path(), "rock", &[create_test_hand(0.1)]).unwrap();
        save_label(dir.path(), "loser", &[create_test_hand(0.8)]).unwrap();

        let mut knn = KnnClassifier::new();
        load_examples(dir.path(), &labels(&["rock", "loser"]), HAND_FEATURES, &mut knn);

        let probe = extract(&create_test_hand(0.15));
        assert_eq!(knn.classify(&probe, 1).unwrap(), "rock");
        assert_eq!(
            knn.classify(&extract(&[Landmark::default()]), 1),
            Err(ClassifierError::DimensionMismatch { expected: 63, actual: 3 })
        );
    }
}
