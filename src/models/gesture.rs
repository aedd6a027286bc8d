// Data models for gesture classification: feature vectors, results and reports

use crate::models::landmark::{Landmark, LandmarkSequence};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gesture class identifier, e.g. "rock" or "call_me"
pub type Label = String;

// ==============================================================================
// Feature Vector
// ==============================================================================

/// Flattened landmark coordinates: [x0, y0, z0, x1, y1, z1, ...]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Rebuild the landmark sequence this vector was flattened from.
    ///
    /// Returns `None` when the length is not a multiple of three.
    pub fn to_landmarks(&self) -> Option<LandmarkSequence> {
        if self.0.len() % 3 != 0 {
            return None;
        }

        Some(
            self.0
                .chunks_exact(3)
                .map(|c| Landmark::new(c[0], c[1], c[2]))
                .collect(),
        )
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl From<&[f32]> for FeatureVector {
    fn from(values: &[f32]) -> Self {
        Self(values.to_vec())
    }
}

// ==============================================================================
// Classification
// ==============================================================================

/// Mean distance from a query to every stored example of one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDistance {
    pub label: Label,
    pub average_distance: f64,
}

/// Winning label plus the per-label distance diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub distances: Vec<LabelDistance>,
}

impl ClassificationResult {
    /// Average distance to the winning label's examples
    pub fn winning_distance(&self) -> Option<f64> {
        self.distances
            .iter()
            .find(|d| d.label == self.label)
            .map(|d| d.average_distance)
    }
}

/// Outcome of recognizing a single frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prediction {
    /// The detector found no hand in the frame
    NoHand,
    /// A hand was present but there is nothing to compare it against
    NoPrediction,
    Gesture {
        label: Label,
        distances: Vec<LabelDistance>,
    },
}

impl Prediction {
    pub fn label(&self) -> Option<&str> {
        match self {
            Prediction::Gesture { label, .. } => Some(label.as_str()),
            _ => None,
        }
    }
}

// ==============================================================================
// Evaluation
// ==============================================================================

/// Accuracy for a single label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: Label,
    pub correct: usize,
    pub total: usize,
    pub percent: f64, // One decimal place
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64, // Percentage, two decimal places
    pub label_scores: Vec<LabelScore>,
}

impl EvaluationReport {
    pub fn score_for(&self, label: &str) -> Option<&LabelScore> {
        self.label_scores.iter().find(|s| s.label == label)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.2}% ({}/{})", self.accuracy, self.correct, self.total)?;
        for score in &self.label_scores {
            writeln!(
                f,
                "  {}: {}/{} correct {:>8.1}%",
                score.label.replace('_', " "),
                score.correct,
                score.total,
                score.percent
            )?;
        }
        Ok(())
    }
}

/// Percentage of `part` in `whole`, rounded to `decimals` places. Zero when `whole` is zero.
pub fn percentage(part: usize, whole: usize, decimals: i32) -> f64 {
    if whole == 0 {
        return 0.0;
    }

    let scale = 10f64.powi(decimals);
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * scale).round() / scale
}
