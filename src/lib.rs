//! Hand gesture classification over MediaPipe hand landmarks.
//!
//! A detector outside this crate turns video frames into 21-point hand
//! landmark sequences. This crate flattens them into feature vectors, keeps a
//! labeled training set, and classifies live poses with a k-nearest-neighbor
//! vote.

pub mod core;
pub mod models;
pub mod platform;

pub use crate::core::capture::{CaptureError, CaptureSession};
pub use crate::core::config::{ConfigError, TrainerConfig};
pub use crate::core::evaluation::{evaluate_held_out, EvaluationError, LabeledVectors};
pub use crate::core::example_store::{load_examples, ExampleStoreError, LoadReport};
pub use crate::core::feature_extractor::{euclidean_distance, extract};
pub use crate::core::knn::{ClassifierError, KnnClassifier, DEFAULT_K};
pub use crate::core::recognizer::{GestureRecognizer, RecognitionStats, RecognizedFrame, RecognizerError};
pub use crate::models::gesture::{
    ClassificationResult, EvaluationReport, FeatureVector, Label, LabelDistance, LabelScore, Prediction,
};
pub use crate::models::landmark::{Frame, HandLandmark, HandPose, Landmark, LandmarkSequence};

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber for binaries and demos.
///
/// Honors `RUST_LOG`; defaults to `info`. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
