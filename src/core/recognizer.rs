// Live gesture recognition over a stream of detector frames

use crate::core::config::TrainerConfig;
use crate::core::feature_extractor::extract;
use crate::core::knn::{ClassifierError, ClassifierResult, KnnClassifier};
use crate::models::gesture::{FeatureVector, Prediction};
use crate::models::landmark::{Frame, Landmark};
use crate::platform::landmark_source::{LandmarkSource, SourceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub type RecognizerResult<T> = Result<T, RecognizerError>;

/// Prediction for one processed frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedFrame {
    pub session_id: String,
    pub timestamp: i64, // Detector timestamp (ms)
    pub recognized_at: DateTime<Utc>,
    pub prediction: Prediction,
    pub processing_time_us: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionStats {
    pub session_id: String,
    pub frames: u64,
    pub frames_with_hand: u64,
    pub gestures: u64,
    pub no_prediction: u64,
    pub skipped: u64, // Frames rejected by the classifier (dimension mismatch)
}

/// Classifies live frames against a training set shared with `learn` calls.
///
/// The training set sits behind an async `RwLock`: classification holds the
/// read lock, `learn` the write lock, so a frame never sees a half-appended
/// label.
#[derive(Clone)]
pub struct GestureRecognizer {
    classifier: Arc<RwLock<KnnClassifier>>,
    k: usize,
    min_hand_confidence: f32,
    feature_length: Option<usize>, // Enforced hand size, when configured
}

impl GestureRecognizer {
    pub fn new(classifier: KnnClassifier, k: usize) -> Self {
        Self {
            classifier: Arc::new(RwLock::new(classifier)),
            k,
            min_hand_confidence: 0.0,
            feature_length: None,
        }
    }

    pub fn from_config(classifier: KnnClassifier, config: &TrainerConfig) -> Self {
        Self {
            min_hand_confidence: config.min_hand_confidence,
            feature_length: Some(config.feature_length()),
            ..Self::new(classifier, config.k)
        }
    }

    /// Handle to the shared training set
    pub fn classifier(&self) -> Arc<RwLock<KnnClassifier>> {
        self.classifier.clone()
    }

    pub async fn learn(&self, vector: FeatureVector, label: &str) -> ClassifierResult<()> {
        self.classifier.write().await.learn(vector, label)
    }

    pub async fn learn_landmarks(&self, landmarks: &[Landmark], label: &str) -> ClassifierResult<()> {
        self.learn(extract(landmarks), label).await
    }

    /// Swap in a freshly trained classifier
    pub async fn replace_classifier(&self, classifier: KnnClassifier) {
        *self.classifier.write().await = classifier;
    }

    /// Classify the primary hand of `frame`.
    ///
    /// An empty training set yields `Prediction::NoPrediction`. A hand of the
    /// wrong size (against the configured landmark count, or the training
    /// data) is an error and the caller should skip the frame.
    pub async fn recognize_frame(&self, frame: &Frame) -> RecognizerResult<Prediction> {
        let hand = match frame.primary_hand() {
            Some(hand) if !hand.landmarks.is_empty() => hand,
            _ => return Ok(Prediction::NoHand),
        };

        if let Some(confidence) = hand.confidence {
            if confidence < self.min_hand_confidence {
                debug!(confidence, "Ignoring low-confidence hand");
                return Ok(Prediction::NoHand);
            }
        }

        let vector = extract(&hand.landmarks);
        if let Some(expected) = self.feature_length {
            if vector.len() != expected {
                return Err(ClassifierError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                }
                .into());
            }
        }

        let classifier = self.classifier.read().await;

        match classifier.predict(&vector, self.k) {
            Ok(result) => Ok(Prediction::Gesture {
                label: result.label,
                distances: result.distances,
            }),
            Err(ClassifierError::EmptyTrainingSet) => Ok(Prediction::NoPrediction),
            Err(e) => Err(e.into()),
        }
    }

    /// Pull frames from `source` until it ends or `tx` is closed.
    ///
    /// The next frame is requested only after the previous one has been
    /// classified and sent.
    pub async fn run<S>(&self, mut source: S, tx: mpsc::Sender<RecognizedFrame>) -> RecognizerResult<RecognitionStats>
    where
        S: LandmarkSource,
    {
        let session_id = Uuid::new_v4().to_string();
        let mut stats = RecognitionStats {
            session_id: session_id.clone(),
            ..Default::default()
        };

        info!(session_id = %session_id, source = %source.describe(), "Started gesture recognition");

        while let Some(frame) = source.next_frame().await? {
            stats.frames += 1;
            let started = Instant::now();

            let prediction = match self.recognize_frame(&frame).await {
                Ok(prediction) => prediction,
                Err(RecognizerError::Classifier(e)) => {
                    // Only a present hand can be rejected by the classifier
                    warn!(timestamp = frame.timestamp, error = %e, "Skipping frame");
                    stats.frames_with_hand += 1;
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match &prediction {
                Prediction::NoHand => {}
                Prediction::NoPrediction => {
                    stats.frames_with_hand += 1;
                    stats.no_prediction += 1;
                }
                Prediction::Gesture { .. } => {
                    stats.frames_with_hand += 1;
                    stats.gestures += 1;
                }
            }

            let recognized = RecognizedFrame {
                session_id: session_id.clone(),
                timestamp: frame.timestamp,
                recognized_at: Utc::now(),
                prediction,
                processing_time_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            };

            if tx.send(recognized).await.is_err() {
                debug!(session_id = %session_id, "Prediction receiver dropped");
                break;
            }
        }

        info!(
            session_id = %session_id,
            frames = stats.frames,
            gestures = stats.gestures,
            skipped = stats.skipped,
            "Stopped gesture recognition"
        );
        Ok(stats)
    }

    /// Run the recognition loop on a background task
    pub fn spawn<S>(
        &self,
        source: S,
        buffer: usize,
    ) -> (mpsc::Receiver<RecognizedFrame>, JoinHandle<RecognizerResult<RecognitionStats>>)
    where
        S: LandmarkSource + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer);
        let recognizer = self.clone();
        let handle = tokio::spawn(async move { recognizer.run(source, tx).await });
        (rx, handle)
    }
}
