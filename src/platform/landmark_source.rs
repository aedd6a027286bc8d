// Landmark source abstraction over the external hand detector
// The detector (MediaPipe HandLandmarker or similar) lives outside this crate;
// it only has to hand over one frame of landmarks at a time.

use crate::models::landmark::Frame;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid recording: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Detector disconnected: {0}")]
    Disconnected(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Producer of detector frames.
///
/// The recognizer only asks for the next frame once it has finished with the
/// previous one. `Ok(None)` ends the stream.
#[async_trait]
pub trait LandmarkSource: Send {
    async fn next_frame(&mut self) -> SourceResult<Option<Frame>>;

    /// Human-readable name for logs
    fn describe(&self) -> String;
}

// ==============================================================================
// Replay (recorded frames)
// ==============================================================================

/// Plays back a fixed list of frames, e.g. a JSON recording of a session
pub struct ReplaySource {
    frames: VecDeque<Frame>,
    name: String,
}

impl ReplaySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            name: "replay".to_string(),
        }
    }

    /// Parse a recording: a JSON array of frames
    pub fn from_json(json: &str) -> SourceResult<Self> {
        let frames: Vec<Frame> = serde_json::from_str(json)?;
        Ok(Self::new(frames))
    }

    pub async fn from_file(path: &Path) -> SourceResult<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let mut source = Self::from_json(&contents)?;
        source.name = format!("replay:{}", path.display());
        Ok(source)
    }

    /// Frames not yet delivered
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl LandmarkSource for ReplaySource {
    async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

// ==============================================================================
// Channel (live detector pushing frames)
// ==============================================================================

/// Receives frames pushed by a detector running on another task
pub struct ChannelSource {
    rx: mpsc::Receiver<Frame>,
}

impl ChannelSource {
    /// Create a source plus the sender the detector pushes frames into
    pub fn new(capacity: usize) -> (mpsc::Sender<Frame>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

#[async_trait]
impl LandmarkSource for ChannelSource {
    async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        // All senders dropped means the detector has stopped
        Ok(self.rx.recv().await)
    }

    fn describe(&self) -> String {
        "channel".to_string()
    }
}
