// Data models for hand landmark frames delivered by the external detector

use serde::{Deserialize, Serialize};

/// Number of landmarks the MediaPipe hand model produces per hand
pub const HAND_LANDMARK_COUNT: usize = 21;

// ==============================================================================
// Landmark
// ==============================================================================

/// A single tracked point on a hand
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // Normalized [0, 1] relative to frame width
    pub y: f32, // Normalized [0, 1] relative to frame height
    pub z: f32, // Depth relative to the wrist
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmarks for one detected hand; position encodes identity
pub type LandmarkSequence = Vec<Landmark>;

/// MediaPipe Hand Landmark indices (21 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    /// Position of this point inside a landmark sequence
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up this point in a sequence, if the sequence is long enough
    pub fn get(self, sequence: &[Landmark]) -> Option<&Landmark> {
        sequence.get(self.index())
    }
}

// ==============================================================================
// Detector output
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    pub landmarks: LandmarkSequence,
    #[serde(default)]
    pub handedness: Option<Handedness>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl HandPose {
    pub fn new(landmarks: LandmarkSequence) -> Self {
        Self {
            landmarks,
            handedness: None,
            confidence: None,
        }
    }
}

/// Detector result for a single video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub timestamp: i64, // Milliseconds
    #[serde(default)]
    pub hands: Vec<HandPose>,
}

impl Frame {
    pub fn new(timestamp: i64, hands: Vec<HandPose>) -> Self {
        Self { timestamp, hands }
    }

    /// Frame with no visible hand
    pub fn empty(timestamp: i64) -> Self {
        Self::new(timestamp, Vec::new())
    }

    /// The hand the classifier looks at (the detector runs with numHands = 1)
    pub fn primary_hand(&self) -> Option<&HandPose> {
        self.hands.first()
    }
}
