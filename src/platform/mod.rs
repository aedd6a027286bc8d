// Integration points for the external hand landmark detector

pub mod landmark_source;

pub use landmark_source::{ChannelSource, LandmarkSource, ReplaySource, SourceError, SourceResult};
