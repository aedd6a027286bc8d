// Data models for hand landmarks and gesture classification

pub mod gesture;
pub mod landmark;
