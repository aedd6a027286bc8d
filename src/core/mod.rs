pub mod config;
pub mod feature_extractor;
pub mod knn;
pub mod evaluation;

// Example persistence and the capture (trainer) workflow
pub mod example_store;
pub mod capture;

// Live recognition over detector frames
pub mod recognizer;
