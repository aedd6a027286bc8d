/// Load saved gesture examples and report classifier accuracy
/// Run with: cargo run --example evaluate_examples -- [data_dir]

use anyhow::Context;
use gesture_engine::core::evaluation::{evaluate_held_out, LabeledVectors};
use gesture_engine::{init_logging, load_examples, KnnClassifier, TrainerConfig};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    init_logging();

    // Saved settings (~/.gesture_data/config/settings.json), created on first run
    let mut config = TrainerConfig::load().context("failed to load configuration")?;
    if let Some(dir) = std::env::args().nth(1) {
        config.data_dir = PathBuf::from(dir);
    }

    println!("=== Loading examples from {} ===\n", config.data_dir.display());

    let mut classifier = KnnClassifier::new();
    let report = load_examples(&config.data_dir, &config.labels, config.feature_length(), &mut classifier);

    for (label, count) in &report.loaded {
        println!("  {:<10} {} examples", label, count);
    }
    for missing in &report.missing {
        println!("  ✗ {}: {}", missing.label, missing.reason);
    }

    if classifier.is_empty() {
        println!("\nNo examples found, nothing to evaluate");
        return Ok(());
    }

    let data: LabeledVectors = config
        .labels
        .iter()
        .map(|label| (label.clone(), classifier.examples_for(label).cloned().collect()))
        .collect();

    // Same data for training and testing, as the trainer screen does
    println!("\n=== Training-set accuracy (k = {}) ===\n", config.k);
    let report = classifier.evaluate(&data, config.k)?;
    print!("{}", report);

    println!("\n=== Held-out accuracy (every 5th example, k = {}) ===\n", config.k);
    match evaluate_held_out(&data, 5, config.k) {
        Ok(report) => print!("{}", report),
        Err(e) => println!("✗ Held-out evaluation unavailable: {}", e),
    }

    Ok(())
}
