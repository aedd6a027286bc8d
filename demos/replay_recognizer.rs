/// Replay a recorded landmark session through the live recognizer
/// Run with: cargo run --example replay_recognizer -- <data_dir> <recording.json>

use anyhow::{bail, Context};
use gesture_engine::platform::ReplaySource;
use gesture_engine::{init_logging, load_examples, GestureRecognizer, KnnClassifier, Prediction, TrainerConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!("usage: replay_recognizer <data_dir> <recording.json>");
    }

    // Saved k, labels and confidence threshold apply; the data dir comes from the command line
    let mut config = TrainerConfig::load().context("failed to load configuration")?;
    config.data_dir = PathBuf::from(&args[1]);
    let recording = PathBuf::from(&args[2]);

    let mut classifier = KnnClassifier::new();
    let report = load_examples(&config.data_dir, &config.labels, config.feature_length(), &mut classifier);
    println!("Loaded {} examples ({} labels missing)\n", report.total(), report.missing.len());

    let source = ReplaySource::from_file(&recording)
        .await
        .with_context(|| format!("failed to read {}", recording.display()))?;

    let recognizer = GestureRecognizer::from_config(classifier, &config);
    let (mut predictions, handle) = recognizer.spawn(source, config.prediction_buffer);

    while let Some(frame) = predictions.recv().await {
        match &frame.prediction {
            Prediction::NoHand => println!("[{:>6}] ...", frame.timestamp),
            Prediction::NoPrediction => println!("[{:>6}] no prediction (no examples loaded)", frame.timestamp),
            Prediction::Gesture { label, distances } => {
                let nearest = distances
                    .iter()
                    .find(|d| &d.label == label)
                    .map(|d| d.average_distance)
                    .unwrap_or_default();
                println!("[{:>6}] {} (avg distance {:.3})", frame.timestamp, label, nearest);
            }
        }
    }

    let stats = handle.await??;
    println!(
        "\n✓ {} frames, {} with a hand, {} gestures, {} skipped",
        stats.frames, stats.frames_with_hand, stats.gestures, stats.skipped
    );

    Ok(())
}
