//! Glucast offline trainer CLI
//!
//! Trains a deterministic random forest from a CSV of glucose records and
//! writes the model/vocabulary artifact pair.

use anyhow::{Context, Result};
use clap::Parser;
use glucast_core::{ArtifactStore, MealEncoder};
use glucast_trainer::{Dataset, ForestConfig, ForestTrainer};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "glucast-train")]
#[command(author = "Glucast Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic random-forest trainer for Glucast", long_about = None)]
struct Args {
    /// Input CSV path (rows: hour,day_of_week,meal_type,last_glucose)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the model artifact
    #[arg(long, default_value = "models/glucast-model.bin")]
    model_path: PathBuf,

    /// Output path for the vocabulary snapshot
    #[arg(long, default_value = "models/glucast-encoder.json")]
    encoder_path: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "8")]
    max_depth: usize,

    /// Minimum samples per leaf
    #[arg(long, default_value = "1")]
    min_samples_leaf: usize,

    /// Quantization step for split thresholds
    #[arg(long, default_value = "1000")]
    quant_step: i64,

    /// Random seed for bootstrap sampling
    #[arg(long, default_value = "42")]
    seed: i64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Glucast Forest Trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");

    info!("Loading records from: {}", args.input.display());
    let records = Dataset::records_from_csv(&args.input).context("Failed to load records")?;
    info!("Loaded {} records", records.len());

    let encoder = MealEncoder::standard();
    let dataset = Dataset::from_records(&records, &encoder)
        .context("Failed to build training dataset")?;

    let (min, max, mean) = dataset.target_stats();
    info!(
        "Built {} examples with {} features",
        dataset.len(),
        dataset.feature_count()
    );
    info!(
        "Target range: min={}, max={}, mean={} (micro mg/dL)",
        min, max, mean
    );

    let config = ForestConfig {
        num_trees: args.trees,
        max_depth: args.max_depth,
        min_samples_leaf: args.min_samples_leaf,
        quant_step: args.quant_step,
        seed: args.seed,
    };

    info!("Training configuration:");
    info!("  Trees: {}", config.num_trees);
    info!("  Max depth: {}", config.max_depth);
    info!("  Min samples per leaf: {}", config.min_samples_leaf);
    info!("  Quantization step: {}", config.quant_step);
    info!("  Seed: {}", config.seed);

    info!("═══════════════════════════════════════════");
    info!("Starting training...");
    let trainer = ForestTrainer::new(config);
    let model = trainer.train(&dataset)?;

    info!("Training complete!");
    info!("  Trees: {}", model.trees.len());
    info!("  Confidence: {:.1}", model.confidence());

    let store = ArtifactStore::new(&args.model_path, &args.encoder_path);
    let hash = store
        .save(&model, &encoder.snapshot())
        .context("Failed to save model artifacts")?;

    info!("═══════════════════════════════════════════");
    info!("✓ Training completed successfully");
    info!("  Model: {}", args.model_path.display());
    info!("  Encoder: {}", args.encoder_path.display());
    info!("  Hash: {}", hash);

    Ok(())
}
