use clap::Parser;
use maintenance_predictor::training::{DataProcessing, ModelTraining};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// End-to-end training pipeline: data preprocessing, then model training
/// and evaluation, writing the artifacts the server loads at startup.
#[derive(Parser, Debug)]
#[command(name = "mp-train", version, about = "Machine-maintenance training pipeline")]
struct Args {
    /// Raw telemetry CSV
    #[arg(long, default_value = "artifacts/raw/data.csv")]
    input: PathBuf,

    /// Directory for the scaler and feature means
    #[arg(long, default_value = "artifacts/processed")]
    processed_dir: PathBuf,

    /// Directory for the trained model
    #[arg(long, default_value = "artifacts/models")]
    model_dir: PathBuf,

    /// Maximum decision-tree depth
    #[arg(long, default_value_t = 10)]
    max_depth: u16,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maintenance_predictor=info,mp_train=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Stage 1: preprocessing
    let processor = DataProcessing::new(&args.input, &args.processed_dir);
    let dataset = processor.run()?;

    // Stage 2: training and evaluation
    let trainer = ModelTraining::new(&args.model_dir).with_max_depth(args.max_depth);
    trainer.run(&dataset)?;

    tracing::info!("Training pipeline completed");
    Ok(())
}
