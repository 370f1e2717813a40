use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use ai_checkup::config;
use ai_checkup::db::{read_seed_file, AdviceSeed, SqliteStore};
use ai_checkup::diagnosis::{SymptomClassifier, TextClassifier, TrainingParams, TrainingSample};
use ai_checkup::init_tracing;
use ai_checkup::models::HospitalRecord;

/// Offline maintenance for AI Checkup: train the diagnosis model and
/// seed the store.
#[derive(Parser, Debug)]
#[command(name = "checkup-admin", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the diagnosis model from labelled symptom samples
    Train {
        /// JSON array of {"symptoms": .., "label": ..}
        #[arg(long)]
        data: PathBuf,

        /// Artifact path (defaults to the server's model path)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        epochs: Option<usize>,

        #[arg(long)]
        learning_rate: Option<f64>,

        #[arg(long)]
        l2: Option<f64>,
    },
    /// Load curated advice and known hospitals into the store
    Seed {
        /// Store path (defaults to the server's database path)
        #[arg(long)]
        database: Option<PathBuf>,

        /// JSON array of {"label", "advice", "source"}
        #[arg(long)]
        advice: Option<PathBuf>,

        /// JSON array of {"name", "address", "latitude", "longitude", "place_id"?}
        #[arg(long)]
        hospitals: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    match Args::parse().command {
        Command::Train {
            data,
            output,
            epochs,
            learning_rate,
            l2,
        } => {
            let defaults = TrainingParams::default();
            let params = TrainingParams {
                learning_rate: learning_rate.unwrap_or(defaults.learning_rate),
                epochs: epochs.unwrap_or(defaults.epochs),
                l2: l2.unwrap_or(defaults.l2),
            };
            train(data, output.unwrap_or_else(config::default_model_path), params)
        }
        Command::Seed {
            database,
            advice,
            hospitals,
        } => seed(
            database.unwrap_or_else(config::default_database_path),
            advice,
            hospitals,
        ),
    }
}

fn train(data: PathBuf, output: PathBuf, params: TrainingParams) -> Result<()> {
    let samples: Vec<TrainingSample> = read_seed_file(&data)?;
    if samples.is_empty() {
        bail!("{} contains no samples", data.display());
    }

    let classifier = TextClassifier::fit_samples(&samples, params)?;
    classifier.save(&output)?;
    println!(
        "Trained on {} samples ({} labels) → {}",
        samples.len(),
        classifier.labels().len(),
        output.display()
    );
    Ok(())
}

fn seed(database: PathBuf, advice: Option<PathBuf>, hospitals: Option<PathBuf>) -> Result<()> {
    if advice.is_none() && hospitals.is_none() {
        bail!("nothing to seed: pass --advice and/or --hospitals");
    }

    let advice: Vec<AdviceSeed> = match advice {
        Some(path) => read_seed_file(&path)?,
        None => Vec::new(),
    };
    let hospitals: Vec<HospitalRecord> = match hospitals {
        Some(path) => read_seed_file(&path)?,
        None => Vec::new(),
    };

    let timeout = std::time::Duration::from_secs(config::DEFAULT_HTTP_TIMEOUT_SECS);
    let store = SqliteStore::open(&database, timeout)
        .with_context(|| format!("opening {}", database.display()))?;
    let summary = store.seed(&advice, &hospitals)?;

    println!(
        "Seeded {}: {} advice rows, {} hospitals ({} already present)",
        database.display(),
        summary.advice_upserted,
        summary.hospitals_inserted,
        summary.hospitals_skipped
    );
    Ok(())
}
