use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use image_dataset_prep::core::{partition_with_rng, sample_random_images, validate_with, RealFs};
use image_dataset_prep::logging::setup_logging;
use image_dataset_prep::{PrepConfig, SplitRatio, TransferMode, VerifyDepth};

/// Validate, split and sample class-folder image datasets
#[derive(Parser, Debug)]
#[command(name = "dataset-prep", version)]
struct Cli {
    /// JSON config file; the per-user config is used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to a timestamped file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report files that are not intact images with an allowed extension
    Validate {
        root: PathBuf,

        /// Delete invalid files instead of only reporting them
        #[arg(long)]
        remove: bool,

        /// Allowed extension, repeatable (e.g. --ext .jpg --ext .png)
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,

        /// Only parse image headers (faster, misses files cut off mid-data)
        #[arg(long)]
        header_only: bool,

        /// Write the report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Partition every class into train and test folders
    Split {
        source: PathBuf,
        train: PathBuf,
        test: PathBuf,

        /// Fraction of each class assigned to train
        #[arg(long)]
        ratio: Option<f64>,

        /// Move files instead of copying them (consumes the source)
        #[arg(long = "move")]
        move_files: bool,

        /// Shuffle seed for a reproducible split
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print one random image from each of a few random classes
    Sample {
        root: PathBuf,

        /// Maximum number of classes to draw from
        #[arg(long)]
        classes: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<PrepConfig> {
    match path {
        Some(path) => PrepConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(PrepConfig::load()),
    }
}

/// Fold command line flags into the loaded config
fn apply_overrides(config: &mut PrepConfig, command: &Command) -> Result<()> {
    match command {
        Command::Validate {
            remove,
            extensions,
            header_only,
            ..
        } => {
            if *remove {
                config.remove_invalid = true;
            }
            if !extensions.is_empty() {
                config.valid_extensions = extensions.clone();
            }
            if *header_only {
                config.verify_depth = VerifyDepth::Header;
            }
        }
        Command::Split {
            ratio,
            move_files,
            seed,
            ..
        } => {
            if let Some(ratio) = ratio {
                config.train_ratio = SplitRatio::new(*ratio)?;
            }
            if *move_files {
                config.transfer_mode = TransferMode::Move;
            }
            if seed.is_some() {
                config.seed = *seed;
            }
        }
        Command::Sample { classes, seed, .. } => {
            if let Some(classes) = classes {
                config.sample_classes = *classes;
            }
            if seed.is_some() {
                config.seed = *seed;
            }
        }
    }
    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_ref())?;
    apply_overrides(&mut config, &cli.command)?;

    match &cli.command {
        Command::Validate { root, report, .. } => {
            let options = config.validate_options()?;
            let result = validate_with(&RealFs, root, &options)?;

            for invalid in &result.invalid {
                println!("{}/{}: {}", invalid.class_label, invalid.file_name, invalid.reason);
            }
            println!(
                "Invalid images found: {} of {} scanned, {} removed",
                result.invalid.len(),
                result.scanned,
                result.removed
            );

            if let Some(report_path) = report {
                let json = serde_json::to_string_pretty(&result)?;
                fs::write(report_path, json)
                    .with_context(|| format!("Failed to write report to {:?}", report_path))?;
                info!("Report written to {:?}", report_path);
            }
        }
        Command::Split {
            source,
            train,
            test,
            ..
        } => {
            let mut rng = make_rng(config.seed);
            let summary = partition_with_rng(
                &RealFs,
                source,
                train,
                test,
                &config.partition_options(),
                &mut rng,
            )?;
            for class in &summary.classes {
                println!("{}: {} train, {} test", class.label, class.train.len(), class.test.len());
            }
            for skipped in &summary.skipped {
                println!("{}: skipped (empty)", skipped);
            }
            println!("Data split completed.");
        }
        Command::Sample { root, .. } => {
            let mut rng = make_rng(config.seed);
            let samples = sample_random_images(
                &RealFs,
                root,
                config.sample_classes,
                &config.reserved_names,
                &mut rng,
            )?;
            for sample in &samples {
                println!("Class: {}  File: {}", sample.class_label, sample.path.display());
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_dir.as_deref(), &cli.log_level).context("Failed to set up logging")?;
    info!("Starting dataset-prep");
    run(cli)
}
