//! Train/test partitioning of a class-folder dataset.
//!
//! Each class is shuffled and cut independently, then materialized into
//! `train_dir/<class>` and `test_dir/<class>` by copying or moving.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

use super::ratio::SplitRatio;
use crate::core::dataset::{default_reserved_names, list_class_files, list_classes, SampleFile};
use crate::core::error::{DatasetError, Result};
use crate::core::operations::{transfer_file, FileSystem, RealFs, TransferMode};

/// Settings for a partition run
#[derive(Debug, Clone)]
pub struct PartitionOptions {
    pub ratio: SplitRatio,
    pub mode: TransferMode,
    pub reserved: Vec<String>,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            ratio: SplitRatio::default(),
            mode: TransferMode::default(),
            reserved: default_reserved_names(),
        }
    }
}

/// Where one class's files ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSplit {
    pub label: String,
    pub train: Vec<String>,
    pub test: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PartitionSummary {
    pub classes: Vec<ClassSplit>,
    /// Class folders that had no files
    pub skipped: Vec<String>,
}

impl PartitionSummary {
    pub fn train_total(&self) -> usize {
        self.classes.iter().map(|c| c.train.len()).sum()
    }

    pub fn test_total(&self) -> usize {
        self.classes.iter().map(|c| c.test.len()).sum()
    }

    pub fn class(&self, label: &str) -> Option<&ClassSplit> {
        self.classes.iter().find(|c| c.label == label)
    }
}

/// Shuffle `files` and cut them into `(train, test)` at `ratio`.
pub fn plan_class_split<R: Rng + ?Sized>(
    mut files: Vec<SampleFile>,
    ratio: SplitRatio,
    rng: &mut R,
) -> (Vec<SampleFile>, Vec<SampleFile>) {
    files.shuffle(rng);
    let split_index = ratio.train_count(files.len());
    let test = files.split_off(split_index);
    (files, test)
}

/// Copy a dataset on disk into train/test trees using a fresh random split.
pub fn partition(
    source_dir: &Path,
    train_dir: &Path,
    test_dir: &Path,
    train_ratio: f64,
) -> Result<PartitionSummary> {
    let options = PartitionOptions {
        ratio: SplitRatio::new(train_ratio)?,
        ..PartitionOptions::default()
    };
    partition_with_rng(
        &RealFs,
        source_dir,
        train_dir,
        test_dir,
        &options,
        &mut rand::thread_rng(),
    )
}

/// Partition every class under `source_dir` into `train_dir` and `test_dir`.
///
/// Class folders without files are skipped. Destination roots that sit inside
/// `source_dir` are not treated as classes. Before anything is transferred the
/// destinations are checked: train and test must be different folders, and no
/// `<dest>/<class>` may resolve to the class folder it would be filled from.
/// A failed transfer aborts the run and leaves whatever was already
/// transferred in place.
pub fn partition_with_rng<R: Rng + ?Sized>(
    fs: &dyn FileSystem,
    source_dir: &Path,
    train_dir: &Path,
    test_dir: &Path,
    options: &PartitionOptions,
    rng: &mut R,
) -> Result<PartitionSummary> {
    let _span = info_span!("partition").entered();
    info!(
        "Splitting {:?} into {:?} / {:?} (train ratio {}, {})",
        source_dir,
        train_dir,
        test_dir,
        options.ratio.train_ratio(),
        options.mode.as_str()
    );

    for dir in [train_dir, test_dir] {
        fs.create_dir_all(dir).map_err(|e| DatasetError::io(dir, e))?;
    }
    let train_root = resolve(fs, train_dir)?;
    let test_root = resolve(fs, test_dir)?;
    if train_root == test_root {
        return Err(DatasetError::SharedDestination(train_root));
    }

    let mut classes = Vec::new();
    for class in list_classes(fs, source_dir, &options.reserved)? {
        let class_dir = resolve(fs, &class.path)?;
        if class_dir == train_root || class_dir == test_root {
            debug!("Not treating destination folder {:?} as a class", class.path);
            continue;
        }
        for destination in [train_root.join(&class.label), test_root.join(&class.label)] {
            if destination == class_dir {
                return Err(DatasetError::DestinationIsSource {
                    class_dir: class.path,
                    destination,
                });
            }
        }
        classes.push(class);
    }

    let mut summary = PartitionSummary::default();

    for class in classes {
        let files = list_class_files(fs, &class.path, &options.reserved)?;
        if files.is_empty() {
            warn!("Skipping empty directory: {:?}", class.path);
            summary.skipped.push(class.label);
            continue;
        }

        let (train_files, test_files) = plan_class_split(files, options.ratio, rng);

        let train_subfolder = train_dir.join(&class.label);
        let test_subfolder = test_dir.join(&class.label);
        for dir in [&train_subfolder, &test_subfolder] {
            fs.create_dir_all(dir).map_err(|e| DatasetError::io(dir, e))?;
        }

        for file in &train_files {
            transfer_file(fs, options.mode, &file.path, &train_subfolder.join(&file.file_name))?;
        }
        for file in &test_files {
            transfer_file(fs, options.mode, &file.path, &test_subfolder.join(&file.file_name))?;
        }

        info!(
            "Class {}: {} train, {} test",
            class.label,
            train_files.len(),
            test_files.len()
        );

        summary.classes.push(ClassSplit {
            label: class.label,
            train: train_files.into_iter().map(|f| f.file_name).collect(),
            test: test_files.into_iter().map(|f| f.file_name).collect(),
        });
    }

    info!(
        "Data split completed. {} train, {} test, {} empty classes skipped",
        summary.train_total(),
        summary.test_total(),
        summary.skipped.len()
    );
    Ok(summary)
}

fn resolve(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf> {
    fs.canonicalize(path).map_err(|e| DatasetError::io(path, e))
}
