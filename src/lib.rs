//! Preparation tools for class-folder image datasets.
//!
//! A dataset root holds one directory per class, each containing that
//! class's image files. The crate can
//! - validate the tree, reporting (and optionally deleting) files that are
//!   not intact images with an allowed extension,
//! - partition each class into train/test trees by copying or moving,
//! - pick a random image from a handful of random classes for a quick look.
//!
//! All filesystem access goes through [`core::FileSystem`], with
//! [`core::RealFs`] for disk and [`core::MemoryFs`] for tests.

pub mod config;
pub mod core;
pub mod logging;

pub use crate::config::PrepConfig;
pub use crate::core::{
    partition, partition_with_rng, sample_random_images, validate, validate_with, DatasetError,
    FileSystem, MemoryFs, PartitionOptions, PartitionSummary, RealFs, SplitRatio, TransferMode,
    ValidExtensions, ValidateOptions, ValidationReport, VerifyDepth,
};
