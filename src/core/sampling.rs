//! Random peek into a dataset: one image from each of a few random classes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

use crate::core::dataset::{list_class_files, list_classes};
use crate::core::error::Result;
use crate::core::operations::FileSystem;

pub const DEFAULT_SAMPLE_CLASSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampledImage {
    pub class_label: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Pick one random file from each of up to `max_classes` random classes.
///
/// When the dataset has more classes than `max_classes`, a random subset is
/// chosen. Classes without files contribute nothing.
pub fn sample_random_images<R: Rng + ?Sized>(
    fs: &dyn FileSystem,
    data_dir: &Path,
    max_classes: usize,
    reserved: &[String],
    rng: &mut R,
) -> Result<Vec<SampledImage>> {
    let _span = info_span!("sample").entered();
    let mut classes = list_classes(fs, data_dir, reserved)?;
    if classes.len() > max_classes {
        classes.shuffle(rng);
        classes.truncate(max_classes);
    }

    let mut samples = Vec::with_capacity(classes.len());
    for class in classes {
        let files = list_class_files(fs, &class.path, reserved)?;
        match files.choose(rng) {
            Some(file) => samples.push(SampledImage {
                class_label: class.label,
                file_name: file.file_name.clone(),
                path: file.path.clone(),
            }),
            None => warn!("No files to sample in class folder {:?}", class.path),
        }
    }

    info!("Sampled {} images from {:?}", samples.len(), data_dir);
    Ok(samples)
}
