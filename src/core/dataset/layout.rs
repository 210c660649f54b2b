use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::error::{DatasetError, Result};
use crate::core::operations::FileSystem;

/// Entries skipped at every level of a dataset tree unless configured otherwise
pub const DEFAULT_RESERVED_NAMES: [&str; 1] = [".ipynb_checkpoints"];

pub fn default_reserved_names() -> Vec<String> {
    DEFAULT_RESERVED_NAMES.iter().map(|s| s.to_string()).collect()
}

/// A class folder directly under the dataset root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDir {
    pub label: String,
    pub path: PathBuf,
}

/// A sample file inside a class folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    pub file_name: String,
    pub path: PathBuf,
}

fn is_reserved(name: &str, reserved: &[String]) -> bool {
    reserved.iter().any(|r| r == name)
}

/// List the class folders of a dataset root.
///
/// Plain files and reserved entries at the root are ignored. The order is
/// whatever the filesystem lists.
pub fn list_classes(fs: &dyn FileSystem, root: &Path, reserved: &[String]) -> Result<Vec<ClassDir>> {
    if !fs.is_dir(root) {
        warn!("Dataset root does not exist or is not a directory: {:?}", root);
        return Err(DatasetError::DirectoryNotFound(root.to_path_buf()));
    }

    let entries = fs.read_dir(root).map_err(|e| DatasetError::io(root, e))?;
    let classes: Vec<ClassDir> = entries
        .into_iter()
        .filter(|entry| entry.is_dir && !is_reserved(&entry.name, reserved))
        .map(|entry| ClassDir {
            label: entry.name,
            path: entry.path,
        })
        .collect();

    debug!("Found {} class folders in {:?}", classes.len(), root);
    Ok(classes)
}

/// List the sample files of one class folder. Nested directories are not
/// samples and are skipped along with reserved entries.
pub fn list_class_files(
    fs: &dyn FileSystem,
    class_dir: &Path,
    reserved: &[String],
) -> Result<Vec<SampleFile>> {
    let entries = fs
        .read_dir(class_dir)
        .map_err(|e| DatasetError::io(class_dir, e))?;

    Ok(entries
        .into_iter()
        .filter(|entry| !entry.is_dir && !is_reserved(&entry.name, reserved))
        .map(|entry| SampleFile {
            file_name: entry.name,
            path: entry.path,
        })
        .collect())
}

/// Lowercase, dot-prefixed extension of a file name, or an empty string.
///
/// Names that only start with a dot (`.hidden`) have no extension.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
