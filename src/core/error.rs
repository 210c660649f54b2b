use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors that abort a whole validation, partition or sampling call.
///
/// Per-file decode problems are never reported through this type; they end
/// up as entries of a [`ValidationReport`](crate::core::ValidationReport).
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid split ratio: {0} (must be within [0, 1])")]
    InvalidSplitRatio(f64),

    #[error("The set of valid extensions is empty")]
    EmptyExtensionSet,

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] FileOpError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Train and test destinations are the same folder: {0:?}")]
    SharedDestination(PathBuf),

    #[error("Destination {destination:?} is the class folder {class_dir:?} itself")]
    DestinationIsSource {
        class_dir: PathBuf,
        destination: PathBuf,
    },
}

impl DatasetError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error types for single file operations
#[derive(Error, Debug)]
pub enum FileOpError {
    #[error("Copy failed from {src:?} to {dest:?}: {source}")]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path:?}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
