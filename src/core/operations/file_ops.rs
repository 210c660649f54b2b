use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

use super::fs::FileSystem;
use crate::core::error::FileOpError;

/// Result type for file operations
pub type FileOpResult<T> = Result<T, FileOpError>;

/// How a file reaches its destination split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Source stays in place
    #[default]
    Copy,
    /// Source is consumed
    Move,
}

impl TransferMode {
    pub fn as_str(&self) -> &str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

/// Copy a file, overwriting the destination if it already exists.
pub fn copy_file(fs: &dyn FileSystem, src: &Path, dest: &Path) -> FileOpResult<()> {
    debug!("Copying file from {:?} to {:?}", src, dest);

    if let Err(e) = fs.copy(src, dest) {
        error!("Failed to copy file from {:?} to {:?}: {}", src, dest, e);
        return Err(FileOpError::CopyFailed {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

/// Move a file from source to destination using copy + remove pattern
/// for cross-drive compatibility.
///
/// # Arguments
/// * `src` - Source file path
/// * `dest` - Destination file path
///
/// # Returns
/// * `Ok(())` if successful
/// * `Err(FileOpError)` if copy or remove failed
pub fn move_file(fs: &dyn FileSystem, src: &Path, dest: &Path) -> FileOpResult<()> {
    debug!("Moving file from {:?} to {:?}", src, dest);

    copy_file(fs, src, dest)?;

    // Remove the original file after successful copy
    if let Err(e) = fs.remove_file(src) {
        error!("Failed to remove original file {:?} after copy: {}", src, e);
        // Try to clean up the destination file
        let _ = fs.remove_file(dest);
        return Err(FileOpError::RemoveFailed {
            path: src.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

/// Put `src` at `dest` according to `mode`.
pub fn transfer_file(
    fs: &dyn FileSystem,
    mode: TransferMode,
    src: &Path,
    dest: &Path,
) -> FileOpResult<()> {
    match mode {
        TransferMode::Copy => copy_file(fs, src, dest),
        TransferMode::Move => move_file(fs, src, dest),
    }
}

/// Delete a single file permanently.
pub fn remove_file(fs: &dyn FileSystem, path: &Path) -> FileOpResult<()> {
    fs.remove_file(path).map_err(|e| {
        error!("Failed to remove {:?}: {}", path, e);
        FileOpError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operations::MemoryFs;

    fn fixture() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.add_file("/src/cat.jpg", b"meow".to_vec()).unwrap();
        fs.add_dir("/dst").unwrap();
        fs
    }

    #[test]
    fn test_copy_keeps_source() {
        let fs = fixture();
        transfer_file(&fs, TransferMode::Copy, Path::new("/src/cat.jpg"), Path::new("/dst/cat.jpg")).unwrap();
        assert_eq!(fs.read_bytes("/src/cat.jpg").unwrap(), b"meow".to_vec());
        assert_eq!(fs.read_bytes("/dst/cat.jpg").unwrap(), b"meow".to_vec());
    }

    #[test]
    fn test_move_consumes_source() {
        let fs = fixture();
        transfer_file(&fs, TransferMode::Move, Path::new("/src/cat.jpg"), Path::new("/dst/cat.jpg")).unwrap();
        assert!(!fs.is_file("/src/cat.jpg"));
        assert_eq!(fs.read_bytes("/dst/cat.jpg").unwrap(), b"meow".to_vec());
    }

    #[test]
    fn test_copy_into_missing_directory_fails() {
        let fs = fixture();
        let err = copy_file(&fs, Path::new("/src/cat.jpg"), Path::new("/missing/cat.jpg")).unwrap_err();
        assert!(matches!(err, FileOpError::CopyFailed { .. }));
    }

    #[test]
    fn test_remove_missing_file_fails() {
        let fs = fixture();
        let err = remove_file(&fs, Path::new("/src/dog.jpg")).unwrap_err();
        assert!(matches!(err, FileOpError::RemoveFailed { .. }));
    }

    #[test]
    fn test_transfer_mode_display() {
        assert_eq!(TransferMode::Copy.as_str(), "copy");
        assert_eq!(TransferMode::Move.as_str(), "move");
        assert_eq!(TransferMode::default(), TransferMode::Copy);
    }
}
