mod file_ops;
mod fs;

pub use file_ops::{copy_file, move_file, remove_file, transfer_file, FileOpResult, TransferMode};
pub use fs::{DirEntryInfo, FileSystem, MemoryFs, ReadSeek, RealFs};
