//! Filesystem seam used by validation, partitioning and sampling.
//!
//! Everything the dataset tools do to disk goes through [`FileSystem`], so the
//! logic can run against [`RealFs`] in production and [`MemoryFs`] in tests.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Cursor, Seek};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A buffered, seekable read handle. Image decoders need both.
pub trait ReadSeek: BufRead + Seek {}

impl<T: BufRead + Seek> ReadSeek for T {}

/// One child of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// List the direct children of `path` in whatever order the backend
    /// yields them. Callers must not rely on that order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Open a file for reading. The handle is released when dropped.
    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>>;

    /// Create a directory and any missing parents. An existing directory is
    /// not an error.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy `src` to `dest`, overwriting `dest` if it exists.
    fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Absolute form of an existing `path` with `.`/`..` (and, on disk,
    /// symlinks) resolved. Two paths naming the same entry compare equal.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// The real disk, through `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                // follows symlinks, so a linked class folder still counts
                is_dir: entry_path.is_dir(),
                path: entry_path,
            });
        }
        Ok(entries)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64> {
        fs::copy(src, dest)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// In-memory filesystem for exercising dataset logic without touching disk.
///
/// Listings come back sorted by path, which is one valid "native" order.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a directory (and its parents)
    pub fn add_dir(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.create_dir_all(path.as_ref())
    }

    /// Create a file with the given content, creating parent directories
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        let mut nodes = self.nodes();
        if let Some(Node::Dir) = nodes.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{:?} is a directory", path),
            ));
        }
        nodes.insert(path.to_path_buf(), Node::File(content.into()));
        Ok(())
    }

    /// Content of a file, or `None` if there is no file at `path`
    pub fn read_bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes().get(path.as_ref()) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn is_file(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.nodes().get(path.as_ref()), Some(Node::File(_)))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{:?} not found", path))
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.nodes().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.nodes().get(path), Some(Node::Dir))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let nodes = self.nodes();
        match nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{:?} is not a directory", path),
                ))
            }
            None => return Err(not_found(path)),
        }

        Ok(nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .map(|(child, node)| DirEntryInfo {
                name: child
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: child.clone(),
                is_dir: matches!(node, Node::Dir),
            })
            .collect())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>> {
        let bytes = self.read_bytes(path).ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            match nodes.get(ancestor) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{:?} is a file", ancestor),
                    ))
                }
                None => {
                    nodes.insert(ancestor.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64> {
        let mut nodes = self.nodes();
        let bytes = match nodes.get(src) {
            Some(Node::File(bytes)) => bytes.clone(),
            _ => return Err(not_found(src)),
        };
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !matches!(nodes.get(parent), Some(Node::Dir)) {
                return Err(not_found(parent));
            }
        }
        if let Some(Node::Dir) = nodes.get(dest) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{:?} is a directory", dest),
            ));
        }
        let len = bytes.len() as u64;
        nodes.insert(dest.to_path_buf(), Node::File(bytes));
        Ok(len)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();
        match nodes.get(path) {
            Some(Node::File(_)) => {
                nodes.remove(path);
                Ok(())
            }
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{:?} is a directory", path),
            )),
            None => Err(not_found(path)),
        }
    }

    // No links in memory, so resolving `.` and `..` is enough
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                other => resolved.push(other.as_os_str()),
            }
        }
        if self.exists(&resolved) {
            Ok(resolved)
        } else {
            Err(not_found(path))
        }
    }
}
