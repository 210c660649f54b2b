use std::collections::BTreeSet;

use crate::core::error::{DatasetError, Result};

pub const DEFAULT_VALID_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".bmp"];

/// Allow-list of file suffixes treated as candidate images.
///
/// Entries are stored lowercase and dot-prefixed, so `"JPG"`, `".jpg"` and
/// `".Jpg"` all name the same extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidExtensions(BTreeSet<String>);

impl ValidExtensions {
    pub fn new<I, S>(extensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = extensions
            .into_iter()
            .filter_map(|ext| normalize(ext.as_ref()))
            .collect();

        if set.is_empty() {
            return Err(DatasetError::EmptyExtensionSet);
        }
        Ok(Self(set))
    }

    /// `extension` is expected in the form produced by
    /// [`file_extension`](crate::core::dataset::file_extension).
    pub fn contains(&self, extension: &str) -> bool {
        self.0.contains(extension)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ValidExtensions {
    fn default() -> Self {
        Self(DEFAULT_VALID_EXTENSIONS.iter().map(|s| s.to_string()).collect())
    }
}

fn normalize(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}
