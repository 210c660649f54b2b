use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::dataset::default_reserved_names;
use crate::core::error::{DatasetError, Result};
use crate::core::operations::TransferMode;
use crate::core::sampling::DEFAULT_SAMPLE_CLASSES;
use crate::core::split::{PartitionOptions, SplitRatio};
use crate::core::validation::{ValidExtensions, ValidateOptions, VerifyDepth, DEFAULT_VALID_EXTENSIONS};

/// Tool configuration, loadable from a JSON file.
///
/// Every field has a default, so a config file only needs the keys it
/// changes. Command line flags are applied on top of this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Extensions accepted as candidate images
    pub valid_extensions: Vec<String>,

    /// Delete invalid files during validation
    pub remove_invalid: bool,

    pub verify_depth: VerifyDepth,

    pub train_ratio: SplitRatio,

    pub transfer_mode: TransferMode,

    /// Entry names ignored at every level of the dataset tree
    pub reserved_names: Vec<String>,

    /// Fixed shuffle seed; a fresh random split is made when unset
    pub seed: Option<u64>,

    /// How many classes the sampler draws from
    pub sample_classes: usize,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            valid_extensions: DEFAULT_VALID_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            remove_invalid: false,
            verify_depth: VerifyDepth::default(),
            train_ratio: SplitRatio::default(),
            transfer_mode: TransferMode::default(),
            reserved_names: default_reserved_names(),
            seed: None,
            sample_classes: DEFAULT_SAMPLE_CLASSES,
        }
    }
}

impl PrepConfig {
    /// Per-user config file location
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "image-dataset-prep")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from the per-user config file, or return defaults if it doesn't
    /// exist or is unusable
    pub fn load() -> Self {
        let Some(config_path) = Self::default_path() else {
            warn!("Could not determine config directory. Using defaults.");
            return Self::default();
        };

        if !config_path.exists() {
            info!("No config file found at {:?}. Using defaults.", config_path);
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit file. Unlike [`load`](Self::load) this fails
    /// loudly.
    pub fn load_from(path: &Path) -> Result<Self> {
        info!("Loading config from: {:?}", path);
        let contents = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        serde_json::from_str(&contents)
            .map_err(|e| DatasetError::Config(format!("Failed to parse {:?}: {}", path, e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DatasetError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, json).map_err(|e| DatasetError::io(path, e))?;
        info!("Config saved to: {:?}", path);
        Ok(())
    }

    pub fn validate_options(&self) -> Result<ValidateOptions> {
        Ok(ValidateOptions {
            extensions: ValidExtensions::new(&self.valid_extensions)?,
            remove: self.remove_invalid,
            depth: self.verify_depth,
            reserved: self.reserved_names.clone(),
        })
    }

    pub fn partition_options(&self) -> PartitionOptions {
        PartitionOptions {
            ratio: self.train_ratio,
            mode: self.transfer_mode,
            reserved: self.reserved_names.clone(),
        }
    }
}
