use serde::{Deserialize, Serialize};

use crate::core::error::{DatasetError, Result};

/// Fraction of each class that goes to the training split.
///
/// The remainder goes to the test split. Both ends of `[0, 1]` are accepted:
/// `0.0` sends everything to test, `1.0` everything to train.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SplitRatio {
    train: f64,
}

impl SplitRatio {
    /// Common 80/20 split.
    pub const EIGHTY_TWENTY: Self = Self { train: 0.8 };

    pub fn new(train: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&train) {
            return Err(DatasetError::InvalidSplitRatio(train));
        }
        Ok(Self { train })
    }

    pub const fn train_ratio(&self) -> f64 {
        self.train
    }

    pub fn test_ratio(&self) -> f64 {
        1.0 - self.train
    }

    /// Number of files out of `total` assigned to train: `floor(total * ratio)`.
    pub fn train_count(&self, total: usize) -> usize {
        let count = (total as f64 * self.train).floor() as usize;
        count.min(total)
    }
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self::EIGHTY_TWENTY
    }
}

impl TryFrom<f64> for SplitRatio {
    type Error = DatasetError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SplitRatio> for f64 {
    fn from(ratio: SplitRatio) -> Self {
        ratio.train
    }
}
