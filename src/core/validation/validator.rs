//! Dataset validation: find (and optionally delete) files in a class-folder
//! tree that are not intact images of an allowed type.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

use super::decode::{claimed_format, verify_image, DecodeOutcome, VerifyDepth};
use super::extensions::ValidExtensions;
use crate::core::dataset::{default_reserved_names, file_extension, list_class_files, list_classes};
use crate::core::error::{DatasetError, Result};
use crate::core::operations::{remove_file, FileSystem, RealFs};

/// Why a file was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    UnsupportedExtension { extension: String },
    UnrecognizedContent,
    FormatMismatch { expected: String, actual: String },
    CorruptContent { message: String },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::UnsupportedExtension { extension } if extension.is_empty() => {
                write!(f, "missing file extension")
            }
            InvalidReason::UnsupportedExtension { extension } => {
                write!(f, "unsupported extension {}", extension)
            }
            InvalidReason::UnrecognizedContent => write!(f, "content is not a recognized image"),
            InvalidReason::FormatMismatch { expected, actual } => {
                write!(f, "extension claims {} but content is {}", expected, actual)
            }
            InvalidReason::CorruptContent { message } => write!(f, "corrupt image: {}", message),
        }
    }
}

/// A rejected file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidImage {
    pub file_name: String,
    pub class_label: String,
    pub path: PathBuf,
    pub reason: InvalidReason,
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Files looked at, across all classes
    pub scanned: usize,
    /// Files deleted because they were invalid
    pub removed: usize,
    pub invalid: Vec<InvalidImage>,
}

impl ValidationReport {
    /// The invalid files as `(file_name, class_label)` pairs, in scan order
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.invalid
            .iter()
            .map(|i| (i.file_name.clone(), i.class_label.clone()))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Settings for a validation pass
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub extensions: ValidExtensions,
    /// Delete invalid files as they are found. Off means a dry run.
    pub remove: bool,
    pub depth: VerifyDepth,
    pub reserved: Vec<String>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            extensions: ValidExtensions::default(),
            remove: false,
            depth: VerifyDepth::default(),
            reserved: default_reserved_names(),
        }
    }
}

/// Validate a dataset on disk with default depth and reserved names.
pub fn validate(
    base_directory: &Path,
    valid_extensions: &ValidExtensions,
    remove: bool,
) -> Result<ValidationReport> {
    let options = ValidateOptions {
        extensions: valid_extensions.clone(),
        remove,
        ..ValidateOptions::default()
    };
    validate_with(&RealFs, base_directory, &options)
}

/// Check a single file. `Ok(None)` means it is a valid image.
///
/// Decoder failures become an [`InvalidReason`]; failing to open the file at
/// all is a filesystem error and is returned as such.
pub fn check_file(
    fs: &dyn FileSystem,
    path: &Path,
    file_name: &str,
    extensions: &ValidExtensions,
    depth: VerifyDepth,
) -> Result<Option<InvalidReason>> {
    let extension = file_extension(file_name);
    if !extensions.contains(&extension) {
        return Ok(Some(InvalidReason::UnsupportedExtension { extension }));
    }

    let reader = fs.open(path).map_err(|e| DatasetError::io(path, e))?;
    let reason = match verify_image(reader, claimed_format(&extension), depth) {
        DecodeOutcome::Valid(_) => None,
        DecodeOutcome::UnrecognizedContent => Some(InvalidReason::UnrecognizedContent),
        DecodeOutcome::FormatMismatch { expected, actual } => Some(InvalidReason::FormatMismatch {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }),
        DecodeOutcome::Corrupt(message) => Some(InvalidReason::CorruptContent { message }),
    };
    Ok(reason)
}

/// Scan every class folder under `base_directory` and report the files that
/// are not intact images with an allowed extension.
///
/// With `options.remove` set, each invalid file is deleted as soon as it is
/// found; there is no separate commit phase and no undo.
pub fn validate_with(
    fs: &dyn FileSystem,
    base_directory: &Path,
    options: &ValidateOptions,
) -> Result<ValidationReport> {
    let _span = info_span!("validate").entered();
    info!(
        "Validating images under {:?} (remove: {}, depth: {:?})",
        base_directory, options.remove, options.depth
    );

    let mut report = ValidationReport::default();

    for class in list_classes(fs, base_directory, &options.reserved)? {
        for sample in list_class_files(fs, &class.path, &options.reserved)? {
            report.scanned += 1;

            let reason = match check_file(fs, &sample.path, &sample.file_name, &options.extensions, options.depth)? {
                Some(reason) => reason,
                None => {
                    debug!("Valid image: {} in folder {}", sample.file_name, class.label);
                    continue;
                }
            };

            if options.remove {
                remove_file(fs, &sample.path)?;
                report.removed += 1;
                warn!(
                    "Removed invalid image: {} in folder {} - {}",
                    sample.file_name, class.label, reason
                );
            } else {
                debug!(
                    "Invalid image: {} in folder {} - {}",
                    sample.file_name, class.label, reason
                );
            }

            report.invalid.push(InvalidImage {
                file_name: sample.file_name,
                class_label: class.label.clone(),
                path: sample.path,
                reason,
            });
        }
    }

    info!(
        "Validation complete. Scanned: {}, invalid: {}, removed: {}",
        report.scanned,
        report.invalid.len(),
        report.removed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operations::MemoryFs;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::collections::HashSet;
    use std::io::Cursor;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(5, 5));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    fn mixed_dataset() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.add_file("/data/cats/good.jpg", encoded(ImageFormat::Jpeg)).unwrap();
        fs.add_file("/data/cats/SHOUTY.PNG", encoded(ImageFormat::Png)).unwrap();
        fs.add_file("/data/cats/sample.txt", encoded(ImageFormat::Png)).unwrap();
        fs.add_file("/data/dogs/broken.jpg", b"not really a jpeg".to_vec()).unwrap();
        fs.add_file("/data/dogs/liar.jpg", encoded(ImageFormat::Png)).unwrap();
        fs.add_file("/data/dogs/good.bmp", encoded(ImageFormat::Bmp)).unwrap();
        fs.add_file("/data/.ipynb_checkpoints/junk.txt", b"junk".to_vec()).unwrap();
        fs.add_file("/data/stray.txt", b"stray".to_vec()).unwrap();
        fs
    }

    fn as_set(report: &ValidationReport) -> HashSet<(String, String)> {
        report.pairs().into_iter().collect()
    }

    fn pair(file: &str, class: &str) -> (String, String) {
        (file.to_string(), class.to_string())
    }

    #[test]
    fn test_dry_run_reports_without_removing() {
        let fs = mixed_dataset();
        let report = validate_with(&fs, Path::new("/data"), &ValidateOptions::default()).unwrap();

        assert_eq!(report.scanned, 6);
        assert_eq!(report.removed, 0);
        assert_eq!(
            as_set(&report),
            HashSet::from([
                pair("sample.txt", "cats"),
                pair("broken.jpg", "dogs"),
                pair("liar.jpg", "dogs"),
            ])
        );
        assert!(fs.is_file("/data/cats/sample.txt"));
        assert!(fs.is_file("/data/dogs/broken.jpg"));
    }

    #[test]
    fn test_reasons_are_distinguished() {
        let fs = mixed_dataset();
        let report = validate_with(&fs, Path::new("/data"), &ValidateOptions::default()).unwrap();

        let reason_of = |name: &str| {
            report
                .invalid
                .iter()
                .find(|i| i.file_name == name)
                .map(|i| i.reason.clone())
                .unwrap()
        };
        assert_eq!(
            reason_of("sample.txt"),
            InvalidReason::UnsupportedExtension {
                extension: ".txt".to_string()
            }
        );
        assert_eq!(reason_of("broken.jpg"), InvalidReason::UnrecognizedContent);
        assert_eq!(
            reason_of("liar.jpg"),
            InvalidReason::FormatMismatch {
                expected: "Jpeg".to_string(),
                actual: "Png".to_string()
            }
        );
    }

    #[test]
    fn test_remove_deletes_only_invalid_files() {
        let fs = mixed_dataset();
        let options = ValidateOptions {
            remove: true,
            ..ValidateOptions::default()
        };
        let report = validate_with(&fs, Path::new("/data"), &options).unwrap();

        assert_eq!(report.removed, 3);
        assert!(!fs.is_file("/data/cats/sample.txt"));
        assert!(!fs.is_file("/data/dogs/broken.jpg"));
        assert!(!fs.is_file("/data/dogs/liar.jpg"));
        assert!(fs.is_file("/data/cats/good.jpg"));
        assert!(fs.is_file("/data/cats/SHOUTY.PNG"));
        assert!(fs.is_file("/data/dogs/good.bmp"));
        // reserved folders and root files are never touched
        assert!(fs.is_file("/data/.ipynb_checkpoints/junk.txt"));
        assert!(fs.is_file("/data/stray.txt"));

        let second = validate_with(&fs, Path::new("/data"), &options).unwrap();
        assert!(second.is_clean());
    }

    #[test]
    fn test_dry_run_is_idempotent() {
        let fs = mixed_dataset();
        let first = validate_with(&fs, Path::new("/data"), &ValidateOptions::default()).unwrap();
        let second = validate_with(&fs, Path::new("/data"), &ValidateOptions::default()).unwrap();
        assert_eq!(as_set(&first), as_set(&second));
    }

    #[test]
    fn test_custom_extensions() {
        let fs = mixed_dataset();
        let options = ValidateOptions {
            extensions: ValidExtensions::new([".png"]).unwrap(),
            ..ValidateOptions::default()
        };
        let report = validate_with(&fs, Path::new("/data"), &options).unwrap();
        assert!(!as_set(&report).contains(&pair("SHOUTY.PNG", "cats")));
        assert!(as_set(&report).contains(&pair("good.jpg", "cats")));
        assert!(as_set(&report).contains(&pair("good.bmp", "dogs")));
    }

    #[test]
    fn test_cut_off_image_is_reported_with_default_options() {
        let fs = MemoryFs::new();
        let img = RgbImage::from_fn(64, 64, |x, y| image::Rgb([(x * 4) as u8, (y * 4) as u8, 90]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let half = bytes.len() / 2;
        bytes.truncate(half);
        fs.add_file("/data/cats/half.png", bytes).unwrap();
        fs.add_file("/data/cats/whole.png", encoded(ImageFormat::Png)).unwrap();

        let report = validate_with(&fs, Path::new("/data"), &ValidateOptions::default()).unwrap();
        assert_eq!(as_set(&report), HashSet::from([pair("half.png", "cats")]));
        assert!(matches!(
            report.invalid[0].reason,
            InvalidReason::CorruptContent { .. }
        ));

        let header_only = ValidateOptions {
            depth: VerifyDepth::Header,
            ..ValidateOptions::default()
        };
        assert!(validate_with(&fs, Path::new("/data"), &header_only).unwrap().is_clean());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let fs = MemoryFs::new();
        let err = validate_with(&fs, Path::new("/nowhere"), &ValidateOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_reason_display() {
        let missing = InvalidReason::UnsupportedExtension {
            extension: String::new(),
        };
        assert_eq!(missing.to_string(), "missing file extension");
        assert_eq!(
            InvalidReason::UnrecognizedContent.to_string(),
            "content is not a recognized image"
        );
    }

    #[test]
    fn test_report_serializes_reason_kind() {
        let report = ValidationReport {
            scanned: 1,
            removed: 0,
            invalid: vec![InvalidImage {
                file_name: "sample.txt".to_string(),
                class_label: "cats".to_string(),
                path: PathBuf::from("/data/cats/sample.txt"),
                reason: InvalidReason::UnsupportedExtension {
                    extension: ".txt".to_string(),
                },
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["invalid"][0]["reason"]["kind"], "unsupported_extension");
        assert_eq!(json["invalid"][0]["class_label"], "cats");
    }
}
