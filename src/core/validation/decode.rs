//! Structural check of a single image file.

use image::{ImageFormat, ImageReader, ImageResult};
use serde::{Deserialize, Serialize};

use crate::core::operations::ReadSeek;

/// How far the decoder goes before a file counts as intact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyDepth {
    /// Parse headers and dimensions only. Fast, but a file cut off after its
    /// header still passes.
    Header,
    /// Run the decoder through all of the image data
    #[default]
    Full,
}

/// What the decoder made of a file's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Valid(ImageFormat),
    /// Magic bytes match no known image format
    UnrecognizedContent,
    /// Content is an image, but not the kind the extension claims
    FormatMismatch {
        expected: ImageFormat,
        actual: ImageFormat,
    },
    Corrupt(String),
}

impl DecodeOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, DecodeOutcome::Valid(_))
    }
}

/// Format a file extension (with or without the leading dot) claims to be
pub fn claimed_format(extension: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(extension.trim_start_matches('.'))
}

/// Verify that `reader` holds an intact image of the `claimed` format.
///
/// The reader is consumed and dropped before this returns. Decoder failures
/// of every kind are folded into the returned outcome.
pub fn verify_image(
    reader: Box<dyn ReadSeek>,
    claimed: Option<ImageFormat>,
    depth: VerifyDepth,
) -> DecodeOutcome {
    let mut reader = match ImageReader::new(reader).with_guessed_format() {
        Ok(reader) => reader,
        Err(e) => return DecodeOutcome::Corrupt(e.to_string()),
    };

    match (reader.format(), claimed) {
        (Some(actual), Some(expected)) if expected != actual => {
            DecodeOutcome::FormatMismatch { expected, actual }
        }
        (Some(actual), _) => match run_decoder(reader, depth) {
            Ok(()) => DecodeOutcome::Valid(actual),
            Err(e) => DecodeOutcome::Corrupt(e.to_string()),
        },
        // No magic bytes (TGA has none): let the claimed format's decoder decide
        (None, Some(expected)) => {
            reader.set_format(expected);
            match run_decoder(reader, depth) {
                Ok(()) => DecodeOutcome::Valid(expected),
                Err(_) => DecodeOutcome::UnrecognizedContent,
            }
        }
        (None, None) => DecodeOutcome::UnrecognizedContent,
    }
}

fn run_decoder(reader: ImageReader<Box<dyn ReadSeek>>, depth: VerifyDepth) -> ImageResult<()> {
    match depth {
        VerifyDepth::Header => reader.into_dimensions().map(|_| ()),
        VerifyDepth::Full => reader.decode().map(|_| ()),
    }
}
