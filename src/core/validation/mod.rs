mod decode;
mod extensions;
mod validator;

pub use decode::{claimed_format, verify_image, DecodeOutcome, VerifyDepth};
pub use extensions::{ValidExtensions, DEFAULT_VALID_EXTENSIONS};
pub use validator::{
    check_file, validate, validate_with, InvalidImage, InvalidReason, ValidateOptions,
    ValidationReport,
};
