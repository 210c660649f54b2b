//! Logging for the dataset preparation tools
//!
//! This module provides:
//! - Custom log formatting with bracketed output
//! - Stdout logging with an optional timestamped log file

mod formatter;
mod setup;

pub use formatter::BracketedFormatter;
pub use setup::setup_logging;
