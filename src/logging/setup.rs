use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;

/// Install the global subscriber: bracketed lines on stdout and, when
/// `log_dir` is given, also in a timestamped file inside it.
///
/// `RUST_LOG` overrides `default_level`. Returns the log file path, if any.
pub fn setup_logging(log_dir: Option<&Path>, default_level: &str) -> io::Result<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, log_path) = match log_dir {
        Some(log_dir) => {
            fs::create_dir_all(log_dir)?;
            let log_path = log_dir.join(log_file_name(chrono::Local::now()));
            let file = fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&log_path)?;
            let layer = fmt::layer()
                .event_format(BracketedFormatter::detailed())
                .with_writer(Mutex::new(file))
                .with_ansi(false);
            (Some(layer), Some(log_path))
        }
        None => (None, None),
    };

    let stdout_layer = fmt::layer()
        .event_format(BracketedFormatter::console())
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    if let Some(path) = &log_path {
        info!("Log file created at: {:?}", path);
    }
    Ok(log_path)
}

fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("dataset_prep_{}.log", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let at = chrono::Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(log_file_name(at), "dataset_prep_20240309_140507.log");
    }
}
