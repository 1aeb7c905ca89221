//! File-based logger implementation.
//!
//! This module implements the [`log`] crate's logging facade, writing log
//! messages to both the console and a log file. The motion maneuvers report
//! their progress through `log` only, so whatever this logger records is pure
//! diagnostics: nothing in the control loops reads it back.
//!
//! # Usage
//!
//! Initialize the logger once at the start of your program:
//!
//! ```ignore
//! use helmsman::fs::logger;
//! use log::{LevelFilter, info};
//!
//! logger::init(LevelFilter::Debug).expect("Logger init failed");
//! info!("Program started");
//! ```
//!
//! # Log Output
//!
//! Logs are written to `helmsman.log` in the working directory unless another
//! path is given to [`init_with_path`]. Each log entry includes:
//! - Log level (TRACE, DEBUG, INFO, WARN, ERROR)
//! - Timestamp (time since the logger was initialized)
//! - Target (module path)
//! - Message
//!
//! Example output:
//! ```text
//! INFO [2s 15ms] helmsman::motion::sequencer - Rotate 90.0 deg (sensor setpoint -90.0)
//! DEBUG [2s 512ms] helmsman::motion::sequencer::turn - On target at -89.95 deg
//! ```

use std::{
    fmt,
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use humantime::format_duration;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// Default log file name.
pub const LOG_FILE: &str = "helmsman.log";

/// A dual-output logger.
///
/// Writes log messages to both the console and a file. The file is
/// created/truncated when the logger is initialized.
pub struct HelmLogger {
    started:     Instant,
    /// Buffered file writer for log output.
    ///
    /// `None` if the file could not be opened (read-only media, missing
    /// directory); console output still works.
    file_writer: Mutex<Option<BufWriter<std::fs::File>>>,
}

impl HelmLogger {
    fn new(path: &Path) -> Self {
        let file_writer = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .ok()
            .map(BufWriter::new);

        Self {
            started:     Instant::now(),
            file_writer: Mutex::new(file_writer),
        }
    }
}

impl log::Log for HelmLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_line = format_line(
                record.level(),
                self.started.elapsed(),
                record.target(),
                record.args(),
            );

            // Print to console
            print!("{}", log_line);

            if let Ok(mut writer_guard) = self.file_writer.lock() {
                if let Some(ref mut writer) = *writer_guard {
                    let _ = writer.write_all(log_line.as_bytes());
                }
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut writer_guard) = self.file_writer.lock() {
            if let Some(ref mut writer) = *writer_guard {
                let _ = writer.flush();
            }
        }
    }
}

static LOGGER: OnceLock<HelmLogger> = OnceLock::new();

/// Initializes the logger, writing to [`LOG_FILE`].
///
/// This function must be called once before any logging macros are used.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> { init_with_path(level, LOG_FILE) }

/// Initializes the logger, writing to `path`.
///
/// # Arguments
///
/// * `level` - The minimum log level to record. Use [`LevelFilter::Trace`] to
///   see every control cycle, [`LevelFilter::Info`] for one line per maneuver.
/// * `path` - Log file location. The file is truncated.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init_with_path(level: LevelFilter, path: impl AsRef<Path>) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| HelmLogger::new(path.as_ref()));
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

fn format_line(level: Level, elapsed: Duration, target: &str, args: &fmt::Arguments) -> String {
    // whole milliseconds keep the timestamp short
    let elapsed = Duration::from_millis(elapsed.as_millis() as u64);
    format!("{} [{}] {} - {}\n", level, format_duration(elapsed), target, args)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use log::{Level, LevelFilter, debug, error, info, trace, warn};

    use super::format_line;

    #[test]
    fn line_format() {
        let line = format_line(
            Level::Info,
            Duration::from_micros(2_015_900),
            "helmsman::motion::sequencer",
            &format_args!("Drive finished: {:?}", "Reached"),
        );
        assert_eq!(
            line,
            "INFO [2s 15ms] helmsman::motion::sequencer - Drive finished: \"Reached\"\n"
        );
    }

    #[test]
    #[ignore = "filesystem access needed (file write)"]
    fn log_full_test() {
        let path = std::env::temp_dir().join("helmsman-logger-test.log");
        super::init_with_path(LevelFilter::Trace, &path).expect("Failed to initialize logger");

        trace!("This is a trace message");
        debug!("This is a debug message");
        info!("This is an info message");
        warn!("This is a warning message");
        error!("This is an error message");

        log::logger().flush();

        let written = std::fs::read_to_string(&path).expect("log file missing");
        assert_eq!(written.lines().count(), 5);
        assert!(written.contains("WARN"));
    }
}
