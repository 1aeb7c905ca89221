//! Filesystem utilities.
//!
//! # Logging
//!
//! The `logger` submodule provides a file-based logger that writes to
//! `helmsman.log`. This is useful for replaying what a maneuver did after the
//! robot has stopped.
//!
//! # Example
//!
//! ```ignore
//! use helmsman::fs::logger;
//! use log::{LevelFilter, info};
//!
//! // Initialize the logger at program start
//! logger::init(LevelFilter::Debug).expect("Failed to initialize logger");
//!
//! // Now you can use standard logging macros
//! info!("Robot initialized successfully");
//! ```

/// File-based logging.
///
/// Provides a logger implementation that writes to both the console
/// and a file.
pub mod logger;
