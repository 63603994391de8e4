//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! - `info`: session start, one line per loaded page
//! - `debug`: navigation, slot hits and absences, stale loads
//! - `trace`: every candidate miss
//!
//! `RUST_LOG` overrides the verbosity flag when set.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_ansi: bool,
    /// Append to this file instead of writing to stderr
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_ansi: true,
            log_file: None,
        }
    }
}

impl LogConfig {
    /// - 0: info
    /// - 1 (`-v`): debug
    /// - 2+ (`-vv`): trace
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }
}

/// Where log lines end up
#[derive(Debug)]
enum LogTarget {
    File(File),
    Stderr,
}

/// Install the global subscriber. Call once, before the window opens.
///
/// If the log file cannot be opened, logging still goes to stderr and the
/// open error is returned for the caller to report.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(config.level))
        .with_target(false);

    let (target, open_error) = log_target(config);
    match target {
        LogTarget::File(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        LogTarget::Stderr => builder.with_ansi(config.with_ansi).with_writer(io::stderr).init(),
    }

    match open_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn log_target(config: &LogConfig) -> (LogTarget, Option<io::Error>) {
    let Some(path) = &config.log_file else {
        return (LogTarget::Stderr, None);
    };
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => (LogTarget::File(file), None),
        Err(err) => (LogTarget::Stderr, Some(err)),
    }
}

/// Our crate at `level`; iced, wgpu and friends only at warn
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,slot_gallery={}",
            level.as_str().to_lowercase()
        ))
    })
}
