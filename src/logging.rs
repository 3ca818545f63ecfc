//! Log setup and the transient log file.
//!
//! Logs go to a file next to the working directory while the menu owns the
//! terminal. The file only lives as long as the process: [`LogFile`] removes
//! it on cleanup.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "gouge.log";

/// Maps `-q` / `-v` flags to a level. Default is INFO.
pub fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initializes the tracing subscriber, writing to `log_file`.
///
/// Falls back to stderr when the file cannot be opened; the returned
/// [`LogFile`] then has nothing to clean up.
pub fn init_logging(verbose: u8, quiet: bool, log_file: &Path) -> LogFile {
    let level = log_level(verbose, quiet);
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("gouge={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match open_log(log_file) {
        Ok(file) => {
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            LogFile::new(log_file)
        }
        Err(e) => {
            let _ = builder.with_writer(io::stderr).try_init();
            tracing::warn!(
                "cannot open log file {}: {}, logging to stderr",
                log_file.display(),
                e
            );
            LogFile::none()
        }
    }
}

/// The transient log file, removed when the process finishes.
#[derive(Debug)]
pub struct LogFile {
    path: Option<PathBuf>,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A guard with nothing to remove.
    pub fn none() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Removes the file. A file that is already gone is not an error, so this
    /// may be called any number of times.
    pub fn cleanup(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
