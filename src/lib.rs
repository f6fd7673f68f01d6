// Caretaker Library - Public API

// Re-export error types
pub mod error;
pub use error::{CaretakerError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Initialize logging
///
/// `RUST_LOG` still wins over `level` when it is set. When `log_file` is
/// given, records are appended to it in addition to stderr.
pub fn init_logging(level: log::LevelFilter, log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
            }
            Err(e) => eprintln!("Failed to open log file {}: {}", path.display(), e),
        }
    }

    // A second init (tests, repeated runs) is harmless.
    let _ = builder.try_init();
}

/// Writes every log record to stderr and to the log file
struct TeeWriter {
    file: std::fs::File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()?;
        self.file.flush()
    }
}
