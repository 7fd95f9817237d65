//! Printer error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for printer operations.
pub type PrinterResult<T> = Result<T, PrinterError>;

/// Errors that can occur while opening or writing to the printer.
#[derive(Debug, Error)]
pub enum PrinterError {
    /// The device could not be opened.
    #[error("failed to open printer device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The device opened but could not be configured.
    #[error("failed to configure printer device {path}: {source}")]
    Configure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The requested baud rate has no serial line setting.
    #[error("unsupported baud rate {0} (use 9600, 19200, 38400, 57600 or 115200)")]
    UnsupportedBaud(u32),

    /// Writing to the device failed.
    #[error("printer write failed: {0}")]
    Io(#[from] io::Error),
}

impl PrinterError {
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub fn configure(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Configure {
            path: path.into(),
            source,
        }
    }
}
