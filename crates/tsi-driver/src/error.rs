//! Error types for line, pointer and driver operations.
//!
//! Every error in this module is fatal to the receive loop. Soft per-frame
//! verdicts live in [`tsi_protocol::FrameError`] and never surface here.

use std::io;

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// Failure of a clock or data line.
#[derive(Debug, Error)]
pub enum LineError {
    /// The line could not be acquired (export, open or permission failure).
    #[error("line {line} unavailable: {source}")]
    Unavailable {
        /// Human-readable line name, e.g. `gpio26`.
        line: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Reading, writing or waiting on an acquired line failed.
    #[error("line {line} I/O failure: {source}")]
    Io {
        /// Human-readable line name.
        line: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The line reported something that is not a logic level.
    #[error("line {line} returned unexpected value {value:?}")]
    InvalidValue {
        /// Human-readable line name.
        line: String,
        /// The raw value that was read.
        value: String,
    },
}

impl LineError {
    /// Create an [`LineError::Unavailable`] error.
    #[must_use]
    pub fn unavailable(line: impl Into<String>, source: io::Error) -> Self {
        Self::Unavailable {
            line: line.into(),
            source,
        }
    }

    /// Create an [`LineError::Io`] error.
    #[must_use]
    pub fn io(line: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            line: line.into(),
            source,
        }
    }

    /// Create an [`LineError::InvalidValue`] error.
    #[must_use]
    pub fn invalid_value(line: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            line: line.into(),
            value: value.into(),
        }
    }

    /// Name of the line that failed.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::Unavailable { line, .. }
            | Self::Io { line, .. }
            | Self::InvalidValue { line, .. } => line,
        }
    }
}

impl embedded_hal::digital::Error for LineError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Failure of the host pointer-injection facility.
#[derive(Debug, Error)]
pub enum PointerError {
    /// The virtual pointer device could not be created.
    #[error("pointer device unavailable: {0}")]
    Unavailable(#[source] io::Error),

    /// Emitting an event to the pointer device failed.
    #[error("pointer I/O failure: {0}")]
    Io(#[source] io::Error),
}

/// Errors that stop the driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A clock or data line failed.
    #[error(transparent)]
    Line(#[from] LineError),

    /// The pointer device failed.
    #[error(transparent)]
    Pointer(#[from] PointerError),

    /// The supplied configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DriverError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Short machine-readable name, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Pointer(_) => "pointer",
            Self::InvalidConfiguration(_) => "configuration",
        }
    }
}

/// A specialized `Result` type for line operations.
pub type LineResult<T> = Result<T, LineError>;

/// A specialized `Result` type for pointer operations.
pub type PointerResult<T> = Result<T, PointerError>;

/// A specialized `Result` type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
