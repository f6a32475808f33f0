//! Error types for the clip cleaning pipeline

use std::fmt;

/// Errors that can occur while loading, cleaning or writing clips
#[derive(Debug, Clone, PartialEq)]
pub enum CleanError {
    /// Invalid input parameters (bad path, zero sample rate, ...)
    InvalidInput(String),

    /// File extension is not one of the recognised audio formats,
    /// or the format has no decoder/encoder
    UnsupportedFormat(String),

    /// Threshold configuration breaks an invariant
    /// (e.g. burst threshold not above silence threshold)
    ConfigInvariantViolation(String),

    /// Audio decoding error
    DecodingError(String),

    /// Audio encoding error
    EncodingError(String),

    /// Filesystem error
    Io(String),
}

impl fmt::Display for CleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CleanError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            CleanError::ConfigInvariantViolation(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            CleanError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            CleanError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            CleanError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for CleanError {}

impl From<std::io::Error> for CleanError {
    fn from(err: std::io::Error) -> Self {
        CleanError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = CleanError::UnsupportedFormat(".ogg".to_string());
        assert_eq!(err.to_string(), "Unsupported format: .ogg");

        let err = CleanError::ConfigInvariantViolation("burst <= silence".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: burst <= silence");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.wav");
        let err: CleanError = io.into();
        assert!(matches!(err, CleanError::Io(ref msg) if msg.contains("missing.wav")));
    }
}
