/// Error types for the qqwry library
use std::fmt;

/// Result type alias for qqwry operations
pub type Result<T> = std::result::Result<T, QqwryError>;

/// Main error type for database loading and lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QqwryError {
    /// I/O errors while loading the byte source
    Io(String),

    /// Header or index layout is inconsistent (fatal at construction)
    Format(String),

    /// Address input could not be parsed as a dotted-decimal IPv4 address
    InvalidAddress(String),

    /// A record read ran past the end of the buffer
    TruncatedRecord {
        /// Offset at which the failing read started
        offset: usize,
    },
}

impl fmt::Display for QqwryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QqwryError::Io(msg) => write!(f, "I/O error: {}", msg),
            QqwryError::Format(msg) => write!(f, "Format error: {}", msg),
            QqwryError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            QqwryError::TruncatedRecord { offset } => {
                write!(f, "Truncated record at offset {:#x}", offset)
            }
        }
    }
}

impl std::error::Error for QqwryError {}

impl From<std::io::Error> for QqwryError {
    fn from(err: std::io::Error) -> Self {
        QqwryError::Io(err.to_string())
    }
}
