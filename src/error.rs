use thiserror::Error;

/// Result type alias for SACD operations
pub type Result<T> = std::result::Result<T, SacdError>;

/// Errors that can occur when reading SACD images or extracting tracks
#[derive(Debug, Error)]
pub enum SacdError {
    /// I/O error occurred while seeking, reading, opening or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signature mismatch or truncated table of contents
    #[error("Invalid SACD file: {0}")]
    InvalidFile(String),

    /// Requested area is not present on the disc
    #[error("Invalid area: {0}")]
    InvalidArea(String),

    /// Track index out of range for the area
    #[error("Invalid track {index} (area has {count} tracks)")]
    InvalidTrack {
        /// Requested 0-based track index
        index: usize,
        /// Number of tracks in the area
        count: usize,
    },

    /// A buffer could not be allocated
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// The operation was stopped on request
    #[error("Operation cancelled")]
    Cancelled,

    /// Data the library knows about but cannot process
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Precondition violation, such as mutating the queue while running
    #[error("{0}")]
    Error(String),
}

/// Coarse classification of a [`SacdError`], one per result code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// General error
    Error,
    /// Invalid or corrupted SACD file
    InvalidFile,
    /// Invalid area specification
    InvalidArea,
    /// Invalid track specification
    InvalidTrack,
    /// Out of memory
    OutOfMemory,
    /// Input/output error
    Io,
    /// Operation cancelled
    Cancelled,
    /// Unsupported data
    Unsupported,
}

impl ErrorKind {
    /// Human-readable description of the result code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::Error => "General error",
            ErrorKind::InvalidFile => "Invalid or corrupted SACD file",
            ErrorKind::InvalidArea => "Invalid area specification",
            ErrorKind::InvalidTrack => "Invalid track specification",
            ErrorKind::OutOfMemory => "Out of memory",
            ErrorKind::Io => "Input/output error",
            ErrorKind::Cancelled => "Operation cancelled",
            ErrorKind::Unsupported => "Unsupported data",
        }
    }
}

impl SacdError {
    /// Create an invalid file error
    pub fn invalid_file<S: Into<String>>(message: S) -> Self {
        SacdError::InvalidFile(message.into())
    }

    /// Create an invalid area error
    pub fn invalid_area<S: Into<String>>(message: S) -> Self {
        SacdError::InvalidArea(message.into())
    }

    /// Create an out of memory error
    pub fn out_of_memory<S: Into<String>>(message: S) -> Self {
        SacdError::OutOfMemory(message.into())
    }

    /// Create an unsupported data error
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        SacdError::Unsupported(message.into())
    }

    /// Create a generic precondition error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        SacdError::Error(message.into())
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SacdError::Io(_) => ErrorKind::Io,
            SacdError::InvalidFile(_) => ErrorKind::InvalidFile,
            SacdError::InvalidArea(_) => ErrorKind::InvalidArea,
            SacdError::InvalidTrack { .. } => ErrorKind::InvalidTrack,
            SacdError::OutOfMemory(_) => ErrorKind::OutOfMemory,
            SacdError::Cancelled => ErrorKind::Cancelled,
            SacdError::Unsupported(_) => ErrorKind::Unsupported,
            SacdError::Error(_) => ErrorKind::Error,
        }
    }

    /// Check whether this error is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SacdError::Cancelled)
    }
}
