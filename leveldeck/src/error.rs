//! Error types for `leveldeck`
//!
//! One error enum per layer (storage, startup, lookup, transport) plus the
//! top-level [`LevelDeckError`] that the binary maps to an exit code.

use leveldeck_core::ValidationError;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `leveldeck` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// One or more level documents failed validation
    pub const VALIDATION_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied, oversized document)
    pub const IO_ERROR: i32 = 3;

    /// Transport error (bind failed, invalid address)
    pub const TRANSPORT_ERROR: i32 = 4;

    /// Repository could not be initialized
    pub const STARTUP_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `leveldeck` operations.
#[derive(Debug, Error)]
pub enum LevelDeckError {
    /// The level repository could not be built
    #[error(transparent)]
    Startup(#[from] StartupError),

    /// Storage access failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Transport layer error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Offline validation rejected at least one document
    #[error("{failed} of {total} level document(s) failed validation")]
    Invalid {
        /// Number of documents that failed
        failed: usize,
        /// Number of documents checked
        total: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LevelDeckError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Startup(_) => ExitCode::STARTUP_ERROR,
            Self::Invalid { .. } => ExitCode::VALIDATION_ERROR,
            Self::Storage(_) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Transport(_) => ExitCode::TRANSPORT_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Failure Classification
// ============================================================================

/// Coarse classification of a per-request failure.
///
/// The repository only classifies; the transport adapter decides how each
/// kind is surfaced to remote callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The identifier is not in the catalog
    NotFound,
    /// The stored document is not a valid level
    Validation,
    /// The stored document could not be read
    Storage,
}

impl FailureKind {
    /// Stable lowercase label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "invalid",
            Self::Storage => "storage_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Storage Errors
// ============================================================================

/// Errors raised by a [`LevelStore`](crate::repository::LevelStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage location does not exist
    #[error("storage location {location} does not exist")]
    LocationMissing {
        /// Human-readable storage location
        location: String,
    },

    /// Reading from the storage medium failed
    #[error("failed to read {location}: {source}")]
    Io {
        /// What was being read
        location: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No document is stored under the identifier
    #[error("no document stored for level '{id}'")]
    Missing {
        /// Requested identifier
        id: String,
    },

    /// Two documents map to the same identifier
    #[error("level identifier '{id}' is ambiguous: {first} and {second}")]
    AmbiguousId {
        /// Identifier shared by both documents
        id: String,
        /// First document found
        first: String,
        /// Second document found
        second: String,
    },

    /// File extension is not a known document format
    #[error("{location} is not a .json, .yaml or .yml document")]
    UnsupportedFormat {
        /// Offending file
        location: String,
    },

    /// Identifier cannot be used as a storage address
    #[error("invalid level identifier '{id}'")]
    InvalidId {
        /// Rejected identifier
        id: String,
    },

    /// Document exceeds the configured size limit
    #[error("document {location} is too large: {size} bytes (limit: {limit})")]
    TooLarge {
        /// Offending document
        location: String,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },
}

// ============================================================================
// Startup Errors
// ============================================================================

/// Fatal repository initialization errors.
///
/// The service must not begin serving when any of these occur.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The storage location is absent
    #[error("level storage {location} does not exist")]
    MissingLocation {
        /// Storage location that was scanned
        location: String,
    },

    /// Enumerating identifiers failed
    #[error("failed to enumerate levels in {location}: {source}")]
    Enumeration {
        /// Storage location that was scanned
        location: String,
        /// Underlying storage error
        #[source]
        source: StorageError,
    },

    /// The storage location holds no level documents
    #[error("no level documents found in {location}")]
    EmptyCatalog {
        /// Storage location that was scanned
        location: String,
    },
}

// ============================================================================
// Lookup Errors
// ============================================================================

/// Per-request lookup failures.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The identifier is not in the catalog
    #[error("level '{id}' not found")]
    NotFound {
        /// Requested identifier
        id: String,
    },

    /// The stored document failed validation
    #[error("level '{id}' is invalid: {source}")]
    Invalid {
        /// Requested identifier
        id: String,
        /// Validation failure
        #[source]
        source: ValidationError,
    },

    /// The stored document could not be read
    #[error("level '{id}' could not be read: {source}")]
    Storage {
        /// Requested identifier
        id: String,
        /// Storage failure
        #[source]
        source: StorageError,
    },
}

impl LookupError {
    /// Classifies this failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Invalid { .. } => FailureKind::Validation,
            Self::Storage { .. } => FailureKind::Storage,
        }
    }

    /// Returns the identifier that was looked up.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::NotFound { id } | Self::Invalid { id, .. } | Self::Storage { id, .. } => id,
        }
    }
}

// ============================================================================
// Transport Errors
// ============================================================================

/// HTTP transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Bind address could not be parsed
    #[error("invalid bind address \"{input}\": {message}")]
    InvalidAddress {
        /// Address as given
        input: String,
        /// Parser message
        message: String,
    },

    /// Failed to bind the listener
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The server loop terminated with an error
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `leveldeck` operations.
pub type Result<T> = std::result::Result<T, LevelDeckError>;

// ============================================================================
// Tests
// ============================================================================
