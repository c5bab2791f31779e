//! Error types for the peakscope crate.
//!
//! One enum covers ingestion, parameter validation, peak detection and the
//! HTTP layer. Every variant is terminal for the request that raised it.

use axum::http::StatusCode;
use thiserror::Error;

/// Error type for peakscope operations.
#[derive(Debug, Error)]
pub enum PeakscopeError {
    /// Required columns are absent from an uploaded file or a submitted table.
    #[error("data is missing columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Names of the missing columns, in declaration order.
        columns: Vec<String>,
    },

    /// No row survived numeric coercion.
    #[error("no valid data found in the {source_kind} file")]
    EmptyAfterCleaning {
        /// Short name of the source format ("CSV" or "TXT").
        source_kind: &'static str,
    },

    /// The file extension is not one the service accepts.
    #[error("unsupported file type: '{filename}' (only CSV and TXT files are allowed)")]
    UnsupportedFileType {
        /// Name of the rejected file as submitted.
        filename: String,
    },

    /// The upload request carried no usable file.
    #[error("{message}")]
    MissingUpload {
        /// Human readable reason.
        message: String,
    },

    /// A detection parameter is not a finite non-negative real number.
    #[error("invalid value for parameter '{field}': {raw} ({reason})")]
    InvalidParameter {
        /// Parameter name (`height`, `distance`, `prominence` or `width`).
        field: &'static str,
        /// Raw value as received.
        raw: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The submitted data does not have the expected shape.
    #[error("malformed input: {message}")]
    MalformedInputShape {
        /// Description of the mismatch.
        message: String,
    },

    /// The request body exceeds the configured size limit.
    #[error("{message}")]
    PayloadTooLarge {
        /// Human readable reason, including the limit when known.
        message: String,
    },

    /// The service configuration could not be loaded.
    #[error("configuration error in '{path}': {message}")]
    Config {
        /// File or environment variable the bad value came from.
        path: String,
        /// Error message describing the failure.
        message: String,
    },

    /// Multipart body could not be read.
    #[error("invalid upload body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// I/O error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV framing error wrapper.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Arrow record batch construction failed.
    #[cfg(feature = "parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Parquet writer failed.
    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Result type alias for peakscope operations.
pub type Result<T> = std::result::Result<T, PeakscopeError>;

impl PeakscopeError {
    /// Returns true if the error is a deterministic consequence of the
    /// caller's input rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            PeakscopeError::MissingColumns { .. }
            | PeakscopeError::EmptyAfterCleaning { .. }
            | PeakscopeError::UnsupportedFileType { .. }
            | PeakscopeError::MissingUpload { .. }
            | PeakscopeError::InvalidParameter { .. }
            | PeakscopeError::MalformedInputShape { .. }
            | PeakscopeError::PayloadTooLarge { .. } => true,
            PeakscopeError::Multipart(err) => err.status().is_client_error(),
            _ => false,
        }
    }

    /// HTTP status the service answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PeakscopeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PeakscopeError::Multipart(err) => err.status(),
            _ if self.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
