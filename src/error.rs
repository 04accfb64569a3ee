//! Error types for embedbridge.
//!
//! Every failure that crosses the provider boundary is a [`ProviderError`].
//! Lower-level errors (HTTP, JSON, signing, number parsing) only ever reach
//! callers as its `source`.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed low-level cause carried by a [`ProviderError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Broad category of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required credential, endpoint or option missing at construction time.
    Config,
    /// Network failure, non-2xx status, or client-level failure.
    Transport,
    /// Response body could not be parsed as JSON.
    MalformedResponse,
    /// Parsed response had no usable vectors, or fewer than requested.
    MissingVector,
    /// A vector contained an element that is not a finite number.
    NonNumericVector,
    /// Credential could not be produced, refreshed, or was rejected twice.
    Credential,
    /// The worker running a blocking call failed.
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Config => "configuration error",
            ErrorKind::Transport => "transport error",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::MissingVector => "missing vector",
            ErrorKind::NonNumericVector => "non-numeric vector",
            ErrorKind::Credential => "credential error",
            ErrorKind::Runtime => "runtime error",
        };
        f.write_str(label)
    }
}

/// The single error type surfaced by every embedding provider.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ProviderError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ProviderError {
    /// Create an error without an underlying cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping the original low-level failure.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn missing_vector(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingVector, message)
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Credential, message)
    }

    /// Category of this failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message, without the cause.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The original low-level error, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
