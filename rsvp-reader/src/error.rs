//! Error types for rsvp-reader

use thiserror::Error;

/// Main error type for the reader service
#[derive(Error, Debug)]
pub enum Error {
    /// Start requested with no readable text
    #[error("Enter some text before starting")]
    EmptyText,

    /// Request body could not be parsed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Library service has no text with this id
    #[error("Text not found: {0}")]
    TextNotFound(i64),

    /// Library service unreachable or returned garbage
    #[error("Library unavailable: {0}")]
    Library(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Shared configuration/IO errors
    #[error(transparent)]
    Common(#[from] rsvp_common::Error),
}

/// Convenience Result type using the reader Error
pub type Result<T> = std::result::Result<T, Error>;
