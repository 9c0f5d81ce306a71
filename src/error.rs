//! Error types for request resolution and transport.
//!
//! These errors never escape [`Dispatcher::request`](crate::Dispatcher::request);
//! the dispatcher converts them into the failure response. They are visible to
//! [`Processor`](crate::Processor) implementations, to
//! [`Dispatcher::resolve`](crate::Dispatcher::resolve), and to code that calls
//! [`UnifiedResponse::from_raw`](crate::UnifiedResponse::from_raw) directly.

/// The main error type.
///
/// # Examples
///
/// ```
/// use unified_network::{Error, RawResponse, UnifiedResponse};
///
/// let raw = RawResponse::new(200, "not json")
///     .with_header("content-type", "application/json")
///     .unwrap();
///
/// match UnifiedResponse::from_raw(raw) {
///     Err(Error::DeserializationFailed { raw_response, status, .. }) => {
///         assert_eq!(raw_response, "not json");
///         assert_eq!(status, 200);
///     }
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The default transport failed (connection refused, DNS lookup failed,
    /// invalid URL, etc.).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A custom processor reported a failure.
    #[error("Processor error: {0}")]
    Processor(String),

    /// A successful response claimed to be JSON but its body did not parse.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to parse
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: u16,
    },

    /// A structured request body could not be encoded as JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Invalid configuration was provided, such as an unknown method name or
    /// an invalid header.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl Error {
    /// Creates a [`Error::Processor`] from any displayable message.
    pub fn processor(message: impl std::fmt::Display) -> Self {
        Error::Processor(message.to_string())
    }

    /// Returns `true` if the request never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Processor(_))
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
