//! Error types for Elemental.
//!
//! Two families live here.  [`FailureReason`] is the classified outcome of a
//! failed completion; it is a value the conversation records, never something
//! that unwinds.  [`Error`] covers everything else the crate can fail at:
//! settings files, exports, and configuration.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// User-visible notice for credential and configuration failures.
pub const CONFIGURATION_NOTICE: &str =
    "There seems to be an issue with the API configuration. Please check the API key.";

/// User-visible notice for failures that carry no usable message.
pub const UNKNOWN_NOTICE: &str =
    "An unknown error occurred while contacting the AI. Please try again.";

/// User-visible notice for successful responses without a text payload.
pub const MALFORMED_RESPONSE_NOTICE: &str =
    "Sorry, I received an unexpected response. Please try again.";

/// Why a completion request failed.
///
/// The `Display` implementation renders the text shown to the user in the
/// conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The API key is missing or was rejected by the service.
    Configuration,

    /// The service or the transport failed with a descriptive message.
    Service {
        /// Description reported by the service or transport.
        message: String,
    },

    /// The failure carried no usable message.
    Unknown,

    /// The service answered successfully but without a text payload.
    MalformedResponse,
}

impl FailureReason {
    /// Creates a service failure, falling back to [`FailureReason::Unknown`]
    /// when the message is blank.
    pub fn service(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            FailureReason::Unknown
        } else {
            FailureReason::Service { message }
        }
    }

    /// Returns true if this failure is a configuration failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, FailureReason::Configuration)
    }

    /// A short, stable label suitable for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::Configuration => "configuration",
            FailureReason::Service { .. } => "service",
            FailureReason::Unknown => "unknown",
            FailureReason::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Configuration => f.write_str(CONFIGURATION_NOTICE),
            FailureReason::Service { message } => {
                write!(f, "An error occurred: {message}. Please try again.")
            }
            FailureReason::Unknown => f.write_str(UNKNOWN_NOTICE),
            FailureReason::MalformedResponse => f.write_str(MALFORMED_RESPONSE_NOTICE),
        }
    }
}

/// The main error type for Elemental.
#[derive(Clone, Debug)]
pub enum Error {
    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A configuration value was rejected.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that caused the error.
        param: Option<String>,
    },

    /// URL parsing error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if this error is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }

    /// Returns true if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source.as_ref()),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            Error::Validation { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for Elemental operations.
pub type Result<T> = std::result::Result<T, Error>;
