/// Error types for guarded invocations.
///
/// None of these are recovered from locally: each one aborts the guarded call
/// before the wrapped handler runs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required configuration is missing, e.g. no base URL.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote service answered with a status code >= 400.
    #[error("HTTP error {status}: {body}")]
    Http {
        status: u16,
        /// At most the first [`MAX_ERROR_BODY_CHARS`] characters of the response body.
        body: String,
    },

    /// The remote service answered successfully but the payload is unusable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization errors.
    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

/// Upper bound on the response body kept in [`Error::Http`].
pub const MAX_ERROR_BODY_CHARS: usize = 300;

impl Error {
    /// Build an [`Error::Http`], truncating the body to [`MAX_ERROR_BODY_CHARS`] characters.
    pub fn http(status: u16, body: &str) -> Self {
        Error::Http {
            status,
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        }
    }

    /// The remote status code, if this is an [`Error::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A specialized `Result` type for guard operations.
pub type Result<T> = std::result::Result<T, Error>;
