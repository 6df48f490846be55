use thiserror::Error;

/// Failure of a single call against the DevSwipe REST API.
///
/// Cloneable so one in-flight page fetch can hand the same outcome to every
/// caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request did not complete: {0}")]
    Network(String),
    #[error("credentials expired or missing")]
    AuthExpired,
    #[error("request rejected ({status}): {message}")]
    Validation { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Maps a non-success, non-401 status onto the validation/server split.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 401 {
            ApiError::AuthExpired
        } else if status >= 500 {
            ApiError::Server { status, message }
        } else {
            ApiError::Validation { status, message }
        }
    }

    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }

    /// Whether the UI may offer a manual retry for the same request.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::AuthExpired | ApiError::InvalidUrl(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} is out of range for {len} buffered items")]
pub struct OutOfRange {
    pub index: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
    #[error("feed session must be created inside a tokio runtime")]
    NoRuntime,
}
