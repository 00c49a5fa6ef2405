//! Error types for API calls and client-side state

use std::fmt;

use reqwest::StatusCode;

/// Result type alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the backend
#[derive(Debug)]
pub enum ApiError {
    /// Request never produced a response (DNS, connect, timeout, ...)
    Transport(reqwest::Error),

    /// Backend answered with a non-success status
    Status { status: StatusCode, message: String },

    /// Backend rejected the bearer token
    Unauthorized,

    /// Response body did not match the expected JSON shape
    Decode(String),

    /// Call requires a session but none is stored
    NotAuthenticated,
}

impl ApiError {
    /// Build an error from a failed response, preferring the backend's own message
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }

        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .or_else(|| value.get("message"))
                    .or_else(|| value.get("detail"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });

        ApiError::Status { status, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "connection failed: {}", err),
            ApiError::Status { status, message } => {
                write!(f, "API error ({}): {}", status.as_u16(), message)
            }
            ApiError::Unauthorized => write!(f, "session expired, log in again"),
            ApiError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            ApiError::NotAuthenticated => write!(f, "not logged in"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type alias for state store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while persisting client state
#[derive(Debug)]
pub enum StoreError {
    /// I/O error (file access, etc.)
    Io(std::io::Error),

    /// Persisted state could not be (de)serialized
    Serialization(String),

    /// In-memory state lock was poisoned by a panicking writer
    Poisoned,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "I/O error: {}", err),
            StoreError::Serialization(msg) => write!(f, "state serialization error: {}", msg),
            StoreError::Poisoned => write!(f, "state lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_uses_backend_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error": "domain taken"}"#);
        assert_eq!(err.to_string(), "API error (400): domain taken");
    }

    #[test]
    fn status_error_accepts_message_field() {
        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"message": "already exists"}"#);
        assert_eq!(err.to_string(), "API error (409): already exists");
    }

    #[test]
    fn status_error_falls_back_to_reason() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(err.to_string(), "API error (502): Bad Gateway");
    }

    #[test]
    fn unauthorized_is_its_own_variant() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
