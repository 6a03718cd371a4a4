//! Error taxonomy for request dispatch.
//!
//! Construction problems (missing or duplicate `Url`, unreadable multipart
//! file) are programmer errors and panic at descriptor build time. Everything
//! past dispatch flows through one of two shapes: [`RequestError`] delivered
//! to the `on_error` callback, or the unified [`Error`] raised by the
//! direct-return entry points (`response()` / `object()`).

use bytes::Bytes;
use http::StatusCode;

use crate::transport::TransportError;

/// The classified failure delivered to a registered `on_error` callback.
///
/// Carries the HTTP status code and raw error body when a response was
/// received, or the transport failure when the request never completed.
/// Any status outside `[200, 300)` is uniformly an error at this layer;
/// 3xx/4xx/5xx are not distinguished.
#[derive(Debug, Clone)]
pub enum RequestError {
    /// The server responded with a non-2xx status.
    Status {
        /// Response status code.
        code: StatusCode,
        /// Raw response body, useful for error payload inspection.
        body: Bytes,
    },
    /// The request never produced a response (timeout, DNS, connect, ...).
    Transport(TransportError),
}

impl RequestError {
    /// The HTTP status code, when a response was received.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { code, .. } => Some(*code),
            RequestError::Transport(_) => None,
        }
    }

    /// The raw error body, when a response was received.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            RequestError::Status { body, .. } => Some(body),
            RequestError::Transport(_) => None,
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Status { code, .. } => write!(f, "HTTP status error ({code})"),
            RequestError::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Status { .. } => None,
            RequestError::Transport(e) => Some(e),
        }
    }
}

/// Unified error surfaced by the suspend-and-return entry points.
///
/// Unlike the callback path, where decode failures are swallowed per
/// callback kind, `response()` and `object()` surface every failure mode
/// to the awaiting caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure before a response was produced.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server responded outside the `[200, 300)` success range.
    #[error("HTTP status error ({code})")]
    Status {
        /// Response status code.
        code: StatusCode,
        /// Raw response body.
        body: Bytes,
    },

    /// The response body could not be decoded into the requested type.
    #[error("error decoding response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Status { code, body } => Error::Status { code, body },
            RequestError::Transport(e) => Error::Transport(e),
        }
    }
}
