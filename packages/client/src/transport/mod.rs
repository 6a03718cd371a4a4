//! The transport boundary.
//!
//! The executor produces a [`TransportRequest`] and consumes a
//! [`TransportResponse`]; everything between - TLS, DNS, redirects,
//! connection pooling - belongs to the [`Transport`] implementation.
//! The default implementation is [`ReqwestTransport`], behind the
//! `reqwest` feature. Tests supply their own mock transports.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

#[cfg(feature = "reqwest")]
mod reqwest;
#[cfg(feature = "reqwest")]
pub use self::reqwest::ReqwestTransport;

/// A fully-assembled wire request, ready for submission.
///
/// `timeout` is session-level configuration: it applies to the client
/// performing the dispatch, not to the request object itself.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL, query component included.
    pub url: Url,
    /// Header fields, last write per name already applied.
    pub headers: HeaderMap,
    /// Payload, when one was declared.
    pub body: Option<Bytes>,
    /// Session-level timeout, when one was declared.
    pub timeout: Option<Duration>,
}

/// The transport's answer: status, headers and the full body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response header fields.
    pub headers: HeaderMap,
    /// Complete response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Whether the status is in the `[200, 300)` success range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Transport-level failure: the request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The configured timeout elapsed.
    #[error("request timeout")]
    Timeout,

    /// Connection could not be established (DNS, refused, TLS, ...).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be constructed or submitted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other I/O failure while talking to the peer.
    #[error("transport I/O error: {0}")]
    Io(String),
}

/// The capability consumed by the executor.
///
/// `submit` owns the request and resolves once the peer has answered with
/// a complete response, or with a classified [`TransportError`]. It must
/// not block other concurrently-submitted requests.
pub trait Transport: Send + Sync {
    /// Perform one wire exchange.
    fn submit(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'static, Result<TransportResponse, TransportError>>;
}

/// The transport used by descriptors that were not given an explicit one.
pub(crate) fn default_transport() -> Arc<dyn Transport> {
    #[cfg(feature = "reqwest")]
    {
        ReqwestTransport::shared()
    }
    #[cfg(not(feature = "reqwest"))]
    {
        Arc::new(Unconfigured)
    }
}

/// Placeholder transport when no default is compiled in.
#[cfg(not(feature = "reqwest"))]
struct Unconfigured;

#[cfg(not(feature = "reqwest"))]
impl Transport for Unconfigured {
    fn submit(
        &self,
        _request: TransportRequest,
    ) -> BoxFuture<'static, Result<TransportResponse, TransportError>> {
        Box::pin(async {
            Err(TransportError::InvalidRequest(
                "no default transport compiled in; enable the `reqwest` feature or supply one \
                 with `with_transport`"
                    .to_owned(),
            ))
        })
    }
}
