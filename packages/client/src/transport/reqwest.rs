//! Default transport backed by `reqwest`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use futures::future::BoxFuture;

use super::{Transport, TransportError, TransportRequest, TransportResponse};

/// A [`Transport`] over a pool of `reqwest` clients.
///
/// Session-level configuration (currently only the timeout) lives on the
/// client, not the request, so one client is built and cached per distinct
/// timeout value; requests without a timeout share the default client.
pub struct ReqwestTransport {
    default_client: ::reqwest::Client,
    clients: Mutex<HashMap<Duration, ::reqwest::Client>>,
}

static SHARED: OnceLock<Arc<ReqwestTransport>> = OnceLock::new();

impl ReqwestTransport {
    /// A transport over a fresh default client.
    #[must_use]
    pub fn new() -> Self {
        ReqwestTransport {
            default_client: ::reqwest::Client::new(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide shared transport, built on first use.
    pub fn shared() -> Arc<ReqwestTransport> {
        SHARED.get_or_init(|| Arc::new(ReqwestTransport::new())).clone()
    }

    fn client_for(&self, timeout: Option<Duration>) -> ::reqwest::Client {
        let Some(timeout) = timeout else {
            return self.default_client.clone();
        };
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(client) = clients.get(&timeout) {
            return client.clone();
        }
        match ::reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => {
                clients.insert(timeout, client.clone());
                client
            }
            Err(e) => {
                log::warn!("failed to build client for timeout {timeout:?}: {e}; using default");
                self.default_client.clone()
            }
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        ReqwestTransport::new()
    }
}

impl Transport for ReqwestTransport {
    fn submit(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'static, Result<TransportResponse, TransportError>> {
        let client = self.client_for(request.timeout);
        Box::pin(async move {
            let mut builder = client
                .request(request.method, request.url.to_string())
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(classify)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(classify)?;

            Ok(TransportResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn classify(e: ::reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_builder() || e.is_request() {
        TransportError::InvalidRequest(e.to_string())
    } else {
        TransportError::Io(e.to_string())
    }
}
