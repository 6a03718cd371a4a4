//! Request descriptors and dispatch.
//!
//! An [`AnyRequest`] is the fully-flattened, immutable description of one
//! HTTP request plus the callbacks registered for its outcome. Callback
//! registration is functional: each `on_*` method consumes the descriptor
//! and returns an updated one, so a descriptor can be shared and re-used
//! from several call sites without callback leakage or locking.
//!
//! # Errors are opt-in
//!
//! A failing outcome with no `on_error` callback registered produces no
//! observable effect beyond the omission of the success callbacks. Callers
//! must register `on_error` explicitly to observe failures.
//!
//! # Silent decode skips
//!
//! On a successful HTTP outcome, each response callback kind is delivered
//! independently: if the body is not valid UTF-8 the `on_string` callback
//! is skipped, if it is not parseable JSON the `on_json` callback is
//! skipped, and if typed decoding fails the `on_object` callback is
//! skipped - without downgrading the outcome or notifying `on_error`.
//! This is a deliberate compatibility choice; be aware that it can hide
//! data problems. The direct-return entry points ([`AnyRequest::response`]
//! and [`AnyRequest::object`]) surface every failure instead.

pub mod chain;
pub mod executor;
pub mod group;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::error::{Error, RequestError};
use crate::json::Json;
use crate::param::{self, Param};
use crate::transport::{self, Transport, TransportResponse};

pub use chain::RequestChain;
pub use group::RequestGroup;

/// A request whose typed `on_object` callback decodes into plain JSON.
pub type Request = AnyRequest<serde_json::Value>;

/// The registered response callbacks. All are optional and independently
/// delivered.
pub(crate) struct Callbacks<T> {
    pub(crate) on_data: Option<Arc<dyn Fn(Bytes) + Send + Sync>>,
    pub(crate) on_string: Option<Arc<dyn Fn(String) + Send + Sync>>,
    pub(crate) on_json: Option<Arc<dyn Fn(Json) + Send + Sync>>,
    pub(crate) on_object: Option<Arc<dyn Fn(T) + Send + Sync>>,
    pub(crate) on_status: Option<Arc<dyn Fn(StatusCode) + Send + Sync>>,
    pub(crate) on_error: Option<Arc<dyn Fn(RequestError) + Send + Sync>>,
}

impl<T> Clone for Callbacks<T> {
    fn clone(&self) -> Self {
        Callbacks {
            on_data: self.on_data.clone(),
            on_string: self.on_string.clone(),
            on_json: self.on_json.clone(),
            on_object: self.on_object.clone(),
            on_status: self.on_status.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Callbacks {
            on_data: None,
            on_string: None,
            on_json: None,
            on_object: None,
            on_status: None,
            on_error: None,
        }
    }
}

/// Recurring re-dispatch trigger.
pub(crate) enum Update {
    /// Re-dispatch on a fixed interval. The supervisory loop holds a
    /// `Weak` of the token and exits once the descriptor is dropped.
    Every {
        period: Duration,
        alive: Arc<()>,
    },
    /// Re-dispatch on each tick from an external source. Consumed by the
    /// first `call()`.
    On(Mutex<Option<mpsc::Receiver<()>>>),
}

/// The immutable descriptor of one HTTP request.
///
/// Built from declarative [`Param`] blocks and dispatched either
/// fire-and-forget through [`call`](AnyRequest::call) or directly awaited
/// through [`response`](AnyRequest::response) /
/// [`object`](AnyRequest::object).
///
/// ```no_run
/// use declareq_client::param::Param;
/// use declareq_client::request::Request;
///
/// let request = Request::new([
///     Param::url("https://api.example.com/todos"),
///     Param::query("userId", "1"),
/// ])
/// .on_json(|json| println!("first id: {}", json.get(0).unwrap().get("id").unwrap().int()))
/// .on_error(|err| eprintln!("request failed: {err}"));
/// request.call();
/// ```
pub struct AnyRequest<T = serde_json::Value> {
    pub(crate) request_params: Vec<Param>,
    pub(crate) session_params: Vec<Param>,
    pub(crate) callbacks: Callbacks<T>,
    pub(crate) update: Option<Update>,
    pub(crate) transport: Arc<dyn Transport>,
}

impl<T> AnyRequest<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Build a descriptor from a parameter tree.
    ///
    /// The tree is flattened into an ordered list of leaves and validated;
    /// session-level parameters are separated from the wire request
    /// parameters.
    ///
    /// # Panics
    /// Panics when the flattened tree contains zero or more than one
    /// [`Param::Url`]. A missing or ambiguous target is a configuration
    /// error; it is never silently resolved by picking one.
    #[must_use]
    pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
        let flat = param::flatten(params);
        let url_count = flat.iter().filter(|p| p.is_url()).count();
        assert!(url_count > 0, "request must contain a `Url` parameter");
        assert!(
            url_count < 2,
            "request must not contain more than one `Url` parameter"
        );
        let (session_params, request_params) =
            flat.into_iter().partition(Param::is_session_level);
        AnyRequest {
            request_params,
            session_params,
            callbacks: Callbacks::default(),
            update: None,
            transport: transport::default_transport(),
        }
    }

    fn modify(mut self, modify: impl FnOnce(&mut Self)) -> Self {
        modify(&mut self);
        self
    }

    /// Replace the transport used for dispatch.
    #[must_use]
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.modify(|r| r.transport = Arc::new(transport))
    }

    /// Register a callback for the raw response bytes.
    #[must_use]
    pub fn on_data(self, callback: impl Fn(Bytes) + Send + Sync + 'static) -> Self {
        self.modify(|r| r.callbacks.on_data = Some(Arc::new(callback)))
    }

    /// Register a callback for the UTF-8 decoded response body. Skipped
    /// when the body is not valid UTF-8.
    #[must_use]
    pub fn on_string(self, callback: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.modify(|r| r.callbacks.on_string = Some(Arc::new(callback)))
    }

    /// Register a callback for the response body as a [`Json`] view.
    /// Skipped when the body does not parse as JSON.
    #[must_use]
    pub fn on_json(self, callback: impl Fn(Json) + Send + Sync + 'static) -> Self {
        self.modify(|r| r.callbacks.on_json = Some(Arc::new(callback)))
    }

    /// Register a callback for the structurally-decoded response object.
    /// Skipped when decoding fails.
    #[must_use]
    pub fn on_object(self, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.modify(|r| r.callbacks.on_object = Some(Arc::new(callback)))
    }

    /// Register a callback for the status code of successful outcomes.
    #[must_use]
    pub fn on_status(self, callback: impl Fn(StatusCode) + Send + Sync + 'static) -> Self {
        self.modify(|r| r.callbacks.on_status = Some(Arc::new(callback)))
    }

    /// Register the error callback. Without one, failing outcomes are
    /// dropped silently - errors are opt-in.
    #[must_use]
    pub fn on_error(self, callback: impl Fn(RequestError) + Send + Sync + 'static) -> Self {
        self.modify(|r| r.callbacks.on_error = Some(Arc::new(callback)))
    }

    /// Re-dispatch the same descriptor on a fixed interval after the
    /// initial [`call`](AnyRequest::call). The loop stops once the
    /// descriptor is dropped.
    ///
    /// Ticks are not coalesced: when the transport is slower than the
    /// interval, overlapping in-flight dispatches are allowed and may
    /// complete out of order.
    #[must_use]
    pub fn update_every(self, period: Duration) -> Self {
        self.modify(|r| {
            r.update = Some(Update::Every {
                period,
                alive: Arc::new(()),
            });
        })
    }

    /// Re-dispatch the same descriptor on each tick of an external
    /// trigger after the initial [`call`](AnyRequest::call). Dropping the
    /// sender stops the re-dispatch loop.
    #[must_use]
    pub fn update_on(self, ticks: mpsc::Receiver<()>) -> Self {
        self.modify(|r| r.update = Some(Update::On(Mutex::new(Some(ticks)))))
    }

    /// Dispatch the request, fire-and-forget.
    ///
    /// The dispatch runs as an independent task on the ambient tokio
    /// runtime; registered callbacks are invoked when the outcome arrives.
    /// When a recurring trigger was configured, a supervisory task keeps
    /// re-dispatching the same flattened descriptor per tick, until the
    /// descriptor is dropped (interval) or the tick sender is dropped
    /// (external trigger).
    pub fn call(&self) {
        let job = self.dispatch_job();
        tokio::spawn(job.clone().run());

        match &self.update {
            None => {}
            Some(Update::Every { period, alive }) => {
                let period = *period;
                let alive = Arc::downgrade(alive);
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(period);
                    // The immediate first tick is covered by the initial
                    // dispatch above.
                    interval.tick().await;
                    loop {
                        interval.tick().await;
                        // The token lives on the descriptor; once it is
                        // dropped, stop re-dispatching.
                        if alive.upgrade().is_none() {
                            break;
                        }
                        tokio::spawn(job.clone().run());
                    }
                });
            }
            Some(Update::On(ticks)) => {
                let taken = ticks.lock().ok().and_then(|mut guard| guard.take());
                if let Some(mut ticks) = taken {
                    tokio::spawn(async move {
                        while ticks.recv().await.is_some() {
                            tokio::spawn(job.clone().run());
                        }
                    });
                } else {
                    log::warn!("update trigger was already consumed by an earlier call()");
                }
            }
        }
    }

    /// Dispatch and await the raw response.
    ///
    /// The direct-return counterpart of [`call`](AnyRequest::call):
    /// transport failures and non-2xx statuses are raised to the awaiting
    /// caller instead of flowing through callbacks.
    ///
    /// # Errors
    /// [`Error::Transport`] when the exchange failed, [`Error::Status`]
    /// when the response was outside `[200, 300)`.
    pub async fn response(&self) -> Result<TransportResponse, Error> {
        self.outcome().await.map_err(Error::from)
    }

    /// Dispatch, await, and decode the response body into `T`.
    ///
    /// # Errors
    /// Everything [`response`](AnyRequest::response) raises, plus
    /// [`Error::Decode`] when the body does not decode into `T`.
    pub async fn object(&self) -> Result<T, Error> {
        let response = self.response().await?;
        serde_json::from_slice(&response.body).map_err(Error::from)
    }

    /// One dispatch, classified. Shared by the direct-return entry points
    /// and the chain combinator.
    pub(crate) async fn outcome(&self) -> Result<TransportResponse, RequestError> {
        let result = executor::submit(
            &*self.transport,
            &self.request_params,
            &self.session_params,
        )
        .await;
        match result {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(RequestError::Status {
                code: response.status,
                body: response.body,
            }),
            Err(e) => Err(RequestError::Transport(e)),
        }
    }

    fn dispatch_job(&self) -> executor::Dispatch<T> {
        executor::Dispatch {
            request_params: self.request_params.clone(),
            session_params: self.session_params.clone(),
            callbacks: self.callbacks.clone(),
            transport: self.transport.clone(),
        }
    }
}
