//! Concurrent request groups.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::RequestError;
use crate::json::Json;

use super::Request;

/// Performs multiple independent requests simultaneously.
///
/// All member requests are dispatched at the same time and know nothing of
/// each other; to run requests in order, feeding each step the previous
/// results, see [`RequestChain`](super::RequestChain).
///
/// Group-level callbacks receive the member index along with the payload,
/// and fire once per arriving member outcome. There is no ordering
/// guarantee between indices and no built-in "all complete" notion -
/// callers wanting one count arrivals themselves. The failure of one
/// member never cancels or affects its siblings.
///
/// ```no_run
/// use declareq_client::param::Param;
/// use declareq_client::request::{Request, RequestGroup};
///
/// RequestGroup::new([
///     Request::new([Param::url("https://api.example.com/todos")]),
///     Request::new([Param::url("https://api.example.com/users")]),
/// ])
/// .on_json(|index, json| println!("#{index}: {} items", json.count()))
/// .on_error(|index, err| eprintln!("#{index} failed: {err}"))
/// .call();
/// ```
pub struct RequestGroup {
    requests: Vec<Request>,
    on_data: Option<Arc<dyn Fn(usize, Bytes) + Send + Sync>>,
    on_string: Option<Arc<dyn Fn(usize, String) + Send + Sync>>,
    on_json: Option<Arc<dyn Fn(usize, Json) + Send + Sync>>,
    on_error: Option<Arc<dyn Fn(usize, RequestError) + Send + Sync>>,
}

impl RequestGroup {
    /// A group over the given member requests, indexed in order.
    #[must_use]
    pub fn new(requests: impl IntoIterator<Item = Request>) -> Self {
        RequestGroup {
            requests: requests.into_iter().collect(),
            on_data: None,
            on_string: None,
            on_json: None,
            on_error: None,
        }
    }

    /// Register the indexed raw-bytes callback.
    #[must_use]
    pub fn on_data(mut self, callback: impl Fn(usize, Bytes) + Send + Sync + 'static) -> Self {
        self.on_data = Some(Arc::new(callback));
        self
    }

    /// Register the indexed string callback.
    #[must_use]
    pub fn on_string(mut self, callback: impl Fn(usize, String) + Send + Sync + 'static) -> Self {
        self.on_string = Some(Arc::new(callback));
        self
    }

    /// Register the indexed JSON-view callback.
    #[must_use]
    pub fn on_json(mut self, callback: impl Fn(usize, Json) + Send + Sync + 'static) -> Self {
        self.on_json = Some(Arc::new(callback));
        self
    }

    /// Register the indexed error callback.
    #[must_use]
    pub fn on_error(
        mut self,
        callback: impl Fn(usize, RequestError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Dispatch every member concurrently, fire-and-forget.
    ///
    /// Each member is re-wrapped so its outcome reports back through the
    /// group's indexed callbacks, then dispatched as its own task.
    pub fn call(self) {
        let RequestGroup {
            requests,
            on_data,
            on_string,
            on_json,
            on_error,
        } = self;

        for (index, request) in requests.into_iter().enumerate() {
            let mut request = request;
            if let Some(callback) = &on_data {
                let callback = callback.clone();
                request = request.on_data(move |data| callback(index, data));
            }
            if let Some(callback) = &on_string {
                let callback = callback.clone();
                request = request.on_string(move |string| callback(index, string));
            }
            if let Some(callback) = &on_json {
                let callback = callback.clone();
                request = request.on_json(move |json| callback(index, json));
            }
            if let Some(callback) = &on_error {
                let callback = callback.clone();
                request = request.on_error(move |error| callback(index, error));
            }
            request.call();
        }
    }
}
