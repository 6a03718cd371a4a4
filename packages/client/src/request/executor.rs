//! Building the wire request and fanning out the outcome.
//!
//! The executor applies a flattened parameter list to produce one
//! [`TransportRequest`]: the `Url` establishes the base target first, then
//! the remaining request-level parameters apply in declared order (query
//! pairs extend the URL, headers overwrite per name, the body is replaced
//! wholesale), while session-level parameters travel separately and
//! configure the client rather than the request.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::error::RequestError;
use crate::json::Json;
use crate::param::Param;
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

use super::Callbacks;

/// Everything one dispatch needs, detached from the descriptor so it can
/// run as an independent task (and be re-run per recurring tick).
pub(crate) struct Dispatch<T> {
    pub(crate) request_params: Vec<Param>,
    pub(crate) session_params: Vec<Param>,
    pub(crate) callbacks: Callbacks<T>,
    pub(crate) transport: Arc<dyn Transport>,
}

impl<T> Clone for Dispatch<T> {
    fn clone(&self) -> Self {
        Dispatch {
            request_params: self.request_params.clone(),
            session_params: self.session_params.clone(),
            callbacks: self.callbacks.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl<T: DeserializeOwned> Dispatch<T> {
    /// Run one full dispatch: assemble, submit, classify, deliver.
    pub(crate) async fn run(self) {
        let outcome = submit(&*self.transport, &self.request_params, &self.session_params).await;
        deliver(&self.callbacks, outcome);
    }
}

/// Assemble the wire request and hand it to the transport.
pub(crate) async fn submit(
    transport: &dyn Transport,
    request_params: &[Param],
    session_params: &[Param],
) -> Result<TransportResponse, TransportError> {
    let request = assemble(request_params, session_params);
    log::debug!("dispatching {} {}", request.method, request.url);
    transport.submit(request).await
}

/// Apply the flattened parameter lists to build the wire request.
///
/// The `Url` is applied first regardless of its declared position; every
/// other request-level parameter applies in declared order. The last
/// declared body (raw or non-empty form) wins, and a winning form brings
/// its content-type and content-length headers with it.
pub(crate) fn assemble(request_params: &[Param], session_params: &[Param]) -> TransportRequest {
    let mut url = request_params
        .iter()
        .find_map(|p| match p {
            Param::Url(url) => Some(url.clone()),
            _ => None,
        })
        .expect("descriptor construction guarantees exactly one `Url`");

    // The winning body is resolved after the loop so that a form body's
    // content-type/length headers are only set when the form actually wins.
    enum BodySource<'a> {
        Raw(&'a Bytes),
        Form(&'a crate::param::Form),
    }

    let mut method = Method::GET;
    let mut headers = HeaderMap::new();
    let mut body: Option<BodySource<'_>> = None;

    for param in request_params {
        match param {
            Param::Url(_) => {}
            Param::Method(m) => method = m.clone(),
            Param::Header { name, value } => {
                // Last write for a given header name wins.
                headers.insert(name.clone(), value.clone());
            }
            Param::Query { key, value } => {
                url.query_pairs_mut().append_pair(key, value);
            }
            Param::Body(bytes) => body = Some(BodySource::Raw(bytes)),
            // An empty form contributes nothing and never displaces an
            // earlier body.
            Param::Form(form) if !form.is_empty() => body = Some(BodySource::Form(form)),
            Param::Form(_) => {}
            // Session-level parameters are separated at construction.
            Param::Timeout(_) => {}
            // Removed by flatten.
            Param::Group(_) | Param::Empty => {}
        }
    }

    let body = match body {
        None => None,
        Some(BodySource::Raw(bytes)) => Some(bytes.clone()),
        Some(BodySource::Form(form)) => form.render().map(|rendered| {
            if let Ok(value) = HeaderValue::from_str(&rendered.content_type) {
                headers.insert(CONTENT_TYPE, value);
            }
            if let Ok(value) = HeaderValue::from_str(&rendered.body.len().to_string()) {
                headers.insert(CONTENT_LENGTH, value);
            }
            rendered.body
        }),
    };

    let timeout = session_timeout(session_params);
    TransportRequest {
        method,
        url,
        headers,
        body,
        timeout,
    }
}

/// The effective session timeout: the last declared one wins.
fn session_timeout(session_params: &[Param]) -> Option<Duration> {
    session_params.iter().rev().find_map(|p| match p {
        Param::Timeout(duration) => Some(*duration),
        _ => None,
    })
}

/// Fan the classified outcome out to the registered callbacks.
///
/// Success delivers each registered kind independently; a kind whose
/// decoding step fails is skipped without affecting the others or the
/// outcome. Failure delivers `on_error` exactly once, or nothing at all
/// when no error callback was registered.
pub(crate) fn deliver<T: DeserializeOwned>(
    callbacks: &Callbacks<T>,
    outcome: Result<TransportResponse, TransportError>,
) {
    match outcome {
        Ok(response) if response.is_success() => {
            if let Some(on_status) = &callbacks.on_status {
                on_status(response.status);
            }
            if let Some(on_data) = &callbacks.on_data {
                on_data(response.body.clone());
            }
            if let Some(on_string) = &callbacks.on_string {
                match std::str::from_utf8(&response.body) {
                    Ok(text) => on_string(text.to_owned()),
                    Err(_) => log::debug!("body is not valid UTF-8; skipping on_string"),
                }
            }
            if let Some(on_json) = &callbacks.on_json {
                match Json::from_bytes(&response.body) {
                    Ok(json) => on_json(json),
                    Err(e) => log::debug!("body is not valid JSON; skipping on_json: {e}"),
                }
            }
            if let Some(on_object) = &callbacks.on_object {
                match serde_json::from_slice::<T>(&response.body) {
                    Ok(object) => on_object(object),
                    Err(e) => log::debug!("body did not decode; skipping on_object: {e}"),
                }
            }
        }
        Ok(response) => {
            let status = response.status;
            notify_error(
                callbacks,
                RequestError::Status {
                    code: status,
                    body: response.body,
                },
            );
        }
        Err(e) => notify_error(callbacks, RequestError::Transport(e)),
    }
}

fn notify_error<T>(callbacks: &Callbacks<T>, error: RequestError) {
    match &callbacks.on_error {
        Some(on_error) => on_error(error),
        // Errors are opt-in: without a callback the failure is dropped.
        None => log::debug!("dropping failed outcome ({error}): no error callback registered"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn flat(params: impl IntoIterator<Item = Param>) -> Vec<Param> {
        crate::param::flatten(params)
    }

    fn ok_response(status: StatusCode, body: &'static [u8]) -> TransportResponse {
        TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from_static(body),
        }
    }

    #[test]
    fn query_params_extend_the_url() {
        let request = assemble(
            &flat([
                Param::url("https://x/todos"),
                Param::method(Method::GET),
                Param::query("userId", "1"),
            ]),
            &[],
        );
        assert_eq!(request.url.as_str(), "https://x/todos?userId=1");
        assert_eq!(request.method, Method::GET);
    }

    #[test]
    fn url_applies_first_regardless_of_position() {
        let request = assemble(
            &flat([Param::query("a", "1"), Param::url("https://example.com/p")]),
            &[],
        );
        assert_eq!(request.url.as_str(), "https://example.com/p?a=1");
    }

    #[test]
    fn last_header_write_wins() {
        let request = assemble(
            &flat([
                Param::url("https://example.com"),
                Param::header("x-k", "a"),
                Param::header("x-k", "b"),
            ]),
            &[],
        );
        assert_eq!(request.headers.get("x-k").unwrap(), "b");
        assert_eq!(request.headers.get_all("x-k").iter().count(), 1);
    }

    #[test]
    fn last_body_wins() {
        let request = assemble(
            &flat([
                Param::url("https://example.com"),
                Param::text_body("first"),
                Param::text_body("second"),
            ]),
            &[],
        );
        assert_eq!(request.body.as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn form_sets_body_content_type_and_length() {
        let form = crate::param::Form::new([crate::param::FormPart::Value {
            key: "k".into(),
            value: "v".into(),
        }]);
        let request = assemble(&flat([Param::url("https://example.com"), Param::Form(form)]), &[]);
        let content_type = request.headers.get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = request.body.expect("form produces a body");
        assert_eq!(
            request.headers.get(CONTENT_LENGTH).unwrap().to_str().unwrap(),
            body.len().to_string()
        );
    }

    #[test]
    fn body_after_form_takes_the_form_headers_with_it() {
        let form = crate::param::Form::new([crate::param::FormPart::Value {
            key: "k".into(),
            value: "v".into(),
        }]);
        let request = assemble(
            &flat([
                Param::url("https://example.com"),
                Param::Form(form),
                Param::text_body("tiny"),
            ]),
            &[],
        );
        assert_eq!(request.body.as_deref(), Some(&b"tiny"[..]));
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(request.headers.get(CONTENT_LENGTH).is_none());
    }

    #[test]
    fn form_after_body_wins_with_matching_length() {
        let form = crate::param::Form::new([crate::param::FormPart::Value {
            key: "k".into(),
            value: "v".into(),
        }]);
        let request = assemble(
            &flat([
                Param::url("https://example.com"),
                Param::text_body("tiny"),
                Param::Form(form),
            ]),
            &[],
        );
        let body = request.body.expect("form produces a body");
        assert_eq!(
            request.headers.get(CONTENT_LENGTH).unwrap().to_str().unwrap(),
            body.len().to_string()
        );
    }

    #[test]
    fn empty_form_does_not_displace_an_earlier_body() {
        let request = assemble(
            &flat([
                Param::url("https://example.com"),
                Param::text_body("kept"),
                Param::Form(crate::param::Form::default()),
            ]),
            &[],
        );
        assert_eq!(request.body.as_deref(), Some(&b"kept"[..]));
    }

    #[test]
    fn empty_form_contributes_neither_body_nor_content_type() {
        let request = assemble(
            &flat([
                Param::url("https://example.com"),
                Param::Form(crate::param::Form::default()),
            ]),
            &[],
        );
        assert!(request.body.is_none());
        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn last_declared_timeout_wins() {
        let timeout = session_timeout(&[
            Param::timeout(Duration::from_secs(1)),
            Param::timeout(Duration::from_secs(9)),
        ]);
        assert_eq!(timeout, Some(Duration::from_secs(9)));
    }

    fn bump<A: 'static>(hits: &Arc<AtomicUsize>) -> Arc<dyn Fn(A) + Send + Sync> {
        let hits = hits.clone();
        Arc::new(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn success_fans_out_to_every_registered_kind() {
        let hits = Arc::new(AtomicUsize::new(0));
        let callbacks = Callbacks::<serde_json::Value> {
            on_data: Some(bump(&hits)),
            on_string: Some(bump(&hits)),
            on_json: Some(bump(&hits)),
            on_object: Some(bump(&hits)),
            on_status: Some(bump(&hits)),
            on_error: None,
        };
        deliver(&callbacks, Ok(ok_response(StatusCode::OK, b"{\"id\":1}")));
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn invalid_utf8_skips_only_the_string_kind() {
        let data_hits = Arc::new(AtomicUsize::new(0));
        let string_hits = Arc::new(AtomicUsize::new(0));
        let mut callbacks: Callbacks<serde_json::Value> = Callbacks::default();
        callbacks.on_data = Some(bump(&data_hits));
        callbacks.on_string = Some(bump(&string_hits));
        deliver(&callbacks, Ok(ok_response(StatusCode::OK, &[0xff, 0xfe])));
        assert_eq!(data_hits.load(Ordering::SeqCst), 1);
        assert_eq!(string_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unparseable_json_skips_json_and_object_but_not_string() {
        let json_hits = Arc::new(AtomicUsize::new(0));
        let string_hits = Arc::new(AtomicUsize::new(0));
        let mut callbacks: Callbacks<serde_json::Value> = Callbacks::default();
        callbacks.on_json = Some(bump(&json_hits));
        callbacks.on_object = Some(bump(&json_hits));
        callbacks.on_string = Some(bump(&string_hits));
        deliver(&callbacks, Ok(ok_response(StatusCode::OK, b"not json")));
        assert_eq!(json_hits.load(Ordering::SeqCst), 0);
        assert_eq!(string_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_2xx_delivers_the_error_callback_once_with_status_and_body() {
        let seen: Arc<Mutex<Vec<RequestError>>> = Arc::new(Mutex::new(Vec::new()));
        let data_hits = Arc::new(AtomicUsize::new(0));
        let mut callbacks: Callbacks<serde_json::Value> = Callbacks::default();
        let s = seen.clone();
        callbacks.on_error = Some(Arc::new(move |e| s.lock().unwrap().push(e)));
        callbacks.on_data = Some(bump(&data_hits));
        deliver(&callbacks, Ok(ok_response(StatusCode::NOT_FOUND, b"nope")));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].status_code(), Some(StatusCode::NOT_FOUND));
        assert_eq!(seen[0].body().map(|b| &b[..]), Some(&b"nope"[..]));
        assert_eq!(data_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn transport_failure_carries_no_status() {
        let seen: Arc<Mutex<Vec<RequestError>>> = Arc::new(Mutex::new(Vec::new()));
        let mut callbacks: Callbacks<serde_json::Value> = Callbacks::default();
        let s = seen.clone();
        callbacks.on_error = Some(Arc::new(move |e| s.lock().unwrap().push(e)));
        deliver(&callbacks, Err(TransportError::Timeout));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].status_code(), None);
    }

    #[test]
    fn failure_without_error_callback_is_silently_dropped() {
        let callbacks: Callbacks<serde_json::Value> = Callbacks::default();
        // Must not panic or have any other observable effect.
        deliver(&callbacks, Err(TransportError::Timeout));
        deliver(&callbacks, Ok(ok_response(StatusCode::BAD_GATEWAY, b"")));
    }
}
