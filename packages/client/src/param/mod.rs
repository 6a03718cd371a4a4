//! The declarative parameter model.
//!
//! A request is described by a tree of [`Param`] values: leaf kinds for
//! each contribution to the outgoing request, [`Param::Group`] for
//! sequential composition, and [`Param::Empty`] as the no-op produced by
//! optional branches. The tree is [`flatten`]ed into one ordered list of
//! leaves before a descriptor is built.
//!
//! Optional inclusion and either/or branching need no special support -
//! they are ordinary expressions at the call site:
//!
//! ```
//! use declareq_client::param::Param;
//!
//! let verbose = false;
//! let params = [
//!     Param::url("https://api.example.com/todos"),
//!     if verbose { Param::query("detail", "full") } else { Param::Empty },
//! ];
//! assert_eq!(declareq_client::param::flatten(params).len(), 1);
//! ```

pub mod form;

use std::time::Duration;

use base64::Engine;
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method};
use serde::Serialize;
use url::Url;

pub use form::{Form, FormPart, MediaType};

/// One contribution to an outgoing request.
///
/// The kind set is closed: exhaustive matching in the executor guarantees
/// every kind is handled when new ones are added.
#[derive(Debug, Clone)]
pub enum Param {
    /// The request target. Exactly one must be present per request.
    Url(Url),
    /// The HTTP method. Defaults to `GET` when absent.
    Method(Method),
    /// One header field. Last write for a given name wins.
    Header {
        /// Header field name.
        name: HeaderName,
        /// Header field value.
        value: HeaderValue,
    },
    /// One query pair, appended to the URL's query component.
    Query {
        /// Query key.
        key: String,
        /// Query value.
        value: String,
    },
    /// The request payload. At most one is expected; last one wins.
    Body(Bytes),
    /// Session-level request timeout, applied to the client configuration
    /// rather than the wire request.
    Timeout(Duration),
    /// A multipart form body. An empty form contributes nothing.
    Form(Form),
    /// A sequence of parameters, expanded away by [`flatten`].
    Group(Vec<Param>),
    /// The no-op parameter produced by untaken optional branches.
    Empty,
}

impl Param {
    /// The request target.
    ///
    /// # Panics
    /// Panics when `url` does not parse. An unparseable target is a
    /// configuration error, caught at declaration rather than guessed at
    /// dispatch.
    #[must_use]
    pub fn url(url: &str) -> Param {
        match url.parse::<Url>() {
            Ok(parsed) => Param::Url(parsed),
            Err(e) => panic!("`Url` parameter {url:?} is not a valid URL: {e}"),
        }
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(method: Method) -> Param {
        Param::Method(method)
    }

    /// A single header field. Invalid names or values are skipped with a
    /// warning rather than failing the request.
    #[must_use]
    pub fn header(name: &str, value: &str) -> Param {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => Param::Header { name, value },
            _ => {
                log::warn!("skipping invalid header {name}: {value}");
                Param::Empty
            }
        }
    }

    /// A single query pair.
    #[must_use]
    pub fn query(key: impl Into<String>, value: impl Into<String>) -> Param {
        Param::Query {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Query pairs in declaration order.
    #[must_use]
    pub fn query_map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Param
    where
        K: Into<String>,
        V: Into<String>,
    {
        Param::Group(
            pairs
                .into_iter()
                .map(|(k, v)| Param::query(k, v))
                .collect(),
        )
    }

    /// A JSON body serialized from any `Serialize` value. Serialization
    /// failures produce an empty body, matching the permissive behavior of
    /// the callback path.
    #[must_use]
    pub fn json_body<T: Serialize>(body: &T) -> Param {
        Param::Body(Bytes::from(serde_json::to_vec(body).unwrap_or_default()))
    }

    /// A `application/x-www-form-urlencoded` body plus its content type.
    #[must_use]
    pub fn form_urlencoded_body<T: Serialize>(body: &T) -> Param {
        let encoded = serde_urlencoded::to_string(body).unwrap_or_default();
        Param::Group(vec![
            Param::header("content-type", "application/x-www-form-urlencoded"),
            Param::Body(Bytes::from(encoded.into_bytes())),
        ])
    }

    /// A plain text body.
    #[must_use]
    pub fn text_body(text: &str) -> Param {
        Param::Body(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// A raw byte body.
    #[must_use]
    pub fn raw_body(bytes: impl Into<Bytes>) -> Param {
        Param::Body(bytes.into())
    }

    /// Session-level timeout for the whole dispatch.
    #[must_use]
    pub fn timeout(duration: Duration) -> Param {
        Param::Timeout(duration)
    }

    // Header conveniences, mirroring the common field family.

    /// `Accept` header.
    #[must_use]
    pub fn accept(media_type: MediaType) -> Param {
        Param::header("accept", media_type.as_str())
    }

    /// `Content-Type` header.
    #[must_use]
    pub fn content_type(media_type: MediaType) -> Param {
        Param::header("content-type", media_type.as_str())
    }

    /// `Authorization: Bearer` header.
    #[must_use]
    pub fn authorization_bearer(token: &str) -> Param {
        Param::header("authorization", &format!("Bearer {token}"))
    }

    /// `Authorization: Basic` header with base64-encoded credentials.
    #[must_use]
    pub fn authorization_basic(username: &str, password: &str) -> Param {
        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        Param::header("authorization", &format!("Basic {credentials}"))
    }

    /// `Cache-Control` header.
    #[must_use]
    pub fn cache_control(directive: &str) -> Param {
        Param::header("cache-control", directive)
    }

    /// `User-Agent` header.
    #[must_use]
    pub fn user_agent(agent: &str) -> Param {
        Param::header("user-agent", agent)
    }

    /// `Host` header.
    #[must_use]
    pub fn host(host: &str) -> Param {
        Param::header("host", host)
    }

    /// `Origin` header.
    #[must_use]
    pub fn origin(origin: &str) -> Param {
        Param::header("origin", origin)
    }

    /// `Referer` header.
    #[must_use]
    pub fn referer(referer: &str) -> Param {
        Param::header("referer", referer)
    }

    /// Whether this leaf configures the session (client) rather than the
    /// wire request.
    #[must_use]
    pub fn is_session_level(&self) -> bool {
        matches!(self, Param::Timeout(_))
    }

    /// Whether this leaf is the request target.
    #[must_use]
    pub fn is_url(&self) -> bool {
        matches!(self, Param::Url(_))
    }
}

/// Flatten a parameter tree into one ordered list of leaves.
///
/// `Group` nodes are expanded pre-order, preserving the declared relative
/// order of their children; `Empty` leaves are dropped. Flattening an
/// already-flat list returns it unchanged.
pub fn flatten(params: impl IntoIterator<Item = Param>) -> Vec<Param> {
    let mut flat = Vec::new();
    for param in params {
        match param {
            Param::Group(children) => flat.extend(flatten(children)),
            Param::Empty => {}
            leaf => flat.push(leaf),
        }
    }
    flat
}
