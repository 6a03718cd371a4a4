//! # Declareq
//!
//! Declarative HTTP request building: compose a request from small
//! parameter blocks, register callbacks for the eventual response, and
//! inspect JSON bodies without a schema.
//!
//! ```no_run
//! use declareq::{Param, Request};
//!
//! Request::new([
//!     Param::url("https://jsonplaceholder.typicode.com/todos"),
//!     Param::query("userId", "1"),
//! ])
//! .on_json(|json| println!("found {} todos", json.count()))
//! .on_error(|err| eprintln!("request failed: {err}"))
//! .call();
//! ```
//!
//! or with the fluent builder:
//!
//! ```no_run
//! use declareq::RequestBuilder;
//!
//! let request = RequestBuilder::new("https://jsonplaceholder.typicode.com/todos")
//!     .query("userId", "1")
//!     .build()
//!     .on_string(|body| println!("{body}"));
//! request.call();
//! ```
//!
//! Optional and either/or inclusion are ordinary expressions producing
//! [`Param::Empty`] or a leaf; failures are opt-in through `on_error`.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod builder;

// Re-export all public API components
pub use builder::RequestBuilder;

// Re-export important types from the client package
pub use declareq_client::{
    AnyRequest, Error, Form, FormPart, Json, MediaType, Param, PathError, PathSegment, Request,
    RequestChain, RequestError, RequestGroup, Transport, TransportError, TransportRequest,
    TransportResponse,
};
#[cfg(feature = "reqwest")]
pub use declareq_client::ReqwestTransport;

// HTTP standard types
pub use http::{Method, StatusCode};
pub use url::Url;

/// Start building a request against `url`.
///
/// Shorthand for [`RequestBuilder::new`].
///
/// # Panics
/// Panics when `url` does not parse; an unparseable target is a
/// configuration error.
#[must_use]
pub fn request(url: &str) -> RequestBuilder {
    RequestBuilder::new(url)
}

/// Start building a GET request against `url`.
///
/// # Panics
/// Panics when `url` does not parse.
#[must_use]
pub fn get(url: &str) -> RequestBuilder {
    RequestBuilder::new(url).get()
}

/// Start building a POST request against `url`.
///
/// # Panics
/// Panics when `url` does not parse.
#[must_use]
pub fn post(url: &str) -> RequestBuilder {
    RequestBuilder::new(url).post()
}
