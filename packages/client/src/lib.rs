//! # Declareq Client
//!
//! Implementation crate for the `declareq` declarative HTTP request library.
//!
//! A request is composed from small declarative [`Param`](param::Param)
//! blocks (url, method, headers, query, body, multipart form, timeout),
//! flattened into an immutable [`AnyRequest`](request::AnyRequest)
//! descriptor, and dispatched through a pluggable [`Transport`]. Response
//! bodies can be inspected without a schema through the dynamic
//! [`Json`](json::Json) view.
//!
//! The actual wire client (TLS, redirects, connection pooling) is delegated
//! to the transport implementation; the default is backed by `reqwest` and
//! enabled through the `reqwest` feature.

#![deny(unsafe_code)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod json;
pub mod param;
pub mod request;
pub mod transport;

// Prelude with canonical types
pub mod prelude;

// Essential public API - only what end users actually need
pub use crate::prelude::*;
