//! Declareq Prelude
//!
//! This module contains the essential types that end users need when
//! composing and dispatching requests. Only canonical public API types
//! belong here.

// Request descriptors and combinators
pub use crate::request::{AnyRequest, Request, RequestChain, RequestGroup};

// Declarative parameter model
pub use crate::param::{Form, FormPart, MediaType, Param};

// Dynamic JSON view
pub use crate::json::{Json, PathError, PathSegment};

// Error types
pub use crate::error::{Error, RequestError};

// Transport boundary
pub use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};
#[cfg(feature = "reqwest")]
pub use crate::transport::ReqwestTransport;

// HTTP standard types from http crate
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

// URL handling
pub use url::Url;
