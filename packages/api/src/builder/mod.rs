//! Fluent builder API modules
//!
//! Provides the fluent surface for composing request descriptors through
//! method chaining. Every method lowers to the declarative
//! [`Param`](declareq_client::Param) model.

pub mod body;
pub mod core;
pub mod headers;

pub use core::RequestBuilder;
