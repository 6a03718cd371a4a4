//! Core `RequestBuilder` structure and foundational methods.
//!
//! The builder accumulates declarative [`Param`] blocks in declaration
//! order and lowers to a [`Request`] descriptor on
//! [`build`](RequestBuilder::build). Method, query and timeout methods
//! live here; header and body conveniences are in the sibling modules.

use std::time::Duration;

use declareq_client::param::Param;
use declareq_client::request::{AnyRequest, Request};
use http::Method;
use serde::de::DeserializeOwned;

/// Fluent builder over the declarative parameter model.
///
/// The target URL is fixed at construction, which makes the
/// exactly-one-`Url` invariant hold by shape; the escape hatch
/// [`param`](RequestBuilder::param) still allows arbitrary parameters,
/// including `Param::Group` and conditional `Param::Empty` branches.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) params: Vec<Param>,
}

impl RequestBuilder {
    /// Start building a request against `url`.
    ///
    /// # Panics
    /// Panics when `url` does not parse; an unparseable target is a
    /// configuration error, caught at declaration.
    #[must_use]
    pub fn new(url: &str) -> Self {
        RequestBuilder {
            params: vec![Param::url(url)],
        }
    }

    /// Append any declarative parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(self, method: Method) -> Self {
        self.param(Param::method(method))
    }

    /// Shorthand for `method(Method::GET)`.
    #[must_use]
    pub fn get(self) -> Self {
        self.method(Method::GET)
    }

    /// Shorthand for `method(Method::POST)`.
    #[must_use]
    pub fn post(self) -> Self {
        self.method(Method::POST)
    }

    /// Shorthand for `method(Method::PUT)`.
    #[must_use]
    pub fn put(self) -> Self {
        self.method(Method::PUT)
    }

    /// Shorthand for `method(Method::PATCH)`.
    #[must_use]
    pub fn patch(self) -> Self {
        self.method(Method::PATCH)
    }

    /// Shorthand for `method(Method::DELETE)`.
    #[must_use]
    pub fn delete(self) -> Self {
        self.method(Method::DELETE)
    }

    /// Append one query pair.
    #[must_use]
    pub fn query(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.param(Param::query(key, value))
    }

    /// Append query pairs in declaration order.
    #[must_use]
    pub fn query_map<K, V>(self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.param(Param::query_map(pairs))
    }

    /// Set the session-level timeout for the dispatch.
    #[must_use]
    pub fn timeout(self, duration: Duration) -> Self {
        self.param(Param::timeout(duration))
    }

    /// Lower to a [`Request`] descriptor whose typed callback decodes
    /// plain JSON.
    #[must_use]
    pub fn build(self) -> Request {
        Request::new(self.params)
    }

    /// Lower to a descriptor with a custom `on_object` response type.
    #[must_use]
    pub fn build_as<T>(self) -> AnyRequest<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        AnyRequest::new(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_lowers_to_ordered_params() {
        let builder = RequestBuilder::new("https://example.com")
            .get()
            .query("a", "1")
            .timeout(Duration::from_secs(3));
        assert_eq!(builder.params.len(), 4);
        assert!(builder.params[0].is_url());
        assert!(matches!(builder.params[1], Param::Method(_)));
        assert!(matches!(builder.params[2], Param::Query { .. }));
        assert!(builder.params[3].is_session_level());
    }

    #[test]
    fn conditional_params_compose_through_the_escape_hatch() {
        let verbose = false;
        let builder = RequestBuilder::new("https://example.com").param(if verbose {
            Param::query("detail", "full")
        } else {
            Param::Empty
        });
        // Empty is dropped during flattening; build() must not see it as
        // a second parameter kind.
        let request = builder.build();
        drop(request);
    }

    #[test]
    #[should_panic(expected = "not a valid URL")]
    fn invalid_url_panics_at_declaration() {
        let _ = RequestBuilder::new("http://exa mple.com");
    }
}
