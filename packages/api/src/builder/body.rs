//! Body convenience methods for the fluent builder.
//!
//! Each method lowers to a [`Param::Body`] leaf (or a `Param::Group`
//! pairing the body with its content type). Later bodies replace
//! earlier ones during assembly.

use bytes::Bytes;
use declareq_client::param::{Form, Param};
use serde::Serialize;

use super::core::RequestBuilder;

impl RequestBuilder {
    /// Serialize `body` to JSON and use it as the request body.
    ///
    /// A value that fails to serialize yields an empty body.
    #[must_use]
    pub fn json_body<T: Serialize>(self, body: &T) -> Self {
        self.param(Param::json_body(body))
    }

    /// Use `text` as the request body, verbatim.
    #[must_use]
    pub fn text_body(self, text: &str) -> Self {
        self.param(Param::text_body(text))
    }

    /// Use raw bytes as the request body.
    #[must_use]
    pub fn raw_body(self, bytes: impl Into<Bytes>) -> Self {
        self.param(Param::raw_body(bytes))
    }

    /// Serialize `body` as `application/x-www-form-urlencoded`, setting
    /// the content type alongside.
    #[must_use]
    pub fn form_urlencoded_body<T: Serialize>(self, body: &T) -> Self {
        self.param(Param::form_urlencoded_body(body))
    }

    /// Attach a `multipart/form-data` form. The boundary is generated at
    /// dispatch, so the rendered body differs per call.
    #[must_use]
    pub fn form(self, form: Form) -> Self {
        self.param(Param::Form(form))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Todo {
        id: u32,
        title: String,
    }

    #[test]
    fn json_body_serializes_in_place() {
        let todo = Todo {
            id: 1,
            title: "write docs".into(),
        };
        let builder = RequestBuilder::new("https://example.com").json_body(&todo);
        match &builder.params[1] {
            Param::Body(bytes) => {
                assert_eq!(bytes.as_ref(), br#"{"id":1,"title":"write docs"}"#);
            }
            other => panic!("expected a body leaf, got {other:?}"),
        }
    }

    #[test]
    fn urlencoded_body_carries_its_content_type() {
        let builder = RequestBuilder::new("https://example.com")
            .form_urlencoded_body(&[("q", "rust"), ("page", "2")]);
        match &builder.params[1] {
            Param::Group(children) => {
                assert!(matches!(children[0], Param::Header { .. }));
                assert!(matches!(children[1], Param::Body(_)));
            }
            other => panic!("expected a group, got {other:?}"),
        }
    }
}
