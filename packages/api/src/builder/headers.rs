//! Header convenience methods for the fluent builder.
//!
//! Each method lowers to a [`Param::Header`] leaf; an invalid name or
//! value degrades to `Param::Empty` with a warning rather than aborting
//! the chain.

use declareq_client::param::{MediaType, Param};

use super::core::RequestBuilder;

impl RequestBuilder {
    /// Append an arbitrary header. Later headers with the same name win.
    #[must_use]
    pub fn header(self, name: &str, value: &str) -> Self {
        self.param(Param::header(name, value))
    }

    /// Set the `Accept` header.
    #[must_use]
    pub fn accept(self, media_type: MediaType) -> Self {
        self.param(Param::accept(media_type))
    }

    /// Set the `Content-Type` header.
    #[must_use]
    pub fn content_type(self, media_type: MediaType) -> Self {
        self.param(Param::content_type(media_type))
    }

    /// Set `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer_auth(self, token: &str) -> Self {
        self.param(Param::authorization_bearer(token))
    }

    /// Set `Authorization: Basic <credentials>` with the username and
    /// password base64-encoded per RFC 7617.
    #[must_use]
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        self.param(Param::authorization_basic(username, password))
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(self, agent: &str) -> Self {
        self.param(Param::user_agent(agent))
    }

    /// Set the `Cache-Control` header.
    #[must_use]
    pub fn cache_control(self, directive: &str) -> Self {
        self.param(Param::cache_control(directive))
    }

    /// Set the `Host` header.
    #[must_use]
    pub fn host(self, host: &str) -> Self {
        self.param(Param::host(host))
    }

    /// Set the `Origin` header.
    #[must_use]
    pub fn origin(self, origin: &str) -> Self {
        self.param(Param::origin(origin))
    }

    /// Set the `Referer` header.
    #[must_use]
    pub fn referer(self, referer: &str) -> Self {
        self.param(Param::referer(referer))
    }
}
