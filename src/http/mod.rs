//! HTTP transport seam used by the authentication stages and the location fetcher.
//!
//! Stages describe each exchange as an [`HttpRequest`] and receive an
//! [`HttpResponse`] with just the parts they inspect: status, `Set-Cookie`
//! values, `Location` and body. Redirects are never followed automatically,
//! since a 302 is itself the success signal for the later login stages.
//!
//! # Object Safety
//!
//! [`Transport`] uses `async_trait` so the pipeline can hold a
//! `&dyn Transport` and tests can swap in scripted transports.

mod client;
mod error;

pub use client::ReqwestTransport;
pub use error::TransportError;

use async_trait::async_trait;

/// HTTP method subset used by the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// Returns the method token as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A single outgoing exchange.
///
/// Header and field order is preserved; form bodies are sent as
/// `application/x-www-form-urlencoded`.
#[derive(Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL without the query parameters below.
    pub url: String,
    /// Query parameters appended to `url`.
    pub query: Vec<(&'static str, String)>,
    /// Extra request headers.
    pub headers: Vec<(&'static str, String)>,
    /// Form body, if any.
    pub form: Option<Vec<(&'static str, String)>>,
}

impl HttpRequest {
    /// Starts a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Starts a `POST` request with no body.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            form: None,
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    /// Appends a request header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Sets the form body.
    #[must_use]
    pub fn form(mut self, fields: Vec<(&'static str, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    /// Returns the first header value with the given name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value of a form field, if a form body is present.
    #[must_use]
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

// Form bodies carry the password and headers carry session cookies.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field(
                "headers",
                &self.headers.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
            )
            .field(
                "form",
                &self
                    .form
                    .as_ref()
                    .map(|fields| fields.iter().map(|(key, _)| *key).collect::<Vec<_>>()),
            )
            .finish()
    }
}

/// The parts of a response the login flow inspects.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,
    /// Every `Set-Cookie` header value, in arrival order.
    pub set_cookies: Vec<String>,
    /// The `Location` header, if present.
    pub location: Option<String>,
    /// Response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with the given status and no headers or body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Adds a `Set-Cookie` header value.
    #[must_use]
    pub fn with_set_cookie(mut self, value: impl Into<String>) -> Self {
        self.set_cookies.push(value.into());
        self
    }

    /// Sets the `Location` header.
    #[must_use]
    pub fn with_location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    /// Sets the body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns true when at least one `Set-Cookie` header was received.
    #[must_use]
    pub fn has_cookies(&self) -> bool {
        !self.set_cookies.is_empty()
    }
}

/// Executes one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response without following redirects.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
