//! The value a handler produces.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

use crate::registry::HandlerError;

/// The HTTP response body type used throughout the server.
pub type ResponseBody = Full<Bytes>;

/// A status code plus payload, produced by a handler and consumed exactly
/// once when the response is written to the connection.
#[derive(Debug)]
pub struct Responder {
    status: StatusCode,
    content_type: HeaderValue,
    extra_headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
}

impl Responder {
    /// A 200 response with a plain-text body.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: HeaderValue::from_static("text/plain; charset=utf-8"),
            extra_headers: Vec::new(),
            body: Bytes::from(body.into()),
        }
    }

    /// A 200 response with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] if the value cannot be serialized.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| HandlerError::message(format!("response serialization failed: {e}")))?;
        Ok(Self {
            status: StatusCode::OK,
            content_type: HeaderValue::from_static("application/json"),
            extra_headers: Vec::new(),
            body: Bytes::from(body),
        })
    }

    /// A structured JSON error envelope, used by the dispatcher for every
    /// error it reports itself.
    #[must_use]
    pub(crate) fn error(status: StatusCode, code: &str, message: &str) -> Self {
        let body = serde_json::json!({
            "error": { "code": code, "message": message }
        });
        Self {
            status,
            content_type: HeaderValue::from_static("application/json"),
            extra_headers: Vec::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    /// Replaces the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.push((name, value));
        self
    }

    /// Sets the `Allow` header, for 405 responses.
    #[must_use]
    pub(crate) fn with_allow(self, methods: &[http::Method]) -> Self {
        let list = methods
            .iter()
            .map(http::Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        match HeaderValue::from_str(&list) {
            Ok(value) => self.with_header(ALLOW, value),
            Err(_) => self,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the responder into a hyper response.
    #[must_use]
    pub fn into_response(self) -> Response<ResponseBody> {
        let mut builder = Response::builder().status(self.status);
        builder = builder.header(CONTENT_TYPE, self.content_type);
        for (name, value) in self.extra_headers {
            builder = builder.header(name, value);
        }
        builder
            .body(Full::new(self.body))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
    }
}
