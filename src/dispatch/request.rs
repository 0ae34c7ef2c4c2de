//! Logical request and response values.
//!
//! A [`DispatchRequest`] is never mutated once built; each attempt works on a
//! rewritten copy produced by [`DispatchRequest::with_url`].

use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Method, StatusCode};

/// A request addressed to a logical cluster rather than a host.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    method: Method,
    url: String,
    context_id: String,
    headers: HeaderMap,
    body: Bytes,
}

impl DispatchRequest {
    /// `url` may use any placeholder host; only its path and query are kept.
    pub fn new(method: Method, url: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            context_id: context_id.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(url: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self::new(Method::GET, url, context_id)
    }

    pub fn post(url: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self::new(Method::POST, url, context_id)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Copy of this request aimed at `url`.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Response returned by the transport, passed through untouched.
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl DispatchResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}
