//! Inbound request handling and transformation.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the client sent none
//! - Work out the context id of an inbound request
//! - Convert between axum requests/responses and dispatch values
//!
//! # Design Decisions
//! - Hop-by-hop headers are stripped in both directions
//! - The inbound `Host` is dropped; the transport derives it from the upstream URL

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Request, Response},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::dispatch::{DispatchRequest, DispatchResponse};

/// Header naming the logical cluster a request is for.
pub const X_CONTEXT_ID: &str = "x-context-id";

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Read the request ID set by the middleware.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Context id from `x-context-id`, or the configured default.
pub fn context_id(headers: &HeaderMap, default: Option<&str>) -> Option<String> {
    headers
        .get(X_CONTEXT_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or(default)
        .map(str::to_string)
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}

/// Build the logical request for an inbound one whose body is already buffered.
pub fn to_dispatch_request(
    parts: axum::http::request::Parts,
    body: axum::body::Bytes,
    context_id: String,
) -> DispatchRequest {
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(X_CONTEXT_ID);

    DispatchRequest::new(parts.method, path_and_query, context_id)
        .with_headers(headers)
        .with_body(body)
}

/// Turn an upstream response into the gateway's answer.
pub fn into_response(response: DispatchResponse) -> Response<Body> {
    let DispatchResponse {
        status,
        mut headers,
        body,
    } = response;
    strip_hop_by_hop(&mut headers);

    let mut out = Response::new(Body::from(body));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Method, StatusCode};

    #[test]
    fn test_context_id_header_wins() {
        let mut headers = HeaderMap::new();
        assert_eq!(context_id(&headers, None), None);
        assert_eq!(context_id(&headers, Some("fallback")).as_deref(), Some("fallback"));

        headers.insert(X_CONTEXT_ID, HeaderValue::from_static(" svcA "));
        assert_eq!(context_id(&headers, Some("fallback")).as_deref(), Some("svcA"));
    }

    #[test]
    fn test_inbound_request_conversion() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("http://gateway.local/orders/7?expand=items")
            .header(header::HOST, "gateway.local")
            .header(header::CONNECTION, "keep-alive")
            .header(X_CONTEXT_ID, "svcA")
            .header("x-trace", "abc")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        let dispatch = to_dispatch_request(parts, "payload".into(), "svcA".into());
        assert_eq!(dispatch.method(), Method::PUT);
        assert_eq!(dispatch.url(), "/orders/7?expand=items");
        assert_eq!(dispatch.context_id(), "svcA");
        assert!(dispatch.headers().get(header::HOST).is_none());
        assert!(dispatch.headers().get(header::CONNECTION).is_none());
        assert!(dispatch.headers().get(X_CONTEXT_ID).is_none());
        assert_eq!(dispatch.headers()["x-trace"], "abc");
        assert_eq!(dispatch.body().as_ref(), b"payload");
    }

    #[test]
    fn test_response_conversion() {
        let mut upstream = DispatchResponse::new(StatusCode::CREATED).with_body("done");
        upstream
            .headers
            .insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.headers.insert("x-upstream", HeaderValue::from_static("b"));

        let response = into_response(upstream);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(response.headers()["x-upstream"], "b");
    }
}
