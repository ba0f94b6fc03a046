//! Request id, client address and user agent capture.
//!
//! Builds the [`RequestContext`] every later layer and the audit logger read,
//! and echoes the request id back in `X-Request-ID`.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use bastion_core::audit::RequestContext;
use bastion_core::uuid::new_request_id;
use tracing::{Instrument, info_span};

pub const X_REQUEST_ID: &str = "x-request-id";
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// peer address without its port.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    if let Some(first) = header_str(headers, X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(first.to_string());
    }
    if let Some(real) = header_str(headers, X_REAL_IP) {
        return Some(real.to_string());
    }
    peer.map(|addr| addr.ip().to_string())
}

/// Axum middleware inserting a fresh [`RequestContext`] (no actor yet).
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let headers = request.headers();
    let request_id = header_str(headers, X_REQUEST_ID)
        .map(str::to_string)
        .unwrap_or_else(new_request_id);
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ctx = RequestContext {
        actor_id: None,
        request_id: Some(request_id.clone()),
        ip_address: client_ip(headers, peer),
        user_agent: header_str(headers, USER_AGENT.as_str()).map(str::to_string),
        method: Some(request.method().to_string()),
        path: Some(request.uri().path().to_string()),
    };

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(ctx);

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(X_REQUEST_ID), value);
    }
    response
}
