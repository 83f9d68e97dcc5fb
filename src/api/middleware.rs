//! API Middleware
//!
//! Customer identity extraction and request logging. Authentication itself
//! happens upstream; by the time a request reaches the core the
//! X-Customer-No header carries the authenticated customer number.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Instant;

use crate::domain::OperationContext;

/// Attach an OperationContext built from the X-Customer-No header.
pub async fn customer_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let customer_no = request
        .headers()
        .get("X-Customer-No")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok());

    let customer_no = match customer_no {
        Some(n) => n,
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Missing or invalid X-Customer-No header",
                    "error_code": "missing_header"
                })),
            )
                .into_response());
        }
    };

    let mut context = OperationContext::new(customer_no);
    context.ensure_correlation_id();

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Log method, path, status and latency for every request.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
