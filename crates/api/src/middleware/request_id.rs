use axum::{body::Body, http::Request, middleware::Next, response::Response};
use nanoid::nanoid;
use tracing::{info, info_span, Instrument};

pub async fn request_id(req: Request<Body>, next: Next) -> Response {
    let request_id = format!("req_{}", nanoid!(16));
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut resp = next.run(req).instrument(span.clone()).await;
    span.in_scope(|| info!(status = resp.status().as_u16(), "request finished"));

    if let Ok(value) = request_id.parse() {
        resp.headers_mut().insert("X-Request-Id", value);
    }
    resp
}
