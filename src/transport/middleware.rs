use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

pub const VERSION_HEADER: &str = "x-reelgate-version";

pub async fn add_response_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        VERSION_HEADER,
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}
