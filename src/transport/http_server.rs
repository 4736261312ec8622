use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{any, get},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    server::AppState,
    transport::{
        middleware::add_response_headers,
        routes::{info, proxy, stream},
    },
};

pub const PROXY_PREFIX: &str = "/proxy";

pub fn router(state: Arc<AppState>) -> Router {
    // The proxy writes its own CORS headers over whatever upstream sent, so
    // the permissive layer only wraps the API routes.
    let api_routes = Router::new()
        .route("/", get(info::liveness))
        .route("/version", get(info::get_version))
        .route("/info", get(info::get_info))
        .route("/api/stream", get(stream::get_stream))
        .layer(CorsLayer::permissive());

    let proxy_routes = Router::new()
        .route(PROXY_PREFIX, any(proxy::proxy_request))
        .route("/proxy/", any(proxy::proxy_request))
        .route("/proxy/{*path}", any(proxy::proxy_request));

    Router::new()
        .merge(api_routes)
        .merge(proxy_routes)
        .layer(middleware::from_fn(add_response_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        test_helpers::{Stub, StubResolver, test_app_state},
        transport::middleware::VERSION_HEADER,
    };

    #[tokio::test]
    async fn test_liveness() {
        let app = router(test_app_state(StubResolver::new(Stub::Nothing)));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[VERSION_HEADER],
            env!("CARGO_PKG_VERSION")
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"reelgate is running");
    }

    #[tokio::test]
    async fn test_api_routes_allow_any_origin() {
        let app = router(test_app_state(StubResolver::new(Stub::Nothing)));
        let response = app
            .oneshot(
                Request::get("/version")
                    .header("origin", "https://player.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");

        let app = router(test_app_state(StubResolver::new(Stub::Nothing)));
        let response = app
            .oneshot(
                Request::get("/api/stream?tmdbId=1&type=movie")
                    .header("origin", "https://player.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = router(test_app_state(StubResolver::new(Stub::Nothing)));
        let response = app
            .oneshot(Request::get("/v4/loadtracks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
