use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
};

use crate::{
    common::ApiError,
    media::StreamQuery,
    server::AppState,
    sources::SourceOutput,
};

pub const NO_STREAM_FOUND: &str = "No stream found.";

/// GET /api/stream?tmdbId=...&type=...&title=...&releaseYear=...&season=...&episode=...
pub async fn get_stream(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StreamQuery>, QueryRejection>,
) -> Result<Json<SourceOutput>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let media = params.into_media().map_err(|e| {
        tracing::warn!("GET /api/stream: rejected query: {}", e);
        ApiError::bad_request(e.to_string())
    })?;

    tracing::info!(
        "GET /api/stream: {} '{}' tmdbId={} releaseYear={:?} episode={:?}",
        media.kind().as_str(),
        media.title(),
        media.tmdb_id(),
        media.release_year(),
        media.episode()
    );

    let timeout = state.lookup_timeout();
    match tokio::time::timeout(timeout, state.resolver.resolve(&media)).await {
        Ok(Ok(Some(output))) => {
            tracing::debug!("GET /api/stream: resolved via {}", output.source_id);
            Ok(Json(output))
        }
        Ok(Ok(None)) => {
            tracing::info!("GET /api/stream: no stream for '{}'", media.title());
            Err(ApiError::not_found(NO_STREAM_FOUND))
        }
        Ok(Err(e)) => {
            tracing::error!("GET /api/stream: lookup failed: {}", e);
            Err(ApiError::internal(e.to_string()))
        }
        Err(_) => {
            tracing::error!(
                "GET /api/stream: lookup for '{}' timed out after {:?}",
                media.title(),
                timeout
            );
            Err(ApiError::internal(format!(
                "Source lookup timed out after {}s",
                timeout.as_secs()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{
        configs::Config,
        media::{MediaKind, ScrapeMedia},
        sources::SourceOutput,
        test_helpers::{Stub, StubResolver, test_app_state, test_app_state_with},
        transport::http_server::router,
    };

    async fn call(app: axum::Router, uri: &str) -> Response {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).expect("body should be JSON")
    }

    fn found() -> Stub {
        Stub::Found(SourceOutput {
            source_id: "remote".into(),
            embed_id: Some("upcloud".into()),
            stream: json!({
                "type": "hls",
                "playlist": "https://cdn.example.com/master.m3u8",
                "flags": ["cors-allowed"],
            }),
        })
    }

    #[tokio::test]
    async fn test_found_returns_engine_output() {
        let resolver = StubResolver::new(found());
        let app = router(test_app_state(resolver.clone()));

        let response = call(
            app,
            "/api/stream?tmdbId=603&type=movie&title=The%20Matrix&releaseYear=1999",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "sourceId": "remote",
                "embedId": "upcloud",
                "stream": {
                    "type": "hls",
                    "playlist": "https://cdn.example.com/master.m3u8",
                    "flags": ["cors-allowed"],
                }
            })
        );

        let seen = resolver.last_seen().expect("resolver should be called");
        assert_eq!(seen.kind(), MediaKind::Movie);
        assert_eq!(seen.title(), "The Matrix");
        assert_eq!(seen.release_year(), Some(1999));
    }

    #[tokio::test]
    async fn test_show_descriptor_reaches_engine() {
        let resolver = StubResolver::new(found());
        let app = router(test_app_state(resolver.clone()));

        let response = call(
            app,
            "/api/stream?tmdbId=1399&type=show&title=Got&releaseYear=2011&season=4&episode=9",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let seen = resolver.last_seen().unwrap();
        assert!(matches!(seen, ScrapeMedia::Show(_)));
        assert_eq!(seen.episode(), Some((4, 9)));
    }

    #[tokio::test]
    async fn test_bad_release_year_still_reaches_engine() {
        let resolver = StubResolver::new(Stub::Nothing);
        let app = router(test_app_state(resolver.clone()));

        let response = call(app, "/api/stream?tmdbId=1&type=movie&releaseYear=soon").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let seen = resolver.last_seen().expect("resolver should be called");
        assert_eq!(seen.release_year(), None);
    }

    #[tokio::test]
    async fn test_nothing_found_is_404() {
        let app = router(test_app_state(StubResolver::new(Stub::Nothing)));

        let response = call(app, "/api/stream?tmdbId=1&type=movie&title=x").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({ "error": "No stream found." }));
    }

    #[tokio::test]
    async fn test_engine_failure_is_500_with_message() {
        let app = router(test_app_state(StubResolver::new(Stub::Fails("boom"))));

        let response = call(app, "/api/stream?tmdbId=1&type=movie&title=x").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "error": "boom" }));
    }

    #[tokio::test]
    async fn test_engine_timeout_is_500() {
        let mut config = Config::default();
        config.resolver.timeout_secs = 0;
        let app = router(test_app_state_with(config, StubResolver::new(Stub::Hangs)));

        let response = call(app, "/api/stream?tmdbId=1&type=movie").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Source lookup timed out after 0s" })
        );
    }

    #[tokio::test]
    async fn test_client_disconnect_abandons_lookup() {
        let dropped = Arc::new(AtomicBool::new(false));
        let resolver = StubResolver::new(Stub::HangsWatched(dropped.clone()));
        let app = router(test_app_state(resolver.clone()));

        // The lookup timeout is 20s; giving up after 50ms drops the request
        // future the way a closed connection does.
        let request = call(app, "/api/stream?tmdbId=1&type=movie&title=x");
        assert!(
            tokio::time::timeout(Duration::from_millis(50), request)
                .await
                .is_err()
        );

        assert!(resolver.last_seen().is_some(), "lookup never started");
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_show_without_episode_is_400() {
        let resolver = StubResolver::new(found());
        let app = router(test_app_state(resolver.clone()));

        let response = call(app, "/api/stream?tmdbId=1&type=show&season=1").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "episode is required when type is show" })
        );
        assert!(resolver.last_seen().is_none());
    }
}
