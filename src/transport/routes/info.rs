use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::{common::now_ms, server::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub version: &'static str,
    pub build_time: u64,
    pub git: GitInfo,
    pub target: &'static str,
    pub providers: Vec<String>,
    pub uptime_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInfo {
    pub branch: &'static str,
    pub commit: &'static str,
    pub commit_time: u64,
}

/// GET /
pub async fn liveness() -> &'static str {
    "reelgate is running"
}

/// GET /version
pub async fn get_version() -> String {
    tracing::debug!("GET /version");
    env!("CARGO_PKG_VERSION").to_string()
}

/// GET /info
pub async fn get_info(State(state): State<Arc<AppState>>) -> Json<Info> {
    tracing::debug!("GET /info");

    Json(Info {
        version: env!("CARGO_PKG_VERSION"),
        build_time: option_env!("BUILD_TIME")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        git: GitInfo {
            branch: option_env!("GIT_BRANCH").unwrap_or("unknown"),
            commit: option_env!("GIT_COMMIT").unwrap_or("unknown"),
            commit_time: option_env!("GIT_COMMIT_TIME")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        },
        target: state.config.resolver.target.as_str(),
        providers: state.source_names.clone(),
        uptime_ms: now_ms().saturating_sub(state.started_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Stub, StubResolver, test_app_state};

    #[tokio::test]
    async fn test_get_info_reports_sources() {
        let state = test_app_state(StubResolver::new(Stub::Nothing));
        let Json(info) = get_info(State(state)).await;

        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.target, "any");
        assert_eq!(info.providers, vec!["stub".to_string()]);
    }
}
