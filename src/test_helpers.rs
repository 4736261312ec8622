//! Helpers shared by unit tests.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::Router;

use crate::{
    configs::Config,
    media::ScrapeMedia,
    server::AppState,
    sources::{MediaResolver, ResolveError, SourceOutput},
};

/// Serves `app` on an ephemeral loopback port and returns its address.
pub async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind loopback listener");
    let addr = listener.local_addr().expect("listener should have an address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("upstream server failed");
    });
    addr
}

/// Sets its flag when dropped, to observe that a future or stream was abandoned.
pub struct DropSignal(pub Arc<AtomicBool>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Polls `flag` until it is set or `limit` elapses. Returns the final value.
pub async fn wait_for(flag: &AtomicBool, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while !flag.load(Ordering::SeqCst) {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    true
}

/// What a [`StubResolver`] answers.
pub enum Stub {
    Found(SourceOutput),
    Nothing,
    Fails(&'static str),
    Hangs,
    /// Never answers; the flag is set once the pending lookup is dropped.
    HangsWatched(Arc<AtomicBool>),
}

/// Resolver with a canned answer. Records the last descriptor it saw.
pub struct StubResolver {
    pub answer: Stub,
    pub seen: std::sync::Mutex<Option<ScrapeMedia>>,
}

impl StubResolver {
    pub fn new(answer: Stub) -> Arc<Self> {
        Arc::new(Self {
            answer,
            seen: std::sync::Mutex::new(None),
        })
    }

    pub fn last_seen(&self) -> Option<ScrapeMedia> {
        self.seen.lock().expect("stub mutex poisoned").clone()
    }
}

#[async_trait]
impl MediaResolver for StubResolver {
    async fn resolve(&self, media: &ScrapeMedia) -> Result<Option<SourceOutput>, ResolveError> {
        *self.seen.lock().expect("stub mutex poisoned") = Some(media.clone());
        match &self.answer {
            Stub::Found(output) => Ok(Some(output.clone())),
            Stub::Nothing => Ok(None),
            Stub::Fails(message) => Err(ResolveError::new(*message)),
            Stub::Hangs => {
                std::future::pending::<()>().await;
                Ok(None)
            }
            Stub::HangsWatched(dropped) => {
                let _signal = DropSignal(dropped.clone());
                std::future::pending::<()>().await;
                Ok(None)
            }
        }
    }
}

/// `AppState` wired to the given resolver with default config.
pub fn test_app_state(resolver: Arc<dyn MediaResolver>) -> Arc<AppState> {
    test_app_state_with(Config::default(), resolver)
}

pub fn test_app_state_with(config: Config, resolver: Arc<dyn MediaResolver>) -> Arc<AppState> {
    Arc::new(
        AppState::new(config, resolver, vec!["stub".into()])
            .expect("failed to create test AppState"),
    )
}
