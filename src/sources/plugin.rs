use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{media::ScrapeMedia, sources::ProviderFlag};

/// A playable source found by a provider.
///
/// `stream` is whatever the provider returned and is passed to clients
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutput {
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_id: Option<String>,
    pub stream: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid provider url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

// Provider URLs carry the whole descriptor and may point at internal hosts,
// and this text can end up in a client-facing error body.
impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Trait every source provider implements.
///
/// A provider answers one question: given a media descriptor, is there a
/// playable stream? `Ok(None)` means "nothing here" and is not a failure.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Stable identifier, reported as `sourceId`.
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Higher ranks are tried first.
    fn rank(&self) -> i32;

    fn flags(&self) -> &[ProviderFlag];

    async fn scrape(&self, media: &ScrapeMedia) -> Result<Option<SourceOutput>, ProviderError>;
}

pub type BoxedProvider = Box<dyn SourceProvider>;
