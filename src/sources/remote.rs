use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::{
    configs::ProviderConfig,
    media::ScrapeMedia,
    sources::{
        ProviderFlag, SourceProvider,
        plugin::{ProviderError, SourceOutput},
    },
};

/// Provider backed by an HTTP scraper service.
///
/// The descriptor is sent as query parameters to the configured URL. The
/// service answers 404 or 204 when it has nothing, or JSON of the form
/// `{"embedId": "...", "stream": {...}}`.
pub struct RemoteProvider {
    id: String,
    name: String,
    rank: i32,
    flags: Vec<ProviderFlag>,
    url: Url,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteResponse {
    embed_id: Option<String>,
    #[serde(default)]
    stream: serde_json::Value,
}

impl RemoteProvider {
    pub fn new(config: &ProviderConfig, client: Client) -> Result<Self, ProviderError> {
        let url = Url::parse(&config.url).map_err(|e| ProviderError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::InvalidUrl {
                url: config.url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone().unwrap_or_else(|| config.id.clone()),
            rank: config.rank,
            flags: config.flags.clone(),
            url,
            client,
        })
    }

    fn query_pairs(media: &ScrapeMedia) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("type", media.kind().as_str().to_string()),
            ("title", media.title().to_string()),
            ("tmdbId", media.tmdb_id().to_string()),
        ];
        if let Some(year) = media.release_year() {
            pairs.push(("releaseYear", year.to_string()));
        }
        if let Some((season, episode)) = media.episode() {
            pairs.push(("season", season.to_string()));
            pairs.push(("episode", episode.to_string()));
        }
        pairs
    }
}

#[async_trait]
impl SourceProvider for RemoteProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn rank(&self) -> i32 {
        self.rank
    }

    fn flags(&self) -> &[ProviderFlag] {
        &self.flags
    }

    async fn scrape(&self, media: &ScrapeMedia) -> Result<Option<SourceOutput>, ProviderError> {
        let response = self
            .client
            .get(self.url.clone())
            .query(&Self::query_pairs(media))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: RemoteResponse = response.json().await?;
        if body.stream.is_null() {
            tracing::debug!("{} answered without a stream", self.name);
            return Ok(None);
        }

        Ok(Some(SourceOutput {
            source_id: self.id.clone(),
            embed_id: body.embed_id,
            stream: body.stream,
        }))
    }
}
