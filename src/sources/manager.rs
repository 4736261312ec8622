use std::{cmp::Reverse, time::Duration};

use async_trait::async_trait;

use super::{
  plugin::{BoxedProvider, SourceOutput},
  remote::RemoteProvider,
  target::Target,
};
use crate::{common::HttpClient, configs::Config, media::ScrapeMedia};

/// The lookup endpoint's view of the resolution engine.
#[async_trait]
pub trait MediaResolver: Send + Sync {
  async fn resolve(&self, media: &ScrapeMedia) -> Result<Option<SourceOutput>, ResolveError>;
}

/// The engine failed outright. The message is shown to API clients as-is.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ResolveError {
  pub message: String,
}

impl ResolveError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

/// Source Manager
///
/// Holds the providers usable for the configured target, highest rank first.
pub struct SourceManager {
  target: Target,
  providers: Vec<BoxedProvider>,
}

impl SourceManager {
  /// Create a SourceManager from the `[resolver]` section.
  pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
    let resolver = &config.resolver;
    let client = HttpClient::new(Duration::from_secs(resolver.provider_timeout_secs))?;
    let mut providers: Vec<BoxedProvider> = Vec::new();

    macro_rules! register_provider {
      ($enabled:expr, $name:expr, $ctor:expr) => {
        if $enabled {
          match $ctor {
            Ok(provider) => {
              tracing::info!("Loaded provider: {}", $name);
              providers.push(Box::new(provider));
            }
            Err(e) => {
              tracing::error!("{} provider failed to initialize: {}", $name, e);
            }
          }
        }
      };
    }

    for provider in &resolver.providers {
      register_provider!(
        provider.enabled,
        provider.id,
        RemoteProvider::new(provider, client.clone())
      );
    }

    Ok(Self::with_providers(resolver.target, providers))
  }

  pub fn with_providers(target: Target, providers: Vec<BoxedProvider>) -> Self {
    let mut providers: Vec<BoxedProvider> = providers
      .into_iter()
      .filter(|p| {
        let accepted = target.accepts(p.flags());
        if !accepted {
          tracing::info!(
            "Skipping provider {}: not usable for target {}",
            p.id(),
            target.as_str()
          );
        }
        accepted
      })
      .collect();

    providers.sort_by_key(|p| Reverse(p.rank()));

    Self { target, providers }
  }

  pub fn target(&self) -> Target {
    self.target
  }

  /// Provider ids in the order they are tried.
  pub fn provider_ids(&self) -> Vec<String> {
    self.providers.iter().map(|p| p.id().to_string()).collect()
  }
}

#[async_trait]
impl MediaResolver for SourceManager {
  /// Tries every provider in rank order and returns the first hit.
  ///
  /// Provider failures are skipped. Only when every attempted provider
  /// failed is the lookup itself reported as failed.
  async fn resolve(&self, media: &ScrapeMedia) -> Result<Option<SourceOutput>, ResolveError> {
    let mut failed = 0usize;
    let mut last_error: Option<(String, String)> = None;

    for provider in &self.providers {
      tracing::debug!(
        "Scraping '{}' ({}) with provider: {}",
        media.title(),
        media.kind().as_str(),
        provider.id()
      );

      match provider.scrape(media).await {
        Ok(Some(output)) => {
          tracing::info!(
            "Provider {} resolved '{}' (tmdb {})",
            provider.id(),
            media.title(),
            media.tmdb_id()
          );
          return Ok(Some(output));
        }
        Ok(None) => {
          tracing::debug!("Provider {} found nothing", provider.id());
        }
        Err(e) => {
          tracing::warn!("Provider {} failed: {}", provider.id(), e);
          failed += 1;
          last_error = Some((provider.id().to_string(), e.to_string()));
        }
      }
    }

    match last_error {
      Some((source_id, message)) if failed == self.providers.len() => Err(ResolveError::new(
        format!(
          "all {} sources failed, last error from {}: {}",
          failed, source_id, message
        ),
      )),
      _ => Ok(None),
    }
  }
}
