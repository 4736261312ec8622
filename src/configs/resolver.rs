use serde::{Deserialize, Serialize};

use crate::sources::{ProviderFlag, Target};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResolverConfig {
    #[serde(default)]
    pub target: Target,
    /// Bound on a whole `/api/stream` lookup.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bound on a single provider request.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            timeout_secs: default_timeout_secs(),
            provider_timeout_secs: default_provider_timeout_secs(),
            providers: Vec::new(),
        }
    }
}

/// One `[[resolver.providers]]` entry.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub rank: i32,
    pub url: String,
    #[serde(default)]
    pub flags: Vec<ProviderFlag>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}
