use serde::{Deserialize, Serialize};

/// Where the resolved stream will be played. Narrows which providers are
/// consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    Native,
    Browser,
    BrowserExtension,
    #[default]
    Any,
}

/// Capabilities a provider's streams declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderFlag {
    /// Streams can be fetched cross-origin from a browser.
    CorsAllowed,
    /// Stream URLs only work from the IP that resolved them.
    IpLocked,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Browser => "browser",
            Self::BrowserExtension => "browser-extension",
            Self::Any => "any",
        }
    }

    pub fn accepts(&self, flags: &[ProviderFlag]) -> bool {
        let cors = flags.contains(&ProviderFlag::CorsAllowed);
        let ip_locked = flags.contains(&ProviderFlag::IpLocked);

        match self {
            Self::Native | Self::Any => true,
            Self::Browser => cors && !ip_locked,
            Self::BrowserExtension => !ip_locked,
        }
    }
}
