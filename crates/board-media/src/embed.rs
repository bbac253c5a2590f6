//! oEmbed previews for remote media links

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{MediaError, MediaResult};

const MAX_REDIRECTS: usize = 3;
const USER_AGENT: &str = concat!("board-media/", env!("CARGO_PKG_VERSION"));

/// Metadata a provider returned for a link. Everything but the provider name is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedPreview {
    pub provider_name: String,
    pub title: Option<String>,
    pub uploader_name: Option<String>,
    pub thumbnail_url: Option<String>,
    pub html: Option<String>,
}

#[async_trait]
pub trait EmbedResolver: Send + Sync {
    /// Fetch a preview. `None` means no preview is available and the caller should keep
    /// just the URL.
    async fn resolve(&self, url: &Url) -> Option<EmbedPreview>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Vimeo,
    SoundCloud,
}

impl Provider {
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
        match host {
            "youtube.com" | "youtu.be" | "music.youtube.com" => Some(Self::YouTube),
            "vimeo.com" | "player.vimeo.com" => Some(Self::Vimeo),
            "soundcloud.com" => Some(Self::SoundCloud),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Vimeo => "Vimeo",
            Self::SoundCloud => "SoundCloud",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Self::YouTube => "https://www.youtube.com/oembed",
            Self::Vimeo => "https://vimeo.com/api/oembed.json",
            Self::SoundCloud => "https://soundcloud.com/oembed",
        }
    }
}

/// Provider name for a link: the known provider, or the bare host
pub fn provider_name(url: &Url) -> String {
    match Provider::from_url(url) {
        Some(provider) => provider.name().to_string(),
        None => url
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_string())
            .unwrap_or_default(),
    }
}

/// Parse a user-supplied link. Only absolute http(s) URLs with a host are accepted.
pub fn parse_embed_url(raw: &str) -> MediaResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|_| MediaError::unsupported(format!("not a valid link: {raw}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(MediaError::unsupported(format!("not a valid link: {raw}")));
    }
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
    provider_name: Option<String>,
    thumbnail_url: Option<String>,
    html: Option<String>,
}

/// Resolves previews from the YouTube, Vimeo, and SoundCloud oEmbed endpoints
#[derive(Debug, Clone)]
pub struct OEmbedResolver {
    client: Client,
}

impl OEmbedResolver {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> MediaResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MediaError::StorageFailure(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn fetch(&self, provider: Provider, url: &Url) -> Result<OEmbedResponse, reqwest::Error> {
        self.client
            .get(provider.endpoint())
            .query(&[("url", url.as_str()), ("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .json::<OEmbedResponse>()
            .await
    }
}

#[async_trait]
impl EmbedResolver for OEmbedResolver {
    #[instrument(skip(self), fields(url = %url))]
    async fn resolve(&self, url: &Url) -> Option<EmbedPreview> {
        let Some(provider) = Provider::from_url(url) else {
            debug!("No oEmbed provider for host");
            return None;
        };

        match self.fetch(provider, url).await {
            Ok(response) => Some(EmbedPreview {
                provider_name: response
                    .provider_name
                    .unwrap_or_else(|| provider.name().to_string()),
                title: response.title,
                uploader_name: response.author_name,
                thumbnail_url: response.thumbnail_url,
                html: response.html,
            }),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "oEmbed lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_provider_from_host() {
        assert_eq!(
            Provider::from_url(&url("https://www.youtube.com/watch?v=abc")),
            Some(Provider::YouTube)
        );
        assert_eq!(Provider::from_url(&url("https://youtu.be/abc")), Some(Provider::YouTube));
        assert_eq!(Provider::from_url(&url("https://vimeo.com/1234")), Some(Provider::Vimeo));
        assert_eq!(
            Provider::from_url(&url("https://soundcloud.com/a/b")),
            Some(Provider::SoundCloud)
        );
        assert_eq!(Provider::from_url(&url("https://example.com/v")), None);
    }

    #[test]
    fn test_provider_name_falls_back_to_host() {
        assert_eq!(provider_name(&url("https://m.youtube.com/watch?v=1")), "YouTube");
        assert_eq!(provider_name(&url("https://www.example.com/clip")), "example.com");
    }

    #[test]
    fn test_parse_embed_url() {
        assert!(parse_embed_url("https://youtu.be/abc").is_ok());
        assert!(parse_embed_url("  https://youtu.be/abc ").is_ok());
        assert!(matches!(
            parse_embed_url("javascript:alert(1)"),
            Err(MediaError::UnsupportedMediaType(_))
        ));
        assert!(parse_embed_url("not a url").is_err());
        assert!(parse_embed_url("ftp://example.com/file").is_err());
    }

    #[tokio::test]
    async fn test_unknown_provider_resolves_to_none() {
        let resolver =
            OEmbedResolver::new(Duration::from_millis(100), Duration::from_millis(200)).unwrap();
        assert!(resolver.resolve(&url("https://example.com/clip")).await.is_none());
    }
}
