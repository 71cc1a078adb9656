//! Metadata extraction for source URLs.
//!
//! [`MetadataExtractor`] wraps an injected [`MetadataLookup`] and turns every
//! possible failure into a [`Metadata`] value with `error` set, so callers
//! branch on data instead of handling errors.
//!
//! Two lookups ship:
//!
//! | Provider | Type | Source |
//! |----------|------|--------|
//! | `linkpreview` | [`LinkPreviewLookup`] | link-preview JSON API |
//! | `html` | [`HtmlMetadataLookup`] | fetches the page and scrapes tags |

mod html;
mod link_preview;

pub use html::{extract_html_metadata, HtmlMetadataLookup};
pub use link_preview::LinkPreviewLookup;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use folio_core::defaults::{LINKPREVIEW_URL, METADATA_FAILURE_MESSAGE, METADATA_TIMEOUT_SECS};
use folio_core::{Error, LookupResponse, Metadata, MetadataLookup, Result};

/// Which lookup implementation backs the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataProvider {
    #[default]
    LinkPreview,
    Html,
}

impl FromStr for MetadataProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linkpreview" => Ok(Self::LinkPreview),
            "html" => Ok(Self::Html),
            other => Err(Error::Config(format!(
                "Unknown metadata provider: {} (expected linkpreview or html)",
                other
            ))),
        }
    }
}

impl fmt::Display for MetadataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkPreview => write!(f, "linkpreview"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// Configuration for metadata extraction.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub provider: MetadataProvider,
    pub linkpreview_url: String,
    pub linkpreview_api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            provider: MetadataProvider::default(),
            linkpreview_url: LINKPREVIEW_URL.to_string(),
            linkpreview_api_key: None,
            timeout_secs: METADATA_TIMEOUT_SECS,
        }
    }
}

impl MetadataConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `FOLIO_METADATA_PROVIDER` | `linkpreview` | `linkpreview` or `html` |
    /// | `LINKPREVIEW_URL` | `https://api.linkpreview.net/` | Link-preview endpoint |
    /// | `LINKPREVIEW_API_KEY` | unset | Link-preview API key |
    /// | `FOLIO_METADATA_TIMEOUT_SECS` | `15` | Per-lookup timeout |
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let provider = match std::env::var("FOLIO_METADATA_PROVIDER") {
            Ok(v) if !v.trim().is_empty() => v.parse()?,
            _ => defaults.provider,
        };

        Ok(Self {
            provider,
            linkpreview_url: std::env::var("LINKPREVIEW_URL").unwrap_or(defaults.linkpreview_url),
            linkpreview_api_key: std::env::var("LINKPREVIEW_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout_secs: std::env::var("FOLIO_METADATA_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.timeout_secs)
                .max(1),
        })
    }

    pub fn with_provider(mut self, provider: MetadataProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Construct the configured lookup.
    pub fn build_lookup(&self) -> Result<Arc<dyn MetadataLookup>> {
        let timeout = Duration::from_secs(self.timeout_secs);
        let lookup: Arc<dyn MetadataLookup> = match self.provider {
            MetadataProvider::LinkPreview => Arc::new(LinkPreviewLookup::new(
                &self.linkpreview_url,
                self.linkpreview_api_key.clone(),
                timeout,
            )?),
            MetadataProvider::Html => Arc::new(HtmlMetadataLookup::new(timeout)?),
        };
        Ok(lookup)
    }
}

/// Resolves a URL to page metadata through an injected lookup.
#[derive(Clone)]
pub struct MetadataExtractor {
    lookup: Arc<dyn MetadataLookup>,
    timeout: Duration,
}

impl MetadataExtractor {
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self {
            lookup,
            timeout: Duration::from_secs(METADATA_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &MetadataConfig) -> Result<Self> {
        Ok(Self::new(config.build_lookup()?)
            .with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn lookup_name(&self) -> &str {
        self.lookup.name()
    }

    /// Fetch metadata for `url`.
    ///
    /// Exactly one lookup, no retry. Transport errors, timeouts and
    /// service-reported errors all yield [`Metadata::failure`] with a
    /// user-facing message; the detail goes to the log.
    #[instrument(skip(self), fields(subsystem = "pipeline", component = "metadata", op = "extract", lookup = self.lookup.name()))]
    pub async fn extract(&self, url: &str) -> Metadata {
        let start = Instant::now();

        let response = match tokio::time::timeout(self.timeout, self.lookup.lookup(url)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return self.failed(&e.to_string(), start),
            Err(_) => {
                return self.failed(
                    &format!("lookup timed out after {}s", self.timeout.as_secs()),
                    start,
                )
            }
        };

        if let Some(reported) = response.reported_error() {
            return self.failed(&reported, start);
        }

        let metadata = into_metadata(response);
        debug!(
            has_title = !metadata.title.is_empty(),
            has_description = metadata.description.is_some(),
            has_thumbnail = metadata.thumbnail_url.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Metadata extracted"
        );
        metadata
    }

    fn failed(&self, detail: &str, start: Instant) -> Metadata {
        warn!(
            error = detail,
            duration_ms = start.elapsed().as_millis() as u64,
            "Metadata lookup failed"
        );
        Metadata::failure(METADATA_FAILURE_MESSAGE)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn into_metadata(response: LookupResponse) -> Metadata {
    Metadata {
        title: non_empty(response.title).unwrap_or_default(),
        description: non_empty(response.description),
        thumbnail_url: non_empty(response.image),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedLookup(Result<LookupResponse>);

    #[async_trait]
    impl MetadataLookup for FixedLookup {
        async fn lookup(&self, _url: &str) -> Result<LookupResponse> {
            match &self.0 {
                Ok(r) => Ok(r.clone()),
                Err(e) => Err(Error::Metadata(e.to_string())),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct HangingLookup;

    #[async_trait]
    impl MetadataLookup for HangingLookup {
        async fn lookup(&self, _url: &str) -> Result<LookupResponse> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    fn extractor(result: Result<LookupResponse>) -> MetadataExtractor {
        MetadataExtractor::new(Arc::new(FixedLookup(result)))
    }

    #[tokio::test]
    async fn test_success_maps_fields() {
        let meta = extractor(Ok(LookupResponse {
            title: Some("  Future of AI ".into()),
            description: Some("An article about AI".into()),
            image: Some("https://x/img.png".into()),
            error: None,
        }))
        .extract("https://example.com/a")
        .await;

        assert!(!meta.is_error());
        assert_eq!(meta.title, "Future of AI");
        assert_eq!(meta.description.as_deref(), Some("An article about AI"));
        assert_eq!(meta.thumbnail_url.as_deref(), Some("https://x/img.png"));
    }

    #[tokio::test]
    async fn test_missing_fields_do_not_fault() {
        let meta = extractor(Ok(LookupResponse::default()))
            .extract("https://example.com")
            .await;
        assert!(!meta.is_error());
        assert!(meta.title.is_empty());
        assert!(meta.description.is_none());
        assert!(meta.thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn test_reported_error_becomes_failure() {
        let meta = extractor(Ok(LookupResponse {
            title: Some("ignored".into()),
            error: Some(json!("fetch failed")),
            ..Default::default()
        }))
        .extract("https://example.com")
        .await;

        assert_eq!(meta.error.as_deref(), Some(METADATA_FAILURE_MESSAGE));
        assert!(meta.title.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failure() {
        let meta = extractor(Err(Error::Request("connection refused".into())))
            .extract("https://example.com")
            .await;
        assert_eq!(meta, Metadata::failure(METADATA_FAILURE_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_failure() {
        let meta = MetadataExtractor::new(Arc::new(HangingLookup))
            .with_timeout(Duration::from_secs(2))
            .extract("https://example.com")
            .await;
        assert!(meta.is_error());
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(
            "HTML".parse::<MetadataProvider>().unwrap(),
            MetadataProvider::Html
        );
        assert_eq!(
            "linkpreview".parse::<MetadataProvider>().unwrap(),
            MetadataProvider::LinkPreview
        );
        assert!("opengraph".parse::<MetadataProvider>().is_err());
    }

    #[test]
    fn test_build_lookup_per_provider() {
        let config = MetadataConfig::default();
        assert_eq!(config.build_lookup().unwrap().name(), "linkpreview");

        let config = config.with_provider(MetadataProvider::Html);
        assert_eq!(config.build_lookup().unwrap().name(), "html");
    }
}
