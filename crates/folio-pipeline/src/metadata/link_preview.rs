//! Link-preview JSON API lookup.
//!
//! `GET {base}?key={api_key}&q={url}` returning
//! `{"title", "description", "image", "url"}` on success. Failures come back
//! as a 4xx with `{"error": <code>, "description": <message>}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use folio_core::{Error, LookupResponse, MetadataLookup, Result};

pub struct LinkPreviewLookup {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl LinkPreviewLookup {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid LINKPREVIEW_URL {}: {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Metadata(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn request_url(&self, url: &str) -> Url {
        let mut request_url = self.base_url.clone();
        request_url
            .query_pairs_mut()
            .append_pair("key", self.api_key.as_deref().unwrap_or_default())
            .append_pair("q", url);
        request_url
    }
}

#[async_trait]
impl MetadataLookup for LinkPreviewLookup {
    #[instrument(skip(self), fields(subsystem = "pipeline", component = "linkpreview", op = "lookup"))]
    async fn lookup(&self, url: &str) -> Result<LookupResponse> {
        let response = self
            .client
            .get(self.request_url(url))
            .send()
            .await
            .map_err(|e| Error::Metadata(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Metadata(format!("Failed to read response: {}", e)))?;

        let parsed = serde_json::from_str::<LookupResponse>(&body);

        if !status.is_success() {
            let detail = parsed
                .ok()
                .and_then(|r| r.reported_error())
                .unwrap_or_else(|| status.to_string());
            return Err(Error::Metadata(format!(
                "Link preview returned {}: {}",
                status, detail
            )));
        }

        let parsed = parsed
            .map_err(|e| Error::Metadata(format!("Failed to parse response: {}", e)))?;
        debug!(has_title = parsed.title.is_some(), "Link preview responded");
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "linkpreview"
    }
}
