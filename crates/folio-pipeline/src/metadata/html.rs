//! Scraping lookup: fetch the page itself and read its head tags.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};

use folio_core::defaults::HTML_SCAN_LIMIT_BYTES;
use folio_core::{Error, LookupResponse, MetadataLookup, Result};

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").expect("valid regex"));

/// `<meta {attr}="{name}" ... content="...">` in either attribute order.
///
/// Each quote style gets its own group so the other quote character can
/// appear inside the value.
fn meta_pattern(attr: &str, name: &str) -> Regex {
    let pattern = format!(
        r#"(?is)<meta[^>]*{attr}\s*=\s*["']{name}["'][^>]*content\s*=\s*(?:"([^"]*)"|'([^']*)')|<meta[^>]*content\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*{attr}\s*=\s*["']{name}["']"#,
        attr = attr,
        name = regex::escape(name),
    );
    Regex::new(&pattern).expect("valid regex")
}

static OG_TITLE: Lazy<Regex> = Lazy::new(|| meta_pattern("property", "og:title"));
static META_DESCRIPTION: Lazy<Regex> = Lazy::new(|| meta_pattern("name", "description"));
static OG_DESCRIPTION: Lazy<Regex> = Lazy::new(|| meta_pattern("property", "og:description"));
static OG_IMAGE: Lazy<Regex> = Lazy::new(|| meta_pattern("property", "og:image"));

fn capture(re: &Regex, html: &str) -> Option<String> {
    let caps = re.captures(html)?;
    let value = caps.iter().skip(1).flatten().next()?.as_str();
    let value = decode_entities(value.trim());
    (!value.is_empty()).then_some(value)
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Read title, description and image from an HTML document.
///
/// `<title>` wins over `og:title`; `meta name=description` wins over
/// `og:description`.
pub fn extract_html_metadata(html: &str) -> LookupResponse {
    LookupResponse {
        title: capture(&TITLE_TAG, html).or_else(|| capture(&OG_TITLE, html)),
        description: capture(&META_DESCRIPTION, html).or_else(|| capture(&OG_DESCRIPTION, html)),
        image: capture(&OG_IMAGE, html),
        error: None,
    }
}

/// Append as much of `chunk` as fits under `limit`. Returns true once full.
fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], limit: usize) -> bool {
    let room = limit.saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    buf.len() >= limit
}

pub struct HtmlMetadataLookup {
    client: Client,
}

impl HtmlMetadataLookup {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Metadata(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataLookup for HtmlMetadataLookup {
    #[instrument(skip(self), fields(subsystem = "pipeline", component = "html", op = "lookup"))]
    async fn lookup(&self, url: &str) -> Result<LookupResponse> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Metadata(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Metadata(format!(
                "Page returned {}",
                response.status()
            )));
        }

        // Only the head matters; stop downloading once the scan window is full.
        let mut body = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Metadata(format!("Failed to read page: {}", e)))?
        {
            if append_capped(&mut body, &chunk, HTML_SCAN_LIMIT_BYTES) {
                truncated = true;
                break;
            }
        }
        let html = String::from_utf8_lossy(&body);

        let parsed = extract_html_metadata(&html);
        debug!(
            body_len = body.len(),
            truncated,
            has_title = parsed.title.is_some(),
            "Page scraped"
        );
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_tag_preferred_over_og_title() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Page Title</title>
        </head></html>"#;
        assert_eq!(
            extract_html_metadata(html).title.as_deref(),
            Some("Page Title")
        );
    }

    #[test]
    fn test_og_fallbacks() {
        let html = r#"<head>
            <meta property="og:title" content="Only OG">
            <meta property="og:description" content="OG description">
            <meta property="og:image" content="https://x/img.png">
        </head>"#;
        let parsed = extract_html_metadata(html);
        assert_eq!(parsed.title.as_deref(), Some("Only OG"));
        assert_eq!(parsed.description.as_deref(), Some("OG description"));
        assert_eq!(parsed.image.as_deref(), Some("https://x/img.png"));
    }

    #[test]
    fn test_content_before_name_attribute() {
        let html = r#"<meta content="Reversed order" name="description">"#;
        assert_eq!(
            extract_html_metadata(html).description.as_deref(),
            Some("Reversed order")
        );
    }

    #[test]
    fn test_entities_decoded() {
        let html = "<title>Tom &amp; Jerry</title>";
        assert_eq!(
            extract_html_metadata(html).title.as_deref(),
            Some("Tom & Jerry")
        );
    }

    #[test]
    fn test_empty_document() {
        let parsed = extract_html_metadata("");
        assert!(parsed.title.is_none());
        assert!(parsed.description.is_none());
        assert!(parsed.image.is_none());
    }

    #[test]
    fn test_apostrophe_inside_double_quotes() {
        let html = r#"<head>
            <meta name="description" content="Don't panic: a guide">
            <meta property="og:image" content="https://x/it's.png">
        </head>"#;
        let parsed = extract_html_metadata(html);
        assert_eq!(parsed.description.as_deref(), Some("Don't panic: a guide"));
        assert_eq!(parsed.image.as_deref(), Some("https://x/it's.png"));
    }

    #[test]
    fn test_double_quote_inside_single_quotes() {
        let html = r#"<meta property='og:title' content='He said "hi"'>
            <meta content='It&#39;s "fine"' name='description'>"#;
        let parsed = extract_html_metadata(html);
        assert_eq!(parsed.title.as_deref(), Some(r#"He said "hi""#));
        assert_eq!(parsed.description.as_deref(), Some(r#"It's "fine""#));
    }

    #[test]
    fn test_append_capped_stops_at_limit() {
        let mut buf = Vec::new();
        assert!(!append_capped(&mut buf, b"abc", 5));
        assert!(append_capped(&mut buf, b"defgh", 5));
        assert_eq!(buf, b"abcde");
        assert!(append_capped(&mut buf, b"xyz", 5));
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_split_multibyte_char_is_lossy() {
        let mut buf = Vec::new();
        append_capped(&mut buf, "<title>日本</title>".as_bytes(), 9);
        let html = String::from_utf8_lossy(&buf);
        assert_eq!(html, "<title>\u{FFFD}");
        assert!(extract_html_metadata(&html).title.is_none());
    }
}
