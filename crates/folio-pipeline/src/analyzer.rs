//! Generative content analysis.
//!
//! The analyzer sends one prompt per descriptor and validates the reply
//! into an [`AnalysisResult`]. Anything short of a fully valid reply is
//! replaced by [`fallback_analysis`], so callers always get a result; the
//! [`AnalysisOutcome`] returned by [`ContentAnalyzer::analyze_detailed`]
//! tells a genuine analysis from a substituted one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use folio_core::defaults::ANALYSIS_TIMEOUT_SECS;
use folio_core::{
    AnalysisOutcome, AnalysisResult, AnalysisSource, ContentDescriptor, ContentStyle, Expertise,
    GenerationBackend, Interests, ScoredItem,
};

/// Highest score a category or feature may carry.
const MAX_SCORE: u8 = 100;

// =============================================================================
// PROMPT
// =============================================================================

/// Build the analysis prompt for a descriptor.
///
/// Optional fields are left out entirely when absent.
pub fn build_prompt(descriptor: &ContentDescriptor) -> String {
    let mut fields = format!("Title: {}\n", descriptor.title);
    if let Some(description) = descriptor.description.as_deref() {
        fields.push_str(&format!("Description: {}\n", description));
    }
    if let Some(url) = descriptor.source_url.as_deref() {
        fields.push_str(&format!("URL: {}\n", url));
    }

    format!(
        r#"Analyze this content and provide a detailed analysis in JSON format:

{fields}
Analyze the following aspects:
1. Expertise and professional knowledge
2. Writing style and content characteristics
3. Topics and areas of interest

Respond with ONLY this JSON structure:
{{
  "expertise": {{
    "categories": [
      {{"name": "Category", "score": 90}}
    ],
    "summary": "Summary of expertise"
  }},
  "content_style": {{
    "features": [
      {{"name": "Feature", "score": 90}}
    ],
    "summary": "Summary of style"
  }},
  "interests": {{
    "tags": ["Topic1", "Topic2"],
    "summary": "Summary of interests"
  }}
}}

Scores are integers from 0 to 100."#,
        fields = fields
    )
}

// =============================================================================
// PARSE AND VALIDATE
// =============================================================================

/// Result of validating a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisVerdict {
    Valid(AnalysisResult),
    Invalid(String),
}

impl AnalysisVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Remove a surrounding markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    match rest.find('\n') {
        Some(newline) => rest[newline + 1..].trim(),
        None => rest.trim(),
    }
}

fn require(value: &JsonValue, section: &str, field: &str) -> Result<(), String> {
    match value.get(section).and_then(|s| s.get(field)) {
        None | Some(JsonValue::Null) => Err(format!("missing {}.{}", section, field)),
        Some(_) => Ok(()),
    }
}

/// Parse and validate a raw model reply.
///
/// Valid means: JSON (optionally fenced), with non-null
/// `expertise.categories`, `content_style.features` and `interests.tags`,
/// every field of the right type, and every score within 0..=100.
pub fn parse_analysis(text: &str) -> AnalysisVerdict {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return AnalysisVerdict::Invalid("empty response".to_string());
    }

    let value: JsonValue = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return AnalysisVerdict::Invalid(format!("not JSON: {}", e)),
    };
    if !value.is_object() {
        return AnalysisVerdict::Invalid("top level is not an object".to_string());
    }

    let style_key = if value.get("content_style").is_some() {
        "content_style"
    } else {
        "contentStyle"
    };
    let checks = [
        require(&value, "expertise", "categories"),
        require(&value, style_key, "features"),
        require(&value, "interests", "tags"),
    ];
    if let Some(Err(reason)) = checks.into_iter().find(|c| c.is_err()) {
        return AnalysisVerdict::Invalid(reason);
    }

    let result: AnalysisResult = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => return AnalysisVerdict::Invalid(format!("shape mismatch: {}", e)),
    };

    let scores = result
        .expertise
        .categories
        .iter()
        .chain(result.content_style.features.iter());
    for item in scores {
        if item.score > MAX_SCORE {
            return AnalysisVerdict::Invalid(format!(
                "score out of range: {} = {}",
                item.name, item.score
            ));
        }
    }

    AnalysisVerdict::Valid(result)
}

// =============================================================================
// FALLBACK
// =============================================================================

/// The fixed analysis substituted for any invalid or failed reply.
pub fn fallback_analysis() -> AnalysisResult {
    AnalysisResult {
        expertise: Expertise {
            categories: vec![
                ScoredItem::new("テクノロジー", 85),
                ScoredItem::new("プログラミング", 90),
                ScoredItem::new("ビジネス", 75),
            ],
            summary: "技術的な知識と実践的な経験が豊富です。特にプログラミングとテクノロジー分野での専門性が高く評価されます。".to_string(),
        },
        content_style: ContentStyle {
            features: vec![
                ScoredItem::new("論理性", 90),
                ScoredItem::new("読みやすさ", 85),
                ScoredItem::new("専門性", 88),
            ],
            summary: "論理的で分かりやすい説明が特徴です。専門的な内容を読者に理解しやすく伝える能力が高く評価されます。".to_string(),
        },
        interests: Interests {
            tags: vec![
                "AI".to_string(),
                "Web開発".to_string(),
                "UX設計".to_string(),
                "生産性向上".to_string(),
            ],
            summary: "最新技術とユーザー体験に高い関心があります。特にAIとWeb技術の分野で積極的な探求心が見られます。".to_string(),
        },
    }
}

// =============================================================================
// ANALYZER
// =============================================================================

/// Configuration for the content analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: ANALYSIS_TIMEOUT_SECS,
        }
    }
}

impl AnalyzerConfig {
    /// | Variable | Default |
    /// |----------|---------|
    /// | `FOLIO_ANALYSIS_TIMEOUT_SECS` | `30` |
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("FOLIO_ANALYSIS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(ANALYSIS_TIMEOUT_SECS)
            .max(1);
        Self { timeout_secs }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Analyzes content descriptors with an injected generation backend.
#[derive(Clone)]
pub struct ContentAnalyzer {
    backend: Arc<dyn GenerationBackend>,
    timeout: Duration,
}

impl ContentAnalyzer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_config(backend, AnalyzerConfig::default())
    }

    pub fn with_config(backend: Arc<dyn GenerationBackend>, config: AnalyzerConfig) -> Self {
        Self {
            backend,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Analyze a descriptor. Always resolves to a valid result.
    pub async fn analyze(&self, descriptor: &ContentDescriptor) -> AnalysisResult {
        self.analyze_detailed(descriptor).await.result
    }

    /// Analyze a descriptor, reporting whether the fallback was used.
    #[instrument(skip(self, descriptor), fields(subsystem = "pipeline", component = "analyzer", op = "analyze", model = self.backend.model_name()))]
    pub async fn analyze_detailed(&self, descriptor: &ContentDescriptor) -> AnalysisOutcome {
        let start = Instant::now();
        let prompt = build_prompt(descriptor);

        let verdict = match tokio::time::timeout(self.timeout, self.backend.generate(&prompt)).await
        {
            Ok(Ok(text)) => {
                debug!(
                    prompt_len = prompt.len(),
                    response_len = text.len(),
                    "Model replied"
                );
                parse_analysis(&text)
            }
            Ok(Err(e)) => AnalysisVerdict::Invalid(format!("generation failed: {}", e)),
            Err(_) => AnalysisVerdict::Invalid(format!(
                "generation timed out after {}s",
                self.timeout.as_secs()
            )),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match verdict {
            AnalysisVerdict::Valid(result) => {
                info!(used_fallback = false, duration_ms, "Analysis complete");
                AnalysisOutcome {
                    result,
                    source: AnalysisSource::Model,
                    reason: None,
                }
            }
            AnalysisVerdict::Invalid(reason) => {
                warn!(
                    used_fallback = true,
                    error = %reason,
                    duration_ms,
                    "Analysis replaced by fallback"
                );
                AnalysisOutcome {
                    result: fallback_analysis(),
                    source: AnalysisSource::Fallback,
                    reason: Some(reason),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_inference::mock::MockGenerationBackend;

    const VALID: &str = r#"{
        "expertise": {"categories": [{"name": "Rust", "score": 92}], "summary": "Systems"},
        "content_style": {"features": [{"name": "Clarity", "score": 80}], "summary": "Clear"},
        "interests": {"tags": ["compilers"], "summary": "Languages"}
    }"#;

    fn descriptor() -> ContentDescriptor {
        ContentDescriptor::new("Future of AI")
            .with_description("An article about AI")
            .with_source_url("https://example.com/ai")
    }

    #[test]
    fn test_prompt_embeds_fields() {
        let prompt = build_prompt(&descriptor());
        assert!(prompt.contains("Title: Future of AI"));
        assert!(prompt.contains("Description: An article about AI"));
        assert!(prompt.contains("URL: https://example.com/ai"));
        assert!(prompt.contains("Respond with ONLY this JSON structure"));
        assert!(prompt.contains("\"content_style\""));
    }

    #[test]
    fn test_prompt_omits_absent_fields() {
        let prompt = build_prompt(&ContentDescriptor::new("Bare"));
        assert!(!prompt.contains("Description:"));
        assert!(!prompt.contains("URL:"));
    }

    #[test]
    fn test_parse_valid() {
        let AnalysisVerdict::Valid(result) = parse_analysis(VALID) else {
            panic!("expected valid verdict");
        };
        assert_eq!(result.expertise.categories[0].name, "Rust");
        assert_eq!(result.interests.tags, vec!["compilers".to_string()]);
    }

    #[test]
    fn test_parse_fenced() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(parse_analysis(&fenced).is_valid());
    }

    #[test]
    fn test_parse_missing_tags() {
        let text = r#"{
            "expertise": {"categories": [], "summary": ""},
            "content_style": {"features": [], "summary": ""},
            "interests": {"summary": "no tags"}
        }"#;
        assert_eq!(
            parse_analysis(text),
            AnalysisVerdict::Invalid("missing interests.tags".to_string())
        );
    }

    #[test]
    fn test_parse_null_categories() {
        let text = r#"{
            "expertise": {"categories": null},
            "content_style": {"features": []},
            "interests": {"tags": []}
        }"#;
        assert!(!parse_analysis(text).is_valid());
    }

    #[test]
    fn test_parse_score_out_of_range() {
        let text = VALID.replace("92", "150");
        assert!(!parse_analysis(&text).is_valid());
        let text = VALID.replace("92", "-1");
        assert!(!parse_analysis(&text).is_valid());
    }

    #[test]
    fn test_parse_wrong_types() {
        let text = VALID.replace(r#"["compilers"]"#, r#""compilers""#);
        assert!(!parse_analysis(&text).is_valid());
    }

    #[test]
    fn test_parse_not_json() {
        assert!(!parse_analysis("Sure! Here is the analysis.").is_valid());
        assert!(!parse_analysis("").is_valid());
        assert!(!parse_analysis("[1, 2]").is_valid());
    }

    #[test]
    fn test_missing_summary_defaults_to_empty() {
        let text = r#"{
            "expertise": {"categories": []},
            "contentStyle": {"features": []},
            "interests": {"tags": []}
        }"#;
        let AnalysisVerdict::Valid(result) = parse_analysis(text) else {
            panic!("expected valid verdict");
        };
        assert!(result.expertise.summary.is_empty());
    }

    #[test]
    fn test_fallback_is_stable() {
        let a = fallback_analysis();
        assert_eq!(a, fallback_analysis());
        assert_eq!(a.expertise.categories.len(), 3);
        assert_eq!(a.content_style.features[2], ScoredItem::new("専門性", 88));
        assert_eq!(a.interests.tags, vec!["AI", "Web開発", "UX設計", "生産性向上"]);
    }

    #[tokio::test]
    async fn test_analyze_valid_reply() {
        let backend = Arc::new(MockGenerationBackend::new().with_fixed_response(VALID));
        let analyzer = ContentAnalyzer::new(backend.clone());

        let outcome = analyzer.analyze_detailed(&descriptor()).await;
        assert!(!outcome.used_fallback());
        assert!(outcome.reason.is_none());
        assert_eq!(outcome.result.expertise.categories[0].score, 92);
        assert_eq!(backend.generate_call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_backend_failure_uses_fallback() {
        let backend = Arc::new(MockGenerationBackend::new().with_failure("quota exceeded"));
        let analyzer = ContentAnalyzer::new(backend.clone());

        let outcome = analyzer.analyze_detailed(&descriptor()).await;
        assert!(outcome.used_fallback());
        assert_eq!(outcome.result, fallback_analysis());
        assert!(outcome.reason.unwrap().contains("quota exceeded"));
        assert_eq!(backend.generate_call_count(), 1, "no retry");
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_timeout_uses_fallback() {
        let backend = Arc::new(
            MockGenerationBackend::new()
                .with_fixed_response(VALID)
                .with_latency_ms(60_000),
        );
        let analyzer =
            ContentAnalyzer::with_config(backend, AnalyzerConfig::default().with_timeout_secs(5));

        let outcome = analyzer.analyze_detailed(&descriptor()).await;
        assert!(outcome.used_fallback());
        assert!(outcome.reason.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_analyze_returns_plain_result() {
        let backend = Arc::new(MockGenerationBackend::new().with_fixed_response("nonsense"));
        let result = ContentAnalyzer::new(backend).analyze(&descriptor()).await;
        assert_eq!(result, fallback_analysis());
    }
}
