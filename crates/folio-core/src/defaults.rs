//! Centralized default constants for folio.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// PIPELINE
// =============================================================================

/// Quiet period after the last URL edit before a pipeline run starts.
pub const DEBOUNCE_MS: u64 = 1000;

/// Timeout for a single metadata lookup in seconds.
pub const METADATA_TIMEOUT_SECS: u64 = 15;

/// Timeout for a single analysis generation in seconds.
pub const ANALYSIS_TIMEOUT_SECS: u64 = 30;

/// Broadcast capacity for pipeline events.
pub const EVENT_BUS_CAPACITY: usize = 64;

// =============================================================================
// METADATA LOOKUP
// =============================================================================

/// Default link-preview API endpoint.
pub const LINKPREVIEW_URL: &str = "https://api.linkpreview.net/";

/// User-facing message shown when metadata could not be fetched.
pub const METADATA_FAILURE_MESSAGE: &str =
    "メタデータの取得に失敗しました。URLを確認してください。";

/// Maximum HTML body size scanned by the scraping lookup (bytes).
pub const HTML_SCAN_LIMIT_BYTES: usize = 512 * 1024;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini API base URL.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini generation model.
pub const GEMINI_MODEL: &str = "gemini-pro";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 60;

/// Fixed question sent by the backend probe.
pub const PROBE_PROMPT: &str = "What is AI? Explain in one sentence.";

// =============================================================================
// DASHBOARD
// =============================================================================

/// Number of buckets in the monthly activity trend.
pub const MONTHS_PER_YEAR: usize = 12;

/// Day windows for the dashboard date-range filter.
pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;
pub const YEAR_DAYS: i64 = 365;

/// Design sub-types offered by the work editor.
pub const DESIGN_TYPES: [&str; 6] = [
    "ウェブデザイン",
    "ロゴ",
    "バナー",
    "イラスト",
    "UI/UX",
    "その他",
];
