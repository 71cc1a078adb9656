//! Structured logging schema and field name constants for folio.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log queries can filter on the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, pipeline run completions |
//! | DEBUG | Decision points, phase transitions, config choices |
//! | TRACE | Per-item iteration (filter matches, bucket counts) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "pipeline", "inference", "dashboard"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "metadata", "analyzer", "debounce", "gemini"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "extract", "analyze", "generate", "run"
pub const OPERATION: &str = "op";

/// Token of the pipeline run a log event belongs to.
pub const RUN_TOKEN: &str = "run_token";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Work UUID being operated on.
pub const WORK_ID: &str = "work_id";

/// Owning user UUID.
pub const USER_ID: &str = "user_id";

/// Source URL being extracted or analyzed.
pub const URL: &str = "url";

/// Pipeline phase after a transition.
pub const PHASE: &str = "phase";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of works returned by a filter or listing.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Whether the fixed fallback analysis replaced the model response.
pub const USED_FALLBACK: &str = "used_fallback";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
