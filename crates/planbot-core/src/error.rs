//! Error taxonomy shared across the workspace.

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanbotError>;

#[derive(Debug, Error)]
pub enum PlanbotError {
    /// Malformed configuration value. The previous configuration stays in
    /// effect; nothing crashes.
    #[error("config error: {0}")]
    Config(String),

    /// Persistence failure. Propagated to the caller untouched — the store
    /// runs every merge in one transaction, so no partial write survives.
    #[error("store error: {0}")]
    Store(String),

    /// No plan recorded for the requested date. Non-retryable same-day.
    #[error("no plan recorded for {0}")]
    MissingPlan(NaiveDate),

    /// The submission agent failed or timed out.
    #[error("submission failed: {0}")]
    Agent(String),

    /// Notification delivery failure. Callers log and swallow this — it
    /// never escalates and never masks an originating error.
    #[error("notification error: {0}")]
    Notify(String),

    /// Evidence capture/upload failure. Logged and swallowed like `Notify`.
    #[error("evidence error: {0}")]
    Evidence(String),

    /// Plan generation failed; surfaced to the caller as-is.
    #[error("plan generation failed: {0}")]
    Generator(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
