//! Trait seams for the external collaborators.
//!
//! The core never drives a browser, uploads to object storage, posts to a
//! chat webhook, or prompts a model directly — it talks to these traits and
//! lets the leaf crates (or the embedding application) supply the impls.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome of a successful submission attempt.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Local artifact proving the outcome (e.g. a screenshot), if captured.
    pub evidence: Option<PathBuf>,
}

/// A failed submission attempt.
///
/// The agent may still hand back a failure-state artifact; capturing it is
/// best-effort and its absence never changes the reported error.
#[derive(Debug, Clone)]
pub struct AgentFailure {
    pub message: String,
    pub evidence: Option<PathBuf>,
}

impl std::fmt::Display for AgentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Performs the actual report entry against the third-party system.
///
/// Opaque to the core: the internal step sequence (navigate, fill, submit,
/// verify) is the agent's own business.
#[async_trait]
pub trait SubmissionAgent: Send + Sync {
    async fn submit(
        &self,
        date: NaiveDate,
        todo: &str,
        progress: &str,
    ) -> std::result::Result<Submission, AgentFailure>;
}

/// Stores a local artifact externally and returns a time-limited URL.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Returns a URL valid for about an hour, or `None` on failure.
    /// Impls log their own failures; callers never escalate a `None`.
    async fn upload(&self, local: &Path) -> Option<String>;
}

/// Fire-and-forget notification delivery.
///
/// Errors are returned so the caller can log them, but they must never be
/// propagated as a task failure.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, title: &str, body_markdown: &str, image_url: Option<&str>) -> Result<()>;
}

/// One generated day of work, ready for the plan store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDraft {
    pub date: NaiveDate,
    pub todo: String,
    pub progress: String,
}

/// Breaks a free-form requirement into per-workday drafts.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, requirement: &str, workdays: &[NaiveDate]) -> Result<Vec<PlanDraft>>;
}
