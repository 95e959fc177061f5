//! One submission attempt: plan lookup, agent call, evidence, notification.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tokio::sync::Mutex;

use planbot_core::error::Result;
use planbot_core::traits::{AgentFailure, EvidenceStore, NotificationSink, SubmissionAgent};
use planbot_store::PlanStore;

use crate::notify;

/// What caused a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduled,
    Manual,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Scheduled => f.write_str("scheduled"),
            Trigger::Manual => f.write_str("manual"),
        }
    }
}

/// Structured outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub message: String,
    pub evidence_url: Option<String>,
}

impl RunReport {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            evidence_url: None,
        }
    }
}

/// Fallback progress text when a plan carries none.
const DEFAULT_PROGRESS: &str = "On track";

pub struct TaskExecutor {
    store: Arc<PlanStore>,
    agent: Arc<dyn SubmissionAgent>,
    evidence: Arc<dyn EvidenceStore>,
    notifier: Arc<dyn NotificationSink>,
    timeout: Duration,
    /// Single-flight guard. Concurrent callers are rejected, never queued.
    flight: Mutex<()>,
}

impl TaskExecutor {
    pub fn new(
        store: Arc<PlanStore>,
        agent: Arc<dyn SubmissionAgent>,
        evidence: Arc<dyn EvidenceStore>,
        notifier: Arc<dyn NotificationSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            agent,
            evidence,
            notifier,
            timeout,
            flight: Mutex::new(()),
        }
    }

    /// Execute today's submission.
    ///
    /// Store failures propagate untouched. Everything else the user should
    /// see goes through the notification sink and the returned report —
    /// never a panic, never a process exit.
    pub async fn run(&self, trigger: Trigger) -> Result<RunReport> {
        let Ok(_guard) = self.flight.try_lock() else {
            tracing::warn!("{trigger} trigger rejected: a submission is already running");
            return Ok(RunReport::failed("a submission is already running"));
        };

        let today = Local::now().date_naive();
        tracing::info!("starting {trigger} submission for {today}");

        let plans = self.store.plans_for(today)?;
        let Some(plan) = plans.into_iter().next() else {
            tracing::warn!("no plan recorded for {today}, sending reminder");
            self.notify(
                "⚠️ Daily report reminder",
                &notify::missing_plan_body(today),
                None,
            )
            .await;
            return Ok(RunReport::failed("no plan for today"));
        };

        let progress = if plan.progress.trim().is_empty() {
            DEFAULT_PROGRESS.to_string()
        } else {
            plan.progress.clone()
        };

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.agent.submit(today, &plan.todo, &progress),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AgentFailure {
                message: format!(
                    "submission agent did not respond within {}s",
                    self.timeout.as_secs()
                ),
                evidence: None,
            }),
        };

        match outcome {
            Ok(submission) => {
                let evidence_url = self.upload_evidence(submission.evidence.as_deref()).await;
                self.notify(
                    "✅ Daily report submitted",
                    &notify::success_body(&plan.todo),
                    evidence_url.as_deref(),
                )
                .await;
                tracing::info!("submission for {today} succeeded");
                Ok(RunReport {
                    success: true,
                    message: "submitted".into(),
                    evidence_url,
                })
            }
            Err(failure) => {
                tracing::error!("submission for {today} failed: {}", failure.message);
                // Evidence capture stays best-effort; its errors never
                // replace the agent's message in the report.
                let evidence_url = self.upload_evidence(failure.evidence.as_deref()).await;
                self.notify(
                    "❌ Daily report failed",
                    &notify::failure_body(&failure.message),
                    evidence_url.as_deref(),
                )
                .await;
                Ok(RunReport {
                    success: false,
                    message: failure.message,
                    evidence_url,
                })
            }
        }
    }

    async fn upload_evidence(&self, local: Option<&Path>) -> Option<String> {
        let local = local?;
        let url = self.evidence.upload(local).await;
        if url.is_none() {
            tracing::warn!("evidence upload yielded no URL for {}", local.display());
        }
        url
    }

    async fn notify(&self, title: &str, body: &str, image_url: Option<&str>) {
        if let Err(e) = self.notifier.send(title, body, image_url).await {
            tracing::warn!("notification delivery failed: {e}");
        }
    }
}
