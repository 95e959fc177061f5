//! Scripted collaborators for executor, engine, and daemon tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use planbot_core::error::Result;
use planbot_core::traits::{
    AgentFailure, EvidenceStore, NotificationSink, PlanDraft, PlanGenerator, Submission,
    SubmissionAgent,
};

pub enum MockOutcome {
    Succeed(Option<PathBuf>),
    Fail(String, Option<PathBuf>),
}

/// Agent with a fixed, scripted outcome. Counts calls, records the last
/// arguments, and can hold the submission open to provoke overlaps.
pub struct MockAgent {
    pub calls: AtomicUsize,
    pub last_args: Mutex<Option<(NaiveDate, String, String)>>,
    outcome: MockOutcome,
    delay: Duration,
}

impl MockAgent {
    pub fn succeeding(evidence: Option<PathBuf>) -> Self {
        Self::scripted(MockOutcome::Succeed(evidence), Duration::ZERO)
    }

    pub fn failing(message: &str, evidence: Option<PathBuf>) -> Self {
        Self::scripted(MockOutcome::Fail(message.into(), evidence), Duration::ZERO)
    }

    pub fn slow(delay: Duration) -> Self {
        Self::scripted(MockOutcome::Succeed(None), delay)
    }

    fn scripted(outcome: MockOutcome, delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_args: Mutex::new(None),
            outcome,
            delay,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionAgent for MockAgent {
    async fn submit(
        &self,
        date: NaiveDate,
        todo: &str,
        progress: &str,
    ) -> std::result::Result<Submission, AgentFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock().unwrap() = Some((date, todo.to_string(), progress.to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            MockOutcome::Succeed(evidence) => Ok(Submission {
                evidence: evidence.clone(),
            }),
            MockOutcome::Fail(message, evidence) => Err(AgentFailure {
                message: message.clone(),
                evidence: evidence.clone(),
            }),
        }
    }
}

/// Sink that records every notification.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String, Option<String>)>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(String, String, Option<String>)> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, title: &str, body_markdown: &str, image_url: Option<&str>) -> Result<()> {
        self.sent.lock().unwrap().push((
            title.to_string(),
            body_markdown.to_string(),
            image_url.map(str::to_string),
        ));
        Ok(())
    }
}

/// Evidence store that always answers with the same URL (or `None`).
pub struct StaticEvidence {
    pub url: Option<String>,
    pub calls: AtomicUsize,
}

impl StaticEvidence {
    pub fn returning(url: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }
}

/// Generator producing one deterministic draft per workday.
#[derive(Default)]
pub struct MockGenerator {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PlanGenerator for MockGenerator {
    async fn generate(&self, requirement: &str, workdays: &[NaiveDate]) -> Result<Vec<PlanDraft>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(workdays
            .iter()
            .map(|date| PlanDraft {
                date: *date,
                todo: format!("work on {requirement}"),
                progress: "in progress".into(),
            })
            .collect())
    }
}

#[async_trait]
impl EvidenceStore for StaticEvidence {
    async fn upload(&self, _local: &Path) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.url.clone()
    }
}
