//! Submission agent boundary.
//!
//! The UI-automation sequence itself lives in an external program; this
//! adapter launches it with `<date> <todo> <progress>` and reads a JSON
//! verdict from stdout. The core never models the click sequence.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use planbot_core::traits::{AgentFailure, Submission, SubmissionAgent};

/// What the external automation prints on stdout:
/// `{"success": true, "evidence_path": "...", "error": null}`.
#[derive(Debug, Deserialize)]
struct Verdict {
    success: bool,
    #[serde(default)]
    evidence_path: Option<PathBuf>,
    #[serde(default)]
    error: Option<String>,
}

/// Runs a configured external command per submission.
pub struct CommandAgent {
    command: String,
}

impl CommandAgent {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl SubmissionAgent for CommandAgent {
    async fn submit(
        &self,
        date: NaiveDate,
        todo: &str,
        progress: &str,
    ) -> Result<Submission, AgentFailure> {
        if self.command.trim().is_empty() {
            return Err(AgentFailure {
                message: "no submission agent configured (agent.command)".into(),
                evidence: None,
            });
        }

        let output = tokio::process::Command::new(&self.command)
            .arg(date.format("%Y-%m-%d").to_string())
            .arg(todo)
            .arg(progress)
            .output()
            .await
            .map_err(|e| AgentFailure {
                message: format!("failed to launch agent '{}': {e}", self.command),
                evidence: None,
            })?;

        if !output.status.success() {
            return Err(AgentFailure {
                message: format!(
                    "agent exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                evidence: None,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let verdict: Verdict =
            serde_json::from_str(stdout.trim()).map_err(|e| AgentFailure {
                message: format!("agent returned unparseable output: {e}"),
                evidence: None,
            })?;

        if verdict.success {
            Ok(Submission {
                evidence: verdict.evidence_path,
            })
        } else {
            Err(AgentFailure {
                message: verdict
                    .error
                    .unwrap_or_else(|| "agent reported failure".into()),
                evidence: verdict.evidence_path,
            })
        }
    }
}
