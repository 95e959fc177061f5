//! Plan generation over an OpenAI-compatible chat API.
//!
//! Sends the requirement plus the workday list and expects a strict JSON
//! array back: one `{date, todo, progress}` object per workday. Markdown
//! code fences around the payload are tolerated, and `todo`/`progress` may
//! come back as a string or a list of lines.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use planbot_core::error::{PlanbotError, Result};
use planbot_core::traits::{PlanDraft, PlanGenerator};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a senior technical manager who breaks down \
    development work into daily reports. Reply with JSON data only.";

/// Generator backed by any OpenAI-compatible chat-completions endpoint.
pub struct ChatGenerator {
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
    client: reqwest::Client,
}

impl ChatGenerator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        system_prompt: &str,
    ) -> Self {
        let system_prompt = if system_prompt.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT.to_string()
        } else {
            system_prompt.to_string()
        };
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            system_prompt,
            client: reqwest::Client::new(),
        }
    }

    fn prompt(&self, requirement: &str, workdays: &[NaiveDate]) -> String {
        let list: Vec<String> = workdays.iter().map(|d| d.to_string()).collect();
        format!(
            "Overall requirement: {requirement}\n\
             Workday list: {} ({} days)\n\n\
             Split the requirement into one entry per workday. Front-load research, \
             design, and environment setup; keep core development and integration in \
             the middle; finish with testing, bug fixing, and deployment.\n\n\
             Output a strict JSON array, no markdown code fences. Each element has \
             three fields:\n\
             - \"date\": one of the workdays above, in order\n\
             - \"todo\": the day's work items, newline separated\n\
             - \"progress\": the iteration item and its progress (e.g. \"user module 30%\")",
            serde_json::to_string(&list).unwrap_or_default(),
            workdays.len()
        )
    }
}

#[async_trait]
impl PlanGenerator for ChatGenerator {
    async fn generate(&self, requirement: &str, workdays: &[NaiveDate]) -> Result<Vec<PlanDraft>> {
        if self.base_url.trim().is_empty() {
            return Err(PlanbotError::Generator(
                "no generator endpoint configured (generator.base_url)".into(),
            ));
        }

        tracing::info!("requesting a plan breakdown for {} workdays", workdays.len());
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.model,
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": self.system_prompt },
                    { "role": "user", "content": self.prompt(requirement, workdays) }
                ]
            }));
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PlanbotError::Generator(format!("connection failed ({url}): {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(PlanbotError::Generator(format!("API error {status}: {text}")));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PlanbotError::Generator(format!("invalid response body: {e}")))?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| PlanbotError::Generator("no choices in response".into()))?;

        parse_drafts(content)
    }
}

/// One element of the model's reply; `todo`/`progress` may be a string or a
/// list of lines.
#[derive(Deserialize)]
struct RawDraft {
    date: NaiveDate,
    #[serde(default)]
    todo: Text,
    #[serde(default)]
    progress: Text,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
    One(String),
    Many(Vec<String>),
}

impl Text {
    fn join(self) -> String {
        match self {
            Text::One(s) => s,
            Text::Many(lines) => lines.join("\n"),
        }
    }
}

impl Default for Text {
    fn default() -> Self {
        Text::One(String::new())
    }
}

/// Parse the model's reply into drafts, tolerating markdown fences.
fn parse_drafts(content: &str) -> Result<Vec<PlanDraft>> {
    let cleaned = content.replace("```json", "").replace("```", "");
    let raw: Vec<RawDraft> = serde_json::from_str(cleaned.trim())
        .map_err(|e| PlanbotError::Generator(format!("unparseable plan payload: {e}")))?;
    Ok(raw
        .into_iter()
        .map(|r| PlanDraft {
            date: r.date,
            todo: r.todo.join(),
            progress: r.progress.join(),
        })
        .collect())
}
