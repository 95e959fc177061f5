//! Notification bodies and the webhook sink.
//!
//! Delivery failures are logged by the caller and swallowed — they never
//! turn into a task failure.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use planbot_core::error::{PlanbotError, Result};
use planbot_core::traits::NotificationSink;

/// DingTalk-compatible markdown webhook.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, title: &str, body_markdown: &str, image_url: Option<&str>) -> Result<()> {
        let mut text = body_markdown.to_string();
        if let Some(url) = image_url {
            text.push_str(&format!(
                "\n\n![screenshot]({url})\n> screenshot link valid for 1 hour"
            ));
        }

        let resp = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({
                "msgtype": "markdown",
                "markdown": { "title": title, "text": text }
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| PlanbotError::Notify(format!("webhook send failed: {e}")))?;

        if resp.status().is_success() {
            tracing::info!("notification sent: {title}");
            Ok(())
        } else {
            Err(PlanbotError::Notify(format!(
                "webhook error {}",
                resp.status()
            )))
        }
    }
}

/// Used when no webhook is configured — notifications go to the log only.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn send(&self, title: &str, body_markdown: &str, _image_url: Option<&str>) -> Result<()> {
        tracing::info!("notification (no webhook configured): {title} — {body_markdown}");
        Ok(())
    }
}

pub fn success_body(todo: &str) -> String {
    format!(
        "## ✅ Daily report submitted\n\n**Time**: {}\n\n**Summary**:\n{todo}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn failure_body(error: &str) -> String {
    format!(
        "## ❌ Daily report failed\n\n**Time**: {}\n\n**Error**: {error}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn missing_plan_body(date: NaiveDate) -> String {
    format!(
        "## ⚠️ No plan recorded for {date}\n\nGenerate today's plan so the report can be submitted automatically."
    )
}
