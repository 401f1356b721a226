//! LLM-backed topic and summary generation for article clusters.

use std::time::Duration;

use regex::Regex;
use serde_json::{json, Value};

use crate::error::AnalyzerError;

/// Headlines included in the prompt per cluster.
const MAX_PROMPT_TITLES: usize = 10;

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f64 = 0.3;

/// Topic line, keyword list, and summary extracted from one model reply.
///
/// `summary` is `None` when the reply carried no usable summary; the
/// orchestrator drops such clusters from the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDigest {
    pub topic: String,
    pub summary: Option<String>,
    pub keywords: Option<String>,
}

impl TopicDigest {
    /// Digest recorded when the summarizer call itself fails.
    fn failed() -> Self {
        Self {
            topic: "analysis failed".to_string(),
            summary: None,
            keywords: None,
        }
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct SummarizerClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl SummarizerClient {
    /// Creates a new client for the service at `base_url`.
    ///
    /// `api_key` is sent as a bearer token when present; local inference
    /// servers typically run without one.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, AnalyzerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.map(ToOwned::to_owned),
            model: model.to_owned(),
        })
    }

    /// Produces a topic digest for one cluster from its member headlines.
    ///
    /// Best-effort: a transport or API failure is logged and yields the
    /// failure digest (`topic = "analysis failed"`, no summary) instead of
    /// an error, so one bad call never aborts the surrounding run.
    pub async fn summarize(&self, titles: &[&str], local_id: usize) -> TopicDigest {
        match self.request_content(titles).await {
            Ok(content) => parse_digest(&content, local_id),
            Err(e) => {
                tracing::warn!(local_id, error = %e, "summarizer request failed");
                TopicDigest::failed()
            }
        }
    }

    async fn request_content(&self, titles: &[&str]) -> Result<String, AnalyzerError> {
        let headlines: String = titles
            .iter()
            .take(MAX_PROMPT_TITLES)
            .map(|title| format!("- {title}\n"))
            .collect();
        let prompt = format!(
            "The following news headlines cover the same event:\n\n{headlines}\n\
             Reply with exactly three labeled lines:\n\
             topic: a short topic name\n\
             keywords: three comma-separated keywords\n\
             summary: a two to three sentence neutral summary"
        );

        let req_body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE
        });

        let mut request = self.client.post(&self.url).json(&req_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalyzerError::Summarizer(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AnalyzerError::Summarizer(format!(
                "summarizer returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Summarizer(format!("response parse error: {e}")))?;

        body.get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| {
                AnalyzerError::Summarizer("response missing message content".to_string())
            })
    }
}

/// Extracts the labeled lines from a model reply.
///
/// Labels match case-insensitively. The summary capture runs to the end of
/// the reply, so multi-line summaries survive. When the topic label is
/// missing the first non-empty line stands in; a fully empty reply falls
/// back to `cluster {local_id}`.
fn parse_digest(content: &str, local_id: usize) -> TopicDigest {
    let summary_re = Regex::new(r"(?is)summary:\s*(.+)").expect("valid summary regex");
    let topic_re = Regex::new(r"(?i)topic:\s*([^\n]+)").expect("valid topic regex");
    let keywords_re = Regex::new(r"(?i)keywords:\s*([^\n]+)").expect("valid keywords regex");

    let summary = summary_re
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    let topic = topic_re
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| format!("cluster {local_id}"));

    let keywords = keywords_re
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|k| !k.is_empty());

    TopicDigest {
        topic,
        summary,
        keywords,
    }
}
