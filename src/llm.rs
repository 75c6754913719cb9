use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPLATE: &str = "templates/card_review_template.md";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub fn load_template(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("template not found: {path}"))
}

/// System/user prompt pair instructing the backend to fill the template
/// exactly, with the scraped page text as context.
pub fn build_prompt(template_md: &str, url: &str, page_text: &str) -> Prompt {
    let system = "You are an expert AI transparency reviewer. \
        Fill the provided Markdown template EXACTLY AS-IS: \
        do not add, remove, or rename any sections or headings; \
        only insert content where there are blanks. \
        Do not include any prose outside the template. \
        If a field is unknown from the provided content, leave it blank or write a short 'N/A' note. \
        Keep links as Markdown links when possible."
        .to_string();

    let user = format!(
        "TEMPLATE (fill exactly, keep headings/format identical):\n\
         ---\n{template_md}\n---\n\n\
         CONTEXT (URL + scraped text):\n\
         URL: {url}\n\n\
         PAGE TEXT (possibly truncated):\n{page_text}"
    );

    Prompt { system, user }
}

pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pub model: String,
}

impl LlmClient {
    /// Configuration from OPENAI_API_KEY / OPENAI_MODEL / OPENAI_BASE_URL.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| anyhow!("OPENAI_API_KEY is not set"))?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let http = reqwest::Client::builder()
            .user_agent("card-grader/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url, api_key, model })
    }

    /// Fill the template, retrying transient upstream failures with
    /// increasing backoff. Persistent failure is fatal for the request.
    pub async fn fill_template(&self, prompt: &Prompt) -> Result<String> {
        for attempt in 0..MAX_RETRIES {
            match self.chat_completion(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if should_retry(&e) => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * u64::from(attempt + 1));
                    warn!(
                        "completion attempt {}/{} failed ({}), backing off {:.1}s",
                        attempt + 1,
                        MAX_RETRIES + 1,
                        e,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }

        self.chat_completion(prompt).await
    }

    async fn chat_completion(&self, prompt: &Prompt) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message { role: "system".to_string(), content: prompt.system.clone() },
                Message { role: "user".to_string(), content: prompt.user.clone() },
            ],
            temperature: Some(0.2),
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("completion request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            bail!("upstream returned {}: {}", status.as_u16(), message);
        }

        let completion: ChatCompletionResponse = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("completion had no content"))
    }
}

fn should_retry(err: &anyhow::Error) -> bool {
    let msg = err.to_string();
    msg.contains("429")
        || msg.contains("500")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("timed out")
        || msg.contains("request failed")
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    message: Option<String>,
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_template_url_and_page_text() {
        let p = build_prompt("## 1 Basic Info", "https://huggingface.co/x", "PAGE BODY");
        assert!(p.system.contains("EXACTLY AS-IS"));
        assert!(p.user.contains("## 1 Basic Info"));
        assert!(p.user.contains("URL: https://huggingface.co/x"));
        assert!(p.user.ends_with("PAGE BODY"));
    }

    #[test]
    fn retry_classification() {
        assert!(should_retry(&anyhow!("upstream returned 429: rate limited")));
        assert!(should_retry(&anyhow!("upstream returned 503: overloaded")));
        assert!(should_retry(&anyhow!("completion request failed")));
        assert!(!should_retry(&anyhow!("upstream returned 401: bad key")));
        assert!(!should_retry(&anyhow!("completion had no content")));
    }

    #[test]
    fn request_serializes_without_empty_fields() {
        let req = ChatCompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![Message { role: "user".into(), content: "hi".into() }],
            temperature: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("temperature"));
    }
}
