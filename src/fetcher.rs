use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Node};
use tracing::debug;

/// Upstream cap on page text; evaluations never see more than this.
pub const MAX_INPUT_CHARS: usize = 150_000;

const USER_AGENT: &str = "card-grader-bot/1.0";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch a card page and return lightly cleaned text. HTML responses are
/// stripped down to their visible text; anything else is passed through.
pub async fn fetch_page_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .with_context(|| format!("request failed for {url}"))?
        .error_for_status()
        .with_context(|| format!("bad status for {url}"))?;

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let body = resp.text().await?;
    let text = if content_type.contains("html") {
        html_to_text(&body)
    } else {
        body
    };

    debug!("fetched {} chars from {}", text.len(), url);
    Ok(truncate_chars(text))
}

/// Visible text only: script/style/noscript subtrees are dropped, lines are
/// trimmed, and blank lines removed.
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|a| match a.value() {
                Node::Element(el) => matches!(el.name(), "script" | "style" | "noscript"),
                _ => false,
            });
            if !hidden {
                raw.push_str(text);
                raw.push('\n');
            }
        }
    }

    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: String) -> String {
    if text.chars().count() <= MAX_INPUT_CHARS {
        return text;
    }
    let mut out: String = text.chars().take(MAX_INPUT_CHARS).collect();
    out.push_str("\n...[truncated]...");
    out
}

// ── Tests ──
