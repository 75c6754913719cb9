use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::parser::extract::CardReport;
use crate::{db, fetcher, llm, parser};

/// Shared handler state; the store sits behind a mutex because rusqlite
/// connections are single-threaded.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<llm::LlmClient>,
    pub http: reqwest::Client,
    pub template: Arc<String>,
    pub db: Arc<Mutex<Connection>>,
}

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub score: Option<f64>,
    pub label: Option<String>,
    pub details: String,
    pub report: CardReport,
}

pub async fn run(port: u16, state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health))
        .route("/grade", post(grade))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

async fn grade(State(state): State<AppState>, Json(req): Json<GradeRequest>) -> Response {
    if !req.url.contains("huggingface.co") {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Only Hugging Face URLs are supported".to_string(),
        );
    }

    let page_text = match fetcher::fetch_page_text(&state.http, &req.url).await {
        Ok(text) => text,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to evaluate model card: {e}"),
            );
        }
    };

    let prompt = llm::build_prompt(&state.template, &req.url, &page_text);
    let filled_md = match state.llm.fill_template(&prompt).await {
        Ok(md) => md,
        Err(e) => {
            error!("template fill failed for {}: {e}", req.url);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to evaluate model card: {e}"),
            );
        }
    };

    let report = parser::process_markdown(&filled_md);

    // The grade is already in hand; a store failure only loses history.
    if let Err(e) = persist(&state, &req.url, &filled_md, &report) {
        error!("failed to persist evaluation for {}: {e}", req.url);
    }

    Json(GradeResponse {
        score: report.score.value,
        label: report.score.label.map(|l| l.to_string()),
        details: report.details.clone(),
        report,
    })
    .into_response()
}

fn persist(state: &AppState, url: &str, markdown: &str, report: &CardReport) -> Result<()> {
    let conn = state
        .db
        .lock()
        .map_err(|_| anyhow::anyhow!("evaluation store lock poisoned"))?;
    let id = db::insert_evaluation(&conn, url, &state.llm.model, markdown)?;
    db::save_report(&conn, id, report)?;
    Ok(())
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::process_markdown;

    #[test]
    fn grade_response_shape() {
        let md = std::fs::read_to_string("tests/fixtures/llama3.md").unwrap();
        let report = process_markdown(&md);
        let resp = GradeResponse {
            score: report.score.value,
            label: report.score.label.map(|l| l.to_string()),
            details: report.details.clone(),
            report,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["label"], "Good");
        assert_eq!(json["details"], "Score parsed from evaluation template.");
        assert_eq!(json["report"]["standards"]["total_items"], 8);
        assert_eq!(json["report"]["basic_info"]["title"], "Meta-Llama-3-8B-Instruct");
    }

    #[test]
    fn unscored_response_keeps_nulls() {
        let report = process_markdown("# not a review at all");
        let resp = GradeResponse {
            score: report.score.value,
            label: report.score.label.map(|l| l.to_string()),
            details: report.details.clone(),
            report,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["score"].is_null());
        assert!(json["label"].is_null());
        assert_eq!(json["details"], "Could not parse score.");
    }
}
