//! HTTP server
//!
//! Routes:
//!   GET  /api/health   - liveness and configured model
//!   POST /api/sections - multipart `file` → preview and detected headings
//!   POST /api/ask      - multipart `file`, `question`, optional `api_key`/`model`

pub mod state;

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;
use crate::error::QaError;
use crate::llm::ModelClient;
use crate::session::{Assistant, Document, HEADING_DISPLAY_LIMIT};
pub use state::AppState;

/// Upload size limit
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

type ApiResult<T> = std::result::Result<T, (StatusCode, Json<Value>)>;

/// Fields of an upload form.
#[derive(Default)]
struct UploadForm {
    file_name: String,
    bytes: Vec<u8>,
    question: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

/// HTTP status for a pipeline error.
pub fn status_for(error: &QaError) -> StatusCode {
    match error {
        QaError::MissingCredential => StatusCode::UNAUTHORIZED,
        e if e.is_user_error() => StatusCode::BAD_REQUEST,
        QaError::ModelCall { .. } | QaError::ResponseShape { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn qa_error(error: QaError) -> (StatusCode, Json<Value>) {
    (status_for(&error), Json(json!({ "error": error.to_string() })))
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message.into() })))
}

async fn read_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().unwrap_or("upload.pdf").to_string();
                form.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file: {e}")))?
                    .to_vec();
            }
            "question" | "api_key" | "model" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read field '{name}': {e}")))?;
                let text = Some(text).filter(|t| !t.trim().is_empty());
                match name.as_str() {
                    "question" => form.question = text,
                    "api_key" => form.api_key = text,
                    _ => form.model = text,
                }
            }
            _ => {}
        }
    }

    if form.bytes.is_empty() {
        return Err(bad_request("No file provided"));
    }
    Ok(form)
}

/// Extract and section the upload off the async runtime.
async fn load_document(file_name: String, bytes: Vec<u8>) -> ApiResult<Document> {
    tokio::task::spawn_blocking(move || Document::from_upload(&file_name, &bytes))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Extraction task failed: {e}") })),
            )
        })?
        .map_err(qa_error)
}

fn document_summary(document: &Document) -> Value {
    json!({
        "preview": document.preview(),
        "headings": document.headings(HEADING_DISPLAY_LIMIT),
        "section_count": document.sections().len(),
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.config.model,
        "api_key_configured": state.config.has_api_key(),
    }))
}

async fn sections(multipart: Multipart) -> ApiResult<Json<Value>> {
    let form = read_form(multipart).await?;
    let document = load_document(form.file_name, form.bytes).await?;
    Ok(Json(document_summary(&document)))
}

async fn ask(State(state): State<Arc<AppState>>, multipart: Multipart) -> ApiResult<Json<Value>> {
    let form = read_form(multipart).await?;
    let question = form.question.ok_or_else(|| qa_error(QaError::EmptyQuestion))?;

    let config = state.session_config(form.api_key.as_deref(), form.model.as_deref());
    if !config.has_api_key() {
        return Err(qa_error(QaError::MissingCredential));
    }

    let document = load_document(form.file_name.clone(), form.bytes).await?;
    info!(file = %form.file_name, sections = document.sections().len(), "answering question");

    let client = ModelClient::with_transport(&config, Arc::clone(&state.transport));
    let assistant = Assistant::new(Arc::new(client), &config);
    let interaction = assistant.ask(&document, &question).await.map_err(qa_error)?;

    let (followups, followup_error) = match interaction.followups {
        Ok(questions) => (questions, None),
        Err(e) => (Vec::new(), Some(e)),
    };

    let mut response = document_summary(&document);
    response["question"] = json!(interaction.question);
    response["answer"] = json!(interaction.answer);
    response["followups"] = json!(followups);
    response["followup_error"] = json!(followup_error);
    Ok(Json(response))
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/sections", post(sections))
        .route("/ask", post(ask));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Run the HTTP server until interrupted.
pub async fn run_server(config: Config, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
