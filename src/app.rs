use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::downloader::Backup;
use crate::error::{AppError, ErrorKind};
use crate::loader;
use crate::procedure::{OracleStore, ProcedureStore, validate_name};
use crate::transform::transform;

pub struct AppState {
    store: Arc<dyn ProcedureStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProcedureStore>) -> Self {
        AppState { store }
    }
}

#[derive(Deserialize)]
struct NameRequest {
    name: Option<String>,
}

#[derive(Deserialize)]
struct SaveRequest {
    name: Option<String>,
    new_text: Option<String>,
}

#[derive(Serialize)]
struct NamesResponse {
    names: Vec<String>,
}

#[derive(Serialize)]
struct FetchResponse {
    name: String,
    original: String,
    transformed: String,
}

#[derive(Serialize)]
struct SaveResponse {
    status: &'static str,
    message: String,
    old_source: String,
}

/// Build the router over any procedure store
///
/// # Arguments
/// * `state` - Shared state holding the store
/// * `config` - Startup configuration (static directory, body limit)
pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        .route("/", get(serve_landing))
        .route("/upload_excel", post(upload_excel))
        .route("/fetch_procedure", post(fetch_procedure))
        .route("/save_procedure", post(save_procedure))
        .route("/download_backup", post(download_backup))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = OracleStore::new(config.database.clone());
    let app_state = Arc::new(AppState::new(Arc::new(store)));
    let app = router(app_state, &config);

    let listener = TcpListener::bind(config.bind).await?;
    info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_landing() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn upload_excel(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<NamesResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::validation(e.body_text()))?;

    let mut file_data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Malformed upload: {}", e)))?;
            file_data = Some(bytes);
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::validation("No file sent as 'file'"))?;
    let names = loader::extract_names(&file_data).inspect_err(|e| warn!("upload_excel: {}", e))?;
    info!("upload_excel: {} names from {} bytes", names.len(), file_data.len());

    Ok(Json(NamesResponse { names }))
}

async fn fetch_procedure(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<FetchResponse>, AppError> {
    let request: NameRequest = parse_body(&body, "Send JSON with field 'name'")?;
    let name = required(request.name, "Send JSON with field 'name'")?;

    let original = fetch_source(&state, &name).await?;
    let transformed = transform(&original);
    info!(
        "fetch_procedure: {} ({} -> {} bytes)",
        name,
        original.len(),
        transformed.len()
    );

    Ok(Json(FetchResponse {
        name,
        original,
        transformed,
    }))
}

async fn save_procedure(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SaveResponse>, AppError> {
    let request: SaveRequest = parse_body(&body, "Send JSON with 'name' and 'new_text'")?;
    let name = required(request.name, "Send JSON with 'name' and 'new_text'")?;
    let new_text = request
        .new_text
        .ok_or_else(|| AppError::validation("Send JSON with 'name' and 'new_text'"))?;
    validate_name(&name)?;

    let store = Arc::clone(&state.store);
    let target = name.clone();
    let old_source = tokio::task::spawn_blocking(move || store.replace(&target, &new_text))
        .await
        .map_err(AppError::from)
        .and_then(|result| result)
        .map_err(|e| match e.kind() {
            ErrorKind::DataAccess => e.context("Failed to save"),
            _ => e,
        })
        .inspect_err(|e| error!("save_procedure {}: {}", name, e))?;
    info!("save_procedure: {} saved", name);

    Ok(Json(SaveResponse {
        status: "ok",
        message: format!("Procedure {} updated successfully.", name),
        old_source,
    }))
}

async fn download_backup(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: NameRequest = parse_body(&body, "Provide 'name'")?;
    let name = required(request.name, "Provide 'name'")?;

    let source = fetch_source(&state, &name)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::not_found(format!("No source found for {}", name)),
            _ => e,
        })?;
    let backup = Backup::new(&name, source);
    info!("download_backup: {} ({} bytes)", backup.file_name, backup.contents.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, backup.content_disposition()),
        ],
        backup.into_bytes(),
    )
        .into_response())
}

/// Fetch on the blocking pool; empty sources count as missing
async fn fetch_source(state: &AppState, name: &str) -> Result<String, AppError> {
    let store = Arc::clone(&state.store);
    let target = name.to_string();
    let source = tokio::task::spawn_blocking(move || store.fetch(&target))
        .await?
        .inspect_err(|e| error!("fetch {}: {}", name, e))?;

    match source {
        Some(text) if !text.is_empty() => Ok(text),
        _ => {
            warn!("procedure {} not found", name);
            Err(AppError::not_found(format!("Procedure {} not found.", name)))
        }
    }
}

// Bodies are read as JSON whatever the Content-Type says
fn parse_body<T: DeserializeOwned>(body: &Bytes, usage: &str) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::validation(usage))
}

fn required(field: Option<String>, usage: &str) -> Result<String, AppError> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(AppError::validation(usage)),
    }
}
