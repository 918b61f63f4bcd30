// Axum API Server Module
//
// Purpose: HTML pages and a small JSON API over one report card repository

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use std::sync::Arc;

use crate::config::{ServerConfig, StoreKind};
use crate::registry::TypeRegistry;
use crate::repository::{InMemoryRepository, JsonFileRepository, ReportCardRepository};
use crate::web::handlers::pages::{self, IndexQuery};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ReportCardRepository>,
    pub registry: Arc<TypeRegistry>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ReportCardRepository>) -> Self {
        Self {
            repository,
            registry: Arc::new(TypeRegistry::new()),
        }
    }

    /// Build the configured backing store
    pub fn from_config(config: &ServerConfig) -> Self {
        let repository: Arc<dyn ReportCardRepository> = match config.store {
            StoreKind::JsonFile => {
                tracing::info!("Using JSON file store at {}", config.storage_file.display());
                Arc::new(JsonFileRepository::new(config.storage_file.clone()))
            }
            StoreKind::Memory => {
                tracing::info!("Using in-memory store with sample data");
                Arc::new(InMemoryRepository::with_sample_data())
            }
        };
        Self::new(repository)
    }

    /// Run a repository call on the blocking pool
    ///
    /// The file store reads and writes the whole JSON file on every call.
    pub async fn with_repository<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn ReportCardRepository) -> T + Send + 'static,
        T: Send + 'static,
    {
        let repository = self.repository.clone();
        tokio::task::spawn_blocking(move || f(repository.as_ref()))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // HTML pages
        .route("/", get(pages::index_page))
        .route("/report_card/:uuid", get(pages::show_page))
        .route("/create", get(pages::create_form).post(pages::create_submit))

        // JSON API
        .route("/api/report_cards", get(list_report_cards))
        .route("/api/report_cards/:uuid", get(get_report_card))
        .route("/api/types", get(list_types))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_report_cards(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filter = query.into_filter();
    let cards = state.with_repository(move |repo| repo.filter(&filter)).await?;
    tracing::debug!("API list returned {} cards", cards.len());

    Ok(Json(serde_json::json!({
        "rows": cards.len(),
        "data": cards,
    })))
}

/// Single card plus whether it passes type validation
async fn get_report_card(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = uuid.clone();
    let card = state
        .with_repository(move |repo| repo.get_by_uuid(&key))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report card {} not found", uuid)))?;

    let check = state.registry.check(&card.card_type, &card.parameters);

    Ok(Json(serde_json::json!({
        "card": card,
        "displayable": check.is_ok(),
        "error": check.err().map(|e| e.to_string()),
    })))
}

async fn list_types(State(state): State<AppState>) -> Json<serde_json::Value> {
    let types: Vec<serde_json::Value> = state
        .registry
        .kinds()
        .map(|k| {
            serde_json::json!({
                "tag": k.tag,
                "display_name": k.display_name,
                "required_parameters": k.required,
            })
        })
        .collect();
    Json(serde_json::json!({ "types": types }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Storage(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
