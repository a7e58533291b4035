// Height Export - Web Server
// Serves the exported height table and builds macrovision scene URLs

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use height_export::{
    load_config, to_json_compact, Config, HeightExporter, MacrovisionEntity, ModelHeights, Scene,
    SchemaVersion,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared application state, built once from the catalog at startup
#[derive(Clone)]
struct AppState {
    /// GET /api/heights body, numbers formatted like the CLI export
    heights_body: Arc<String>,
    models: Arc<ModelHeights>,
    base_url: Arc<String>,
}

impl AppState {
    fn load(catalog: &str, schema: SchemaVersion, base_url: &str) -> Result<Self> {
        let table = HeightExporter::new(schema).collect_catalog(catalog)?;
        info!(entities = table.len(), schema = %schema, "Catalog loaded");

        let heights_body = to_json_compact(&ApiResponse::ok(&table))?;

        Ok(AppState {
            heights_body: Arc::new(heights_body),
            models: Arc::new(ModelHeights::new(table)),
            base_url: Arc::new(base_url.to_string()),
        })
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Scene response
#[derive(Serialize)]
struct SceneResponse {
    url: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/heights - Exported height table
async fn get_heights(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        state.heights_body.as_ref().clone(),
    )
}

/// POST /api/scene - Build a scene URL for the posted entities
async fn post_scene(
    State(state): State<AppState>,
    Json(entities): Json<Vec<MacrovisionEntity>>,
) -> impl IntoResponse {
    let result = Scene::build(&state.models, entities).and_then(|scene| scene.url(&state.base_url));

    match result {
        Ok(url) => (StatusCode::OK, Json(ApiResponse::ok(SceneResponse { url }))).into_response(),
        Err(e) => {
            warn!(error = %e, "Scene build failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<SceneResponse>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "height_export=info,height_server=info".into()),
        )
        .init();

    // Optional config path as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&PathBuf::from(path))?,
        None => Config::default(),
    };

    let catalog_path = config
        .export
        .catalog
        .clone()
        .context("No entity catalog configured ([export] catalog)")?;

    let catalog = std::fs::read_to_string(&catalog_path)
        .with_context(|| format!("Failed to read catalog {}", catalog_path.display()))?;

    let state = AppState::load(&catalog, config.export.schema, &config.macrovision.base_url)?;

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/heights", get(get_heights))
        .route("/scene", post(post_scene))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind))?;

    info!(bind = %config.server.bind, "Server running");
    info!("API: /api/heights, /api/scene");

    axum::serve(listener, app)
        .await
        .context("Server stopped")?;

    Ok(())
}
