pub mod auth;
pub mod bulk;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod settings;
pub mod store;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::{get, post}};
use http::Method;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    create_group, delete_group, download_template, get_group, healthz_live, healthz_ready,
    import_groups, list_groups, root,
};
use crate::openapi::ApiDoc;
use crate::settings::Settings;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<DocumentStore>,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let store = DocumentStore::new(
        settings.store_base_url.clone(),
        &settings.store_project,
        settings.store_auth_token.clone(),
    );
    let state = AppState {
        settings: settings.clone(),
        store: Arc::new(store),
    };

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting Classroom Admin API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    // The dashboard client runs in a browser on another origin.
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/groups", get(list_groups).post(create_group))
        .route(
            "/groups/import",
            post(import_groups).layer(DefaultBodyLimit::max(bulk::MAX_UPLOAD_BYTES)),
        )
        .route("/groups/import/template", get(download_template))
        .route("/groups/{id}", get(get_group).delete(delete_group))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer).layer(cors_layer)
}
