//! notedoc-api - HTTP API for notedoc
//!
//! Exposes the router and its building blocks so the binary and the
//! integration tests assemble the same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use notedoc_core::{defaults, NoteRepository};
use notedoc_db::{Database, MemoryNoteRepository};

pub use config::{AppConfig, CorsConfig, StorageKind};
pub use error::{ApiError, ErrorResponse};
pub use services::NoteService;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
    /// Owner of every note handled by this server.
    pub user_id: Uuid,
    /// Present with PostgreSQL storage; pinged by the health endpoint.
    pub db: Option<Database>,
}

impl AppState {
    /// State backed by PostgreSQL.
    pub fn with_database(db: Database, user_id: Uuid) -> Self {
        let repo: Arc<dyn NoteRepository> = Arc::new(db.notes.clone());
        Self {
            notes: NoteService::new(repo),
            user_id,
            db: Some(db),
        }
    }

    /// State backed by a process-local store.
    pub fn in_memory(repo: MemoryNoteRepository, user_id: Uuid) -> Self {
        Self {
            notes: NoteService::new(Arc::new(repo)),
            user_id,
            db: None,
        }
    }
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notedoc API",
        description = "Create, list, search, update and soft-delete notes"
    ),
    paths(
        handlers::notes::create_note,
        handlers::notes::list_notes,
        handlers::notes::search_notes,
        handlers::notes::get_note,
        handlers::notes::update_note,
        handlers::notes::delete_note,
        handlers::health::health_check,
    ),
    components(schemas(
        notedoc_core::CreateNoteRequest,
        notedoc_core::UpdateNoteRequest,
        notedoc_core::NoteResponse,
        notedoc_core::NotePage,
        ErrorResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "Notes", description = "Note CRUD and search"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

// =============================================================================
// ROUTER
// =============================================================================

/// Note routes, mounted under `/api/notes` and again under `/notes`.
fn note_routes() -> Router<AppState> {
    use handlers::notes::{
        create_note, delete_note, get_note, list_notes, search_notes, update_note,
    };

    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/search", get(search_notes))
        .route("/:id", get(get_note).put(update_note).delete(delete_note))
}

/// Build the complete application router.
pub fn router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/notes", note_routes())
        .nest("/notes", note_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(&config.cors))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .with_state(state)
}

/// CORS layer for the configured origins and methods.
///
/// A `*` origin mirrors the caller's origin so it stays usable together
/// with credentials.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origin = if cors.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(cors.allowed_origins.iter().filter_map(|o| {
            match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", o, e);
                    None
                }
            }
        }))
    };

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| match Method::from_bytes(m.to_ascii_uppercase().as_bytes()) {
            Ok(method) => Some(method),
            Err(e) => {
                warn!("Invalid CORS method '{}': {}", m, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(cors.allow_credentials)
        .max_age(cors.max_age)
}

/// Router over a fresh in-memory store with default settings.
pub fn in_memory_app() -> Router {
    let state = AppState::in_memory(MemoryNoteRepository::new(), defaults::DEFAULT_USER_ID);
    router(state, &AppConfig::default())
}
