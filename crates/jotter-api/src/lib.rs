//! # jotter-api
//!
//! HTTP surface for jotter: axum routes over the account and note services
//! in `jotter-core`, with CORS, request tracing and `x-request-id`
//! propagation. The binary in `main.rs` wires configuration, logging and a
//! storage backend around [`router`].

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;
pub mod telemetry;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

pub use error::ApiError;
pub use state::AppState;

use handlers::{accounts, health, notes, tags};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/ping", get(health::ping))
        // Accounts
        .route("/api/signup", post(accounts::signup))
        .route("/api/login", post(accounts::login))
        .route("/api/auth/login", post(accounts::login))
        .route("/api/logout", post(accounts::logout))
        .route("/api/change-password", post(accounts::change_password))
        // Notes
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route("/api/notes/archived", get(notes::list_archived_notes))
        .route("/api/notes/trash", get(notes::list_trash))
        .route(
            "/api/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::soft_delete_note),
        )
        .route("/api/notes/:id/archive", put(notes::archive_note))
        .route("/api/notes/:id/unarchive", put(notes::unarchive_note))
        .route("/api/notes/:id/recover", put(notes::recover_note))
        .route(
            "/api/notes/:id/permanent",
            axum::routing::delete(notes::permanent_delete_note),
        )
        .route("/api/notes/:id/tags", post(notes::attach_tag))
        .route(
            "/api/notes/:id/tags/:tag_id",
            axum::routing::delete(notes::detach_tag),
        )
        // Tags
        .route("/api/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/api/tags/:id",
            get(tags::get_tag)
                .put(tags::update_tag)
                .delete(tags::delete_tag),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
