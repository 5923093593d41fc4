//! Router assembly for the album gateway.
//!
//! ## Structure
//! - **Health endpoints**
//!   - `GET  /healthz` — liveness
//!   - `GET  /readyz`  — readiness (DB check)
//!
//! - **Gateway core**
//!   - `POST /api/objects/delete` — authorized object deletion
//!
//! - **Album/photo glue**
//!   - `GET/POST /api/albums` — list / create albums
//!   - `POST /api/albums/{id}/members` — invite a member
//!   - `GET  /api/albums/{id}/photos` — list photos
//!   - `POST /api/photos` — record a completed upload
//!   - `POST /api/uploads/sign` — issue a direct-upload policy
//!
//! CORS preflight is answered by the `tower-http` layer; an empty
//! allow-list configures the permissive non-production mode.

use crate::{
    handlers::{
        album_handlers::{create_album, invite_member, list_albums},
        health_handlers::{healthz, readyz},
        photo_handlers::{delete_object, list_photos, register_photo},
        upload_handlers::sign_upload,
    },
    state::AppState,
};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the CORS layer from the configured allow-list.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ]);

    if allowed_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Compose all routes; the router carries shared state to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // gateway core
        .route("/api/objects/delete", post(delete_object))
        // album/photo glue
        .route("/api/uploads/sign", post(sign_upload))
        .route("/api/photos", post(register_photo))
        .route("/api/albums", get(list_albums).post(create_album))
        .route("/api/albums/{id}/photos", get(list_photos))
        .route("/api/albums/{id}/members", post(invite_member))
}

/// Fully assembled application: routes + CORS + request tracing + state.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    routes()
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
