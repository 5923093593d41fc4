//! Album CRUD and membership handlers — thin glue over the metadata store.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::album::{Album, AlbumWithRole, MemberRole},
    services::identity,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use uuid::Uuid;

const MAX_ALBUM_NAME_LEN: usize = 200;

/// Resolve the album and the caller's role in it, or fail with 404/403.
/// The creator counts as owner even if their membership row went missing.
pub(crate) async fn require_member(
    state: &AppState,
    album_id: Uuid,
    user_id: Uuid,
) -> GatewayResult<(Album, MemberRole)> {
    let album = state
        .store
        .album_by_id(album_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("album not found".into()))?;

    if let Some(role) = state.store.member_role(album_id, user_id).await? {
        return Ok((album, role));
    }
    if album.created_by == user_id {
        return Ok((album, MemberRole::Owner));
    }

    Err(GatewayError::Forbidden(
        "you are not a member of this album".into(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub name: String,
    pub description: Option<String>,
}

/// `POST /api/albums` — create an album; the caller becomes its owner.
pub async fn create_album(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAlbumRequest>,
) -> GatewayResult<Json<Album>> {
    let token = identity::bearer_token(&headers)?;
    let user = state.identity.verify_bearer(token).await?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(GatewayError::Validation("album name is required".into()));
    }
    if name.len() > MAX_ALBUM_NAME_LEN {
        return Err(GatewayError::Validation("album name is too long".into()));
    }

    let album = state
        .store
        .create_album(name, req.description, user.id)
        .await?;
    tracing::info!(album_id = %album.id, owner = %user.id, "album created");
    Ok(Json(album))
}

/// `GET /api/albums` — albums the caller belongs to, with their role.
pub async fn list_albums(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Json<Vec<AlbumWithRole>>> {
    let token = identity::bearer_token(&headers)?;
    let user = state.identity.verify_bearer(token).await?;

    let albums = state.store.albums_for_user(user.id).await?;
    Ok(Json(albums))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    pub user_id: Uuid,
    pub role: MemberRole,
}

/// `POST /api/albums/{id}/members` — owner-only member invite.
pub async fn invite_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(album_id): Path<Uuid>,
    Json(req): Json<InviteMemberRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    let token = identity::bearer_token(&headers)?;
    let user = state.identity.verify_bearer(token).await?;

    let (_, role) = require_member(&state, album_id, user.id).await?;
    if role != MemberRole::Owner {
        return Err(GatewayError::Forbidden(
            "only the album owner can invite members".into(),
        ));
    }
    if req.role == MemberRole::Owner {
        return Err(GatewayError::Validation(
            "cannot grant the owner role".into(),
        ));
    }

    state.store.add_member(album_id, req.user_id, req.role).await?;
    tracing::info!(album_id = %album_id, invited = %req.user_id, role = ?req.role, "member invited");
    Ok(Json(serde_json::json!({ "ok": true })))
}
