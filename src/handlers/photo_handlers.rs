//! Photo endpoints: the object-deletion gateway plus upload registration
//! and listing.
//!
//! The deletion handler is the one real security boundary in the service.
//! It walks a fixed sequence — validate, authenticate, authorize, remote
//! delete, local delete — and the metadata row is never touched before
//! the remote store has confirmed the object is gone.

use crate::{
    errors::{GatewayError, GatewayResult},
    handlers::album_handlers::require_member,
    models::photo::Photo,
    services::{identity, oss_client},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectResponse {
    pub ok: bool,
    pub object_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    /// Set when the remote object is gone but the metadata row survived;
    /// the caller sees success, the operator gets a reconciliation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// `POST /api/objects/delete` — delete a stored object and its record.
///
/// The body is read as loose JSON so that a missing or non-string
/// `objectName` stays a plain 400 rather than a deserializer rejection.
pub async fn delete_object(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> GatewayResult<Json<DeleteObjectResponse>> {
    // received -> validated: no collaborator is contacted for a bad key.
    let key = body
        .as_ref()
        .and_then(|Json(v)| v.get("objectName"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    if key.is_empty() {
        return Err(GatewayError::Validation("objectName is required".into()));
    }
    oss_client::ensure_object_key_safe(&key)?;

    // validated -> authenticated: caller's own token, anon-scoped client.
    let token = identity::bearer_token(&headers)?;
    let user = state.identity.verify_bearer(token).await?;

    // authenticated -> authorized: elevated lookup over stored
    // relationships; resolves the record for the delete-by-id later.
    let photo = state.authorizer.authorize_delete(user.id, &key).await?;

    let oss = state
        .oss
        .as_ref()
        .ok_or_else(|| GatewayError::Config("object storage is not configured".into()))?;

    // authorized -> remote-deleting. A failure here leaves both systems
    // untouched; the 502 carries a bounded provider diagnostic.
    oss.delete_object(&key).await?;

    // remote-deleted -> local-deleting. The remote delete is committed
    // and irreversible, so a local failure downgrades the outcome to a
    // warning instead of failing the request.
    match state.store.delete_photo(photo.id).await {
        Ok(_) => {
            tracing::info!(key = %key, record_id = %photo.id, caller = %user.id, "photo deleted");
            Ok(Json(DeleteObjectResponse {
                ok: true,
                object_key: key,
                record_id: Some(photo.id),
                warning: None,
            }))
        }
        Err(err) => {
            tracing::warn!(
                key = %key,
                record_id = %photo.id,
                caller = %user.id,
                error = %err,
                "remote object deleted but metadata record removal failed"
            );
            Ok(Json(DeleteObjectResponse {
                ok: true,
                object_key: key,
                record_id: None,
                warning: Some(
                    "remote object deleted, but the metadata record could not be removed".into(),
                ),
            }))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPhotoRequest {
    pub album_id: Uuid,
    pub object_key: String,
    pub file_name: Option<String>,
    pub description: Option<String>,
}

/// `POST /api/photos` — record a completed direct-to-store upload.
pub async fn register_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterPhotoRequest>,
) -> GatewayResult<Json<Photo>> {
    let key = req.object_key.trim().to_string();
    if key.is_empty() {
        return Err(GatewayError::Validation("objectKey is required".into()));
    }
    oss_client::ensure_object_key_safe(&key)?;

    let token = identity::bearer_token(&headers)?;
    let user = state.identity.verify_bearer(token).await?;

    let (_, role) = require_member(&state, req.album_id, user.id).await?;
    if !role.can_delete_photos() {
        return Err(GatewayError::Forbidden(
            "viewers cannot add photos to this album".into(),
        ));
    }

    let photo = state
        .store
        .insert_photo(req.album_id, user.id, &key, req.file_name, req.description)
        .await?;

    // Cover refresh mirrors the client behavior; losing it is harmless.
    if let Err(err) = state.store.set_album_cover(req.album_id, &key).await {
        tracing::debug!(album_id = %req.album_id, error = %err, "cover refresh failed");
    }

    Ok(Json(photo))
}

/// `GET /api/albums/{id}/photos` — photos in an album, newest first.
pub async fn list_photos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(album_id): Path<Uuid>,
) -> GatewayResult<Json<Vec<Photo>>> {
    let token = identity::bearer_token(&headers)?;
    let user = state.identity.verify_bearer(token).await?;

    require_member(&state, album_id, user.id).await?;

    let photos = state.store.photos_in_album(album_id).await?;
    Ok(Json(photos))
}
