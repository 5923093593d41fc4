//! Signed-upload issuer: hands the browser a short-lived policy document
//! for direct-to-store uploads. The gateway never proxies photo bytes.

use crate::{
    errors::{GatewayError, GatewayResult},
    handlers::album_handlers::require_member,
    services::identity,
    state::AppState,
};
use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadRequest {
    pub album_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadResponse {
    pub host: String,
    pub dir: String,
    pub policy: String,
    pub signature: String,
    pub access_key_id: String,
    pub expire: i64,
}

/// `POST /api/uploads/sign` — owner/editor-only upload grant scoped to
/// `albums/{albumId}/{userId}/`.
pub async fn sign_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SignUploadRequest>,
) -> GatewayResult<Json<SignUploadResponse>> {
    let token = identity::bearer_token(&headers)?;
    let user = state.identity.verify_bearer(token).await?;

    let (_, role) = require_member(&state, req.album_id, user.id).await?;
    if !role.can_delete_photos() {
        return Err(GatewayError::Forbidden(
            "viewers cannot upload to this album".into(),
        ));
    }

    let oss = state
        .oss
        .as_ref()
        .ok_or_else(|| GatewayError::Config("object storage is not configured".into()))?;

    let dir = format!("albums/{}/{}/", req.album_id, user.id);
    let grant = oss.grant_upload(&dir)?;

    Ok(Json(SignUploadResponse {
        host: grant.host,
        dir: grant.dir,
        policy: grant.policy,
        signature: grant.signature,
        access_key_id: grant.access_key_id,
        expire: grant.expire,
    }))
}
