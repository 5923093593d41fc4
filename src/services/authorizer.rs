//! Deletion authorization: decide from stored relationships only.
//!
//! The client's claim about the key is never trusted; the decision comes
//! entirely from the photo record and the album membership table. Order:
//! uploader first, then album role (`owner`/`editor`), then deny.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::photo::Photo,
    services::metadata_store::MetadataStore,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct Authorizer {
    store: MetadataStore,
}

impl Authorizer {
    pub fn new(store: MetadataStore) -> Self {
        Self { store }
    }

    /// Resolve the photo behind `key` and check that `caller` may delete
    /// it. Returns the resolved record so the downstream delete can run
    /// by primary id without a second lookup. Read-only.
    pub async fn authorize_delete(&self, caller: Uuid, key: &str) -> GatewayResult<Photo> {
        let photo = self
            .store
            .find_photo_by_key(key)
            .await?
            .ok_or_else(|| GatewayError::NotFound("no photo record matches this object key".into()))?;

        if photo.user_id == caller {
            return Ok(photo);
        }

        if let Some(album_id) = photo.album_id {
            if let Some(role) = self.store.member_role(album_id, caller).await? {
                if role.can_delete_photos() {
                    return Ok(photo);
                }
            }
        }

        tracing::debug!(%caller, key, "delete denied");
        Err(GatewayError::Forbidden(
            "you are not allowed to delete this photo".into(),
        ))
    }
}
