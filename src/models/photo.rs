//! Represents a photo record — metadata for one object in the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata for a single uploaded photo.
///
/// The actual bytes live in the remote object store; `oss_path` is the
/// object key addressing them. A key identifies at most one photo record
/// (unique constraint on `oss_path`).
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Photo {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Album the photo belongs to, if any.
    pub album_id: Option<Uuid>,

    /// User that uploaded the photo.
    pub user_id: Uuid,

    /// Object key within the remote store's bucket.
    pub oss_path: String,

    /// Original filename of the uploaded file.
    pub file_name: Option<String>,

    /// Optional free-text annotation.
    pub description: Option<String>,

    /// Timestamp when the upload was recorded.
    pub created_at: DateTime<Utc>,
}
