//! Albums and album membership — the relationships the authorizer reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A photo album. Owned by the user that created it; shared with other
/// users through `album_members` rows.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Album {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Display name chosen by the creator.
    pub name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// Object key of the photo currently used as the album cover.
    pub cover_key: Option<String>,

    /// User that created the album (implicit owner).
    pub created_by: Uuid,

    /// When the album was created.
    pub created_at: DateTime<Utc>,
}

/// Role a member holds within an album. A user holds at most one role per
/// album (enforced by a unique constraint).
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Editor,
    Viewer,
}

impl MemberRole {
    /// Whether this role may delete photos belonging to the album.
    pub fn can_delete_photos(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Editor)
    }
}

/// Membership row linking a user to an album with a role.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct AlbumMember {
    pub album_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
}

/// Album joined with the role the requesting user holds in it.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct AlbumWithRole {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cover_key: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub role: MemberRole,
}
