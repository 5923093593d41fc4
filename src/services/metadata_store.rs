//! MetadataStore — all SQL against the album/photo schema.
//!
//! This is the gateway's elevated data path: queries here see every row
//! regardless of who the caller is, which is exactly what the authorizer
//! needs (the caller's own credential might not be able to see the rows
//! that prove it unauthorized). Nothing in this module ever reaches the
//! client unfiltered; handlers decide what to expose.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::{
        album::{Album, AlbumWithRole, MemberRole},
        photo::Photo,
    },
};
use anyhow::Context;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Apply the embedded schema. Statement-by-statement split on `;` so the
/// same file drives both `--migrate` and the test harness.
pub async fn run_migrations(db: &SqlitePool) -> anyhow::Result<()> {
    let sql = include_str!("../../migrations/0001_init.sql");
    let statements: Vec<&str> = sql.split(';').map(str::trim).filter(|s| !s.is_empty()).collect();

    tracing::info!("running {} migration statements", statements.len());
    for stmt in statements {
        sqlx::query(stmt)
            .execute(db)
            .await
            .with_context(|| format!("executing migration statement `{stmt}`"))?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct MetadataStore {
    db: Arc<SqlitePool>,
}

impl MetadataStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Look up a photo by its exact object key. No normalization and no
    /// partial matching; the key either identifies one record or none.
    pub async fn find_photo_by_key(&self, key: &str) -> GatewayResult<Option<Photo>> {
        let photo = sqlx::query_as::<_, Photo>(
            "SELECT id, album_id, user_id, oss_path, file_name, description, created_at
             FROM photos WHERE oss_path = ?",
        )
        .bind(key)
        .fetch_optional(&*self.db)
        .await?;
        Ok(photo)
    }

    /// Role the user holds in the album, if any.
    pub async fn member_role(
        &self,
        album_id: Uuid,
        user_id: Uuid,
    ) -> GatewayResult<Option<MemberRole>> {
        let role = sqlx::query_scalar::<_, MemberRole>(
            "SELECT role FROM album_members WHERE album_id = ? AND user_id = ?",
        )
        .bind(album_id)
        .bind(user_id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(role)
    }

    /// Delete a photo row by primary id. Returns false when the row was
    /// already gone (a concurrent delete won the race).
    pub async fn delete_photo(&self, id: Uuid) -> GatewayResult<bool> {
        let result = sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a completed upload.
    pub async fn insert_photo(
        &self,
        album_id: Uuid,
        user_id: Uuid,
        oss_path: &str,
        file_name: Option<String>,
        description: Option<String>,
    ) -> GatewayResult<Photo> {
        let photo = Photo {
            id: Uuid::new_v4(),
            album_id: Some(album_id),
            user_id,
            oss_path: oss_path.to_string(),
            file_name,
            description,
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO photos (id, album_id, user_id, oss_path, file_name, description, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(photo.id)
        .bind(photo.album_id)
        .bind(photo.user_id)
        .bind(&photo.oss_path)
        .bind(&photo.file_name)
        .bind(&photo.description)
        .bind(photo.created_at)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(photo),
            Err(err) if is_unique_violation(&err) => Err(GatewayError::Validation(
                "a photo with this object key already exists".into(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn photos_in_album(&self, album_id: Uuid) -> GatewayResult<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, album_id, user_id, oss_path, file_name, description, created_at
             FROM photos WHERE album_id = ? ORDER BY created_at DESC, id",
        )
        .bind(album_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(photos)
    }

    pub async fn album_by_id(&self, id: Uuid) -> GatewayResult<Option<Album>> {
        let album = sqlx::query_as::<_, Album>(
            "SELECT id, name, description, cover_key, created_by, created_at
             FROM albums WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(album)
    }

    /// Create an album and its owner membership in one transaction.
    pub async fn create_album(
        &self,
        name: &str,
        description: Option<String>,
        created_by: Uuid,
    ) -> GatewayResult<Album> {
        let album = Album {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description,
            cover_key: None,
            created_by,
            created_at: Utc::now(),
        };

        let mut tx = self.db.begin().await?;
        sqlx::query(
            "INSERT INTO albums (id, name, description, cover_key, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(album.id)
        .bind(&album.name)
        .bind(&album.description)
        .bind(&album.cover_key)
        .bind(album.created_by)
        .bind(album.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO album_members (album_id, user_id, role) VALUES (?, ?, ?)")
            .bind(album.id)
            .bind(created_by)
            .bind(MemberRole::Owner)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(album)
    }

    /// Albums visible to a user, together with the role they hold.
    pub async fn albums_for_user(&self, user_id: Uuid) -> GatewayResult<Vec<AlbumWithRole>> {
        let albums = sqlx::query_as::<_, AlbumWithRole>(
            "SELECT a.id, a.name, a.description, a.cover_key, a.created_by, a.created_at, m.role
             FROM albums a
             JOIN album_members m ON m.album_id = a.id
             WHERE m.user_id = ?
             ORDER BY a.created_at DESC, a.id",
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(albums)
    }

    pub async fn add_member(
        &self,
        album_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> GatewayResult<()> {
        let result =
            sqlx::query("INSERT INTO album_members (album_id, user_id, role) VALUES (?, ?, ?)")
                .bind(album_id)
                .bind(user_id)
                .bind(role)
                .execute(&*self.db)
                .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(GatewayError::Validation(
                "user is already a member of this album".into(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Point the album cover at an object key. Best-effort from callers.
    pub async fn set_album_cover(&self, album_id: Uuid, key: &str) -> GatewayResult<()> {
        sqlx::query("UPDATE albums SET cover_key = ? WHERE id = ?")
            .bind(key)
            .bind(album_id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
