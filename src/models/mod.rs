//! Core data models for the album gateway.
//!
//! These entities represent albums, membership roles, and photo records.
//! They map cleanly to database tables via `sqlx::FromRow` and serialize
//! naturally as JSON via `serde`.

pub mod album;
pub mod photo;
