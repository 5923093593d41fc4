//! Photo-album storage gateway.
//!
//! An HTTP service that fronts a third-party object store for a photo
//! album application: it re-derives the caller's permission to delete an
//! uploaded object, signs the provider request with the legacy keyed-hash
//! scheme, performs the remote delete, and reconciles local metadata with
//! a defined degraded outcome when the two systems disagree.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
