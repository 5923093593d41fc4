//! Core services: signing, remote store access, identity, authorization,
//! and metadata persistence.

pub mod authorizer;
pub mod identity;
pub mod metadata_store;
pub mod oss_client;
pub mod signer;
