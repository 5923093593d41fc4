//! Shared router state. One immutable bundle of the service handles,
//! cloned per request; all mutable state lives in the external stores.

use crate::services::{
    authorizer::Authorizer, identity::IdentityClient, metadata_store::MetadataStore,
    oss_client::OssClient,
};

#[derive(Clone)]
pub struct AppState {
    pub store: MetadataStore,
    pub identity: IdentityClient,
    pub authorizer: Authorizer,
    /// None until the object-store settings are configured; the endpoints
    /// that need it answer 500 in that case.
    pub oss: Option<OssClient>,
}

impl AppState {
    pub fn new(store: MetadataStore, identity: IdentityClient, oss: Option<OssClient>) -> Self {
        let authorizer = Authorizer::new(store.clone());
        Self {
            store,
            identity,
            authorizer,
            oss,
        }
    }
}
