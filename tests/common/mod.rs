//! Shared harness: real router, wiremock collaborators, in-memory SQLite.
#![allow(dead_code)]

use album_gateway::{
    config::{AuthConfig, OssConfig},
    routes::routes::app,
    services::{
        identity::IdentityClient,
        metadata_store::{self, MetadataStore},
        oss_client::OssClient,
    },
    state::AppState,
};
use axum::http::HeaderValue;
use axum_test::TestServer;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header as header_match, method, path},
};

pub struct TestEnv {
    pub server: TestServer,
    pub store: MetadataStore,
    pub identity: MockServer,
    pub oss: MockServer,
}

pub async fn test_env_with_oss(with_oss: bool) -> TestEnv {
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    metadata_store::run_migrations(&pool).await.unwrap();
    let store = MetadataStore::new(Arc::new(pool));

    let identity_server = MockServer::start().await;
    let oss_server = MockServer::start().await;

    let identity = IdentityClient::new(AuthConfig {
        base_url: identity_server.uri(),
        anon_key: "anon-key".into(),
    })
    .unwrap();

    let oss = with_oss.then(|| {
        OssClient::new(OssConfig {
            access_key_id: "AKID".into(),
            access_key_secret: "test-secret-key".into(),
            bucket: "my-photos".into(),
            region: "oss-cn-hangzhou".into(),
            endpoint: Some(oss_server.uri()),
        })
        .unwrap()
    });

    let state = AppState::new(store.clone(), identity, oss);
    let server = TestServer::new(app(state, &[])).unwrap();

    TestEnv {
        server,
        store,
        identity: identity_server,
        oss: oss_server,
    }
}

pub async fn test_env() -> TestEnv {
    test_env_with_oss(true).await
}

/// Register `token` with the mock identity provider; returns the user id
/// it will resolve to.
pub async fn login(env: &TestEnv, token: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header_match(
            "authorization",
            format!("Bearer {token}").as_str(),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": user_id, "email": "user@example.com" })),
        )
        .mount(&env.identity)
        .await;
    user_id
}

/// Seed one album owned by `owner` containing one photo they uploaded.
pub async fn seed_photo(env: &TestEnv, owner: Uuid, key: &str) -> (Uuid, Uuid) {
    let album = env.store.create_album("trip", None, owner).await.unwrap();
    let photo = env
        .store
        .insert_photo(album.id, owner, key, Some("cat.jpg".into()), None)
        .await
        .unwrap();
    (album.id, photo.id)
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

pub async fn remote_delete_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .count()
}
