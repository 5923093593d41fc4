//! End-to-end deletion-gateway scenarios against mocked collaborators.
//!
//! The identity provider and the object store are wiremock doubles; the
//! metadata store is an in-memory SQLite database sharing the app's
//! migrations. Each test drives the real router.

mod common;

use album_gateway::models::album::MemberRole;
use axum::http::{HeaderValue, Method, header};
use common::{TestEnv, bearer, login, remote_delete_count, seed_photo, test_env, test_env_with_oss};
use serde_json::{Value, json};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

async fn post_delete(env: &TestEnv, token: &str, key: &str) -> axum_test::TestResponse {
    env.server
        .post("/api/objects/delete")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "objectName": key }))
        .await
}

// Scenario A: the uploader deletes their own photo.
#[tokio::test]
async fn uploader_delete_removes_remote_object_and_record() {
    let env = test_env().await;
    let user = login(&env, "tok-a").await;
    let (_, photo_id) = seed_photo(&env, user, "albums/a/cat.jpg").await;

    Mock::given(method("DELETE"))
        .and(path("/albums/a/cat.jpg"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.oss)
        .await;

    let response = post_delete(&env, "tok-a", "albums/a/cat.jpg").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["objectKey"], "albums/a/cat.jpg");
    assert_eq!(body["recordId"], json!(photo_id));
    assert!(body.get("warning").is_none());

    assert!(
        env.store
            .find_photo_by_key("albums/a/cat.jpg")
            .await
            .unwrap()
            .is_none(),
        "metadata record should be gone after a full success"
    );
}

// Scenario B: an album member with a deleting role (not the uploader).
#[tokio::test]
async fn album_owner_may_delete_another_members_photo() {
    let env = test_env().await;
    let uploader = login(&env, "tok-uploader").await;
    let (album_id, _) = seed_photo(&env, uploader, "albums/b/dog.jpg").await;

    let editor = login(&env, "tok-editor").await;
    env.store
        .add_member(album_id, editor, MemberRole::Editor)
        .await
        .unwrap();

    Mock::given(method("DELETE"))
        .and(path("/albums/b/dog.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.oss)
        .await;

    let response = post_delete(&env, "tok-editor", "albums/b/dog.jpg").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["ok"], true);
}

// Scenario C: a viewer-level member is rejected and nothing is deleted.
#[tokio::test]
async fn viewer_is_forbidden_and_no_delete_happens() {
    let env = test_env().await;
    let uploader = login(&env, "tok-uploader").await;
    let (album_id, _) = seed_photo(&env, uploader, "albums/c/bird.jpg").await;

    let viewer = login(&env, "tok-viewer").await;
    env.store
        .add_member(album_id, viewer, MemberRole::Viewer)
        .await
        .unwrap();

    let response = post_delete(&env, "tok-viewer", "albums/c/bird.jpg").await;
    assert_eq!(response.status_code(), 403);

    assert_eq!(remote_delete_count(&env.oss).await, 0);
    assert!(
        env.store
            .find_photo_by_key("albums/c/bird.jpg")
            .await
            .unwrap()
            .is_some()
    );
}

// Scenario D: traversal keys are rejected before any collaborator call.
#[tokio::test]
async fn traversal_key_is_rejected_without_side_effects() {
    let env = test_env().await;

    for key in ["../../etc/passwd", "a\\b", "a\u{7}b"] {
        let response = post_delete(&env, "tok-any", key).await;
        assert_eq!(response.status_code(), 400, "key {:?}", key);
    }

    assert!(
        env.identity
            .received_requests()
            .await
            .unwrap_or_default()
            .is_empty(),
        "validation must reject before the identity provider is called"
    );
    assert!(
        env.oss
            .received_requests()
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

// Scenario E: provider-side rejection surfaces as 502 and the record stays.
#[tokio::test]
async fn remote_rejection_keeps_the_metadata_record() {
    let env = test_env().await;
    let user = login(&env, "tok-e").await;
    seed_photo(&env, user, "albums/e/fox.jpg").await;

    let provider_body =
        "AccessDenied: The OSS Access Key Id you provided does not exist. ".repeat(10);
    Mock::given(method("DELETE"))
        .and(path("/albums/e/fox.jpg"))
        .respond_with(ResponseTemplate::new(403).set_body_string(provider_body))
        .expect(1)
        .mount(&env.oss)
        .await;

    let response = post_delete(&env, "tok-e", "albums/e/fox.jpg").await;
    assert_eq!(response.status_code(), 502);

    let body: Value = response.json();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("AccessDenied"));
    assert!(detail.chars().count() <= 200, "detail must be truncated");

    // Ordering invariant: the local row was never touched.
    assert!(
        env.store
            .find_photo_by_key("albums/e/fox.jpg")
            .await
            .unwrap()
            .is_some()
    );
}

// Scenario F: remote success + local failure degrades to 200-with-warning.
#[tokio::test]
async fn local_failure_after_remote_success_is_degraded_not_failed() {
    let env = test_env().await;
    let user = login(&env, "tok-f").await;
    seed_photo(&env, user, "albums/f/owl.jpg").await;

    // Simulate a metadata-store outage for deletes only.
    sqlx::query(
        "CREATE TRIGGER photos_delete_blocked BEFORE DELETE ON photos
         BEGIN SELECT RAISE(ABORT, 'metadata store offline'); END",
    )
    .execute(env.store.pool())
    .await
    .unwrap();

    Mock::given(method("DELETE"))
        .and(path("/albums/f/owl.jpg"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.oss)
        .await;

    let response = post_delete(&env, "tok-f", "albums/f/owl.jpg").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["objectKey"], "albums/f/owl.jpg");
    assert!(body["warning"].as_str().is_some_and(|w| !w.is_empty()));
    assert!(body.get("recordId").is_none());

    // The stale row survives for out-of-band reconciliation.
    assert!(
        env.store
            .find_photo_by_key("albums/f/owl.jpg")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn missing_or_rejected_credential_is_401() {
    let env = test_env().await;
    let user = login(&env, "tok-good").await;
    seed_photo(&env, user, "albums/g/ant.jpg").await;

    let no_header = env
        .server
        .post("/api/objects/delete")
        .json(&json!({ "objectName": "albums/g/ant.jpg" }))
        .await;
    assert_eq!(no_header.status_code(), 401);

    // Unknown token: the provider double answers 404 for unmatched
    // requests, which the gateway treats as a rejected credential.
    let bad_token = post_delete(&env, "tok-unknown", "albums/g/ant.jpg").await;
    assert_eq!(bad_token.status_code(), 401);

    assert_eq!(remote_delete_count(&env.oss).await, 0);
}

#[tokio::test]
async fn unknown_key_is_404_and_missing_body_is_400() {
    let env = test_env().await;
    login(&env, "tok-h").await;

    let unknown = post_delete(&env, "tok-h", "albums/h/none.jpg").await;
    assert_eq!(unknown.status_code(), 404);

    let empty = env
        .server
        .post("/api/objects/delete")
        .add_header(header::AUTHORIZATION, bearer("tok-h"))
        .json(&json!({}))
        .await;
    assert_eq!(empty.status_code(), 400);
}

#[tokio::test]
async fn missing_object_store_config_is_500_after_authorization() {
    let env = test_env_with_oss(false).await;
    let user = login(&env, "tok-i").await;
    seed_photo(&env, user, "albums/i/elk.jpg").await;

    let response = post_delete(&env, "tok-i", "albums/i/elk.jpg").await;
    assert_eq!(response.status_code(), 500);
    assert_eq!(
        response.json::<Value>()["error"],
        "object storage is not configured"
    );

    // Nothing was deleted anywhere.
    assert!(
        env.store
            .find_photo_by_key("albums/i/elk.jpg")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let env = test_env().await;

    let response = env
        .server
        .method(Method::OPTIONS, "/api/objects/delete")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("https://app.example.com"),
        )
        .add_header(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        )
        .await;

    assert!(response.status_code().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*"),
        "empty allow-list configures the permissive mode"
    );
}
