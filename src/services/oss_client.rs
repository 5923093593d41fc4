//! Remote object-store client: signed DELETE over HTTPS.
//!
//! Builds the canonicalized resource, signs it with the v1 scheme, and
//! issues the request with `Authorization`, `Date`, and `Host` headers.
//! The provider treats DELETE as idempotent (deleting an absent key still
//! succeeds), so a 200 or 204 both count as confirmed removal.

use crate::{
    config::OssConfig,
    errors::{GatewayError, GatewayResult},
    services::signer,
};
use anyhow::Context;
use base64::{Engine as _, engine::general_purpose};
use chrono::{Duration as ChronoDuration, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Longest provider-response slice echoed back in a 502 `detail` field.
const MAX_DETAIL_CHARS: usize = 200;

const REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Upload policies are short-lived; the browser uses them immediately.
const UPLOAD_POLICY_TTL_MINUTES: i64 = 5;

/// Upper bound the signed policy places on a single upload.
const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Characters left intact when embedding the object key in a URL path.
/// Everything else (including non-ASCII) is percent-encoded; `/` stays so
/// nested keys keep their path shape.
const OBJECT_KEY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b',')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$');

/// Reject keys that could traverse paths or smuggle header/signing-string
/// line breaks. Runs before any network or store call.
pub fn ensure_object_key_safe(key: &str) -> GatewayResult<()> {
    if key.is_empty() {
        return Err(GatewayError::Validation("objectName is required".into()));
    }
    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err(GatewayError::Validation("objectName is too long".into()));
    }
    if key.contains("..") || key.contains('\\') {
        return Err(GatewayError::Validation("invalid objectName format".into()));
    }
    if key.bytes().any(|b| b.is_ascii_control()) {
        return Err(GatewayError::Validation("invalid objectName format".into()));
    }
    Ok(())
}

/// Truncate provider output to a diagnostic slice safe to echo to clients.
pub fn truncate_detail(text: &str) -> String {
    text.chars().take(MAX_DETAIL_CHARS).collect()
}

/// Current time in the RFC 1123 form the provider expects in `Date`.
pub fn http_date_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[derive(Clone)]
pub struct OssClient {
    http: reqwest::Client,
    cfg: OssConfig,
}

impl OssClient {
    pub fn new(cfg: OssConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .context("building object-store HTTP client")?;
        Ok(Self { http, cfg })
    }

    /// Virtual-hosted bucket host, e.g. `my-photos.oss-cn-hangzhou.aliyuncs.com`.
    pub fn host(&self) -> String {
        format!("{}.{}.aliyuncs.com", self.cfg.bucket, self.cfg.region)
    }

    /// Base URL honoring the endpoint override used in tests.
    fn base_url(&self) -> String {
        match &self.cfg.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host()),
        }
    }

    /// Issue a signed DELETE for `key`. Treats 200/204 as success; any
    /// other status, transport error, or timeout is a remote failure with
    /// a bounded diagnostic slice. No retry happens here.
    pub async fn delete_object(&self, key: &str) -> GatewayResult<()> {
        ensure_object_key_safe(key)?;

        let date = http_date_now();
        let resource = format!("/{}/{}", self.cfg.bucket, key);
        let signature = signer::sign_request(
            self.cfg.access_key_secret.as_bytes(),
            "DELETE",
            "",
            "",
            &date,
            &resource,
        )
        .map_err(anyhow::Error::from)?;

        let url = format!(
            "{}/{}",
            self.base_url(),
            utf8_percent_encode(key, OBJECT_KEY_ENCODE)
        );
        let parsed = reqwest::Url::parse(&url)
            .map_err(|err| GatewayError::Config(format!("invalid object store endpoint: {err}")))?;
        let host_header = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => self.host(),
        };

        let response = self
            .http
            .delete(parsed)
            .header("Host", host_header)
            .header("Date", &date)
            .header(
                "Authorization",
                format!("OSS {}:{}", self.cfg.access_key_id, signature),
            )
            .send()
            .await
            .map_err(|err| GatewayError::RemoteStore {
                message: "object store delete failed".into(),
                detail: truncate_detail(&err.to_string()),
            })?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    status = status.as_u16(),
                    key,
                    "object store rejected delete"
                );
                Err(GatewayError::RemoteStore {
                    message: format!("object store delete failed with status {}", status.as_u16()),
                    detail: truncate_detail(&body),
                })
            }
        }
    }
}

/// Everything a browser needs for one direct-to-store PostObject upload.
#[derive(Debug, Clone)]
pub struct UploadGrant {
    pub host: String,
    pub dir: String,
    pub policy: String,
    pub signature: String,
    pub access_key_id: String,
    pub expire: i64,
}

impl OssClient {
    /// Issue a short-lived upload policy restricted to the `dir` key
    /// prefix. The signature covers the base64 policy text, same keyed
    /// hash as request signing.
    pub fn grant_upload(&self, dir: &str) -> GatewayResult<UploadGrant> {
        let expires_at = Utc::now() + ChronoDuration::minutes(UPLOAD_POLICY_TTL_MINUTES);
        let policy_doc = json!({
            "expiration": expires_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            "conditions": [
                { "bucket": self.cfg.bucket },
                ["starts-with", "$key", dir],
                ["content-length-range", 0, MAX_UPLOAD_BYTES],
            ],
        });

        let policy = general_purpose::STANDARD.encode(policy_doc.to_string());
        let signature = signer::sign_policy(self.cfg.access_key_secret.as_bytes(), &policy)
            .map_err(anyhow::Error::from)?;

        Ok(UploadGrant {
            host: self.base_url(),
            dir: dir.to_string(),
            policy,
            signature,
            access_key_id: self.cfg.access_key_id.clone(),
            expire: expires_at.timestamp(),
        })
    }
}
