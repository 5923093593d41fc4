//! Identity provider client: exchanges a bearer token for a caller id.
//!
//! The exchange runs against `{base_url}/auth/v1/user` with the caller's
//! own token plus the anon-scoped api key, so proving identity never uses
//! elevated credentials. The elevated database access used afterwards for
//! authorization lookups lives in `MetadataStore`, not here.

use crate::{
    config::AuthConfig,
    errors::{GatewayError, GatewayResult},
};
use anyhow::Context;
use axum::http::{HeaderMap, header};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Wire shape of the provider's user payload; parsed strictly so a
/// malformed response surfaces as an internal fault, not a missing field.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> GatewayResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GatewayError::Unauthorized("missing Authorization header".into()))?;

    let token = value
        .get(..7)
        .filter(|prefix| prefix.eq_ignore_ascii_case("bearer "))
        .and_then(|_| value.get(7..))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            GatewayError::Unauthorized("Authorization header must be a bearer token".into())
        })?;

    Ok(token)
}

#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    cfg: AuthConfig,
}

impl IdentityClient {
    pub fn new(cfg: AuthConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building identity HTTP client")?;
        Ok(Self { http, cfg })
    }

    /// Resolve the caller behind `token`, or fail with 401.
    ///
    /// Provider unavailability is an internal fault, not an authentication
    /// failure; only an explicit rejection maps to 401.
    pub async fn verify_bearer(&self, token: &str) -> GatewayResult<AuthenticatedUser> {
        let url = format!("{}/auth/v1/user", self.cfg.base_url);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.cfg.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| {
                GatewayError::Internal(
                    anyhow::Error::from(err).context("identity provider unreachable"),
                )
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = response.status().as_u16(), "token rejected");
            return Err(GatewayError::Unauthorized(
                "credential was rejected, please sign in".into(),
            ));
        }

        let user: ProviderUser = response.json().await.map_err(|err| {
            GatewayError::Internal(
                anyhow::Error::from(err).context("identity provider returned an unexpected payload"),
            )
        })?;

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
        })
    }
}
