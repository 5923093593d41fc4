//! Centralized application configuration.
//!
//! Built once at process start from environment variables and CLI
//! arguments, then passed explicitly to the services that need it. No
//! ambient global state is read at request time.

use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Connection details for the remote object store (Aliyun-OSS style).
///
/// The secret key only ever flows into the signer; it is never logged or
/// echoed in responses.
#[derive(Clone)]
pub struct OssConfig {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub bucket: String,
    pub region: String,
    /// Base URL override (used by tests and self-hosted deployments).
    /// When unset the virtual-hosted endpoint
    /// `https://{bucket}.{region}.aliyuncs.com` is used.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for OssConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OssConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Identity provider settings. The gateway exchanges the caller's bearer
/// token at `{base_url}/auth/v1/user` using the anon-scoped api key, so
/// identity resolution runs with the caller's own privileges.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub base_url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Comma-separated CORS allow-list; empty means allow-all (non-prod).
    pub allowed_origins: Vec<String>,
    pub auth: AuthConfig,
    /// Absent object-store settings are tolerated at startup; the delete
    /// and upload-signing endpoints answer 500 until they are provided.
    pub oss: Option<OssConfig>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Photo-album object-deletion gateway")]
pub struct Args {
    /// Host to bind to (overrides ALBUM_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ALBUM_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides ALBUM_GATEWAY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();

        let env_host = env::var("ALBUM_GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("ALBUM_GATEWAY_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing ALBUM_GATEWAY_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading ALBUM_GATEWAY_PORT"),
        };
        let env_db = env::var("ALBUM_GATEWAY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/album_gateway.db".into());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let auth = AuthConfig {
            base_url: env::var("AUTH_BASE_URL")
                .context("AUTH_BASE_URL is required")?
                .trim_end_matches('/')
                .to_string(),
            anon_key: env::var("AUTH_ANON_KEY").context("AUTH_ANON_KEY is required")?,
        };

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            allowed_origins,
            auth,
            oss: Self::oss_from_env(),
        };

        Ok((cfg, args.migrate))
    }

    /// Collect the object-store settings, or None when any is missing.
    /// A partial set is almost certainly a deployment mistake, so warn.
    fn oss_from_env() -> Option<OssConfig> {
        let vars = [
            "OSS_ACCESS_KEY_ID",
            "OSS_ACCESS_KEY_SECRET",
            "OSS_BUCKET",
            "OSS_REGION",
        ];
        let values: Vec<Option<String>> = vars.iter().map(|v| env::var(v).ok()).collect();

        if values.iter().all(Option::is_some) {
            let mut it = values.into_iter().flatten();
            Some(OssConfig {
                access_key_id: it.next().unwrap_or_default(),
                access_key_secret: it.next().unwrap_or_default(),
                bucket: it.next().unwrap_or_default(),
                region: it.next().unwrap_or_default(),
                endpoint: env::var("OSS_ENDPOINT").ok(),
            })
        } else {
            if values.iter().any(Option::is_some) {
                let missing: Vec<&str> = vars
                    .iter()
                    .zip(&values)
                    .filter(|(_, v)| v.is_none())
                    .map(|(name, _)| *name)
                    .collect();
                tracing::warn!("incomplete object-store configuration, missing {:?}", missing);
            }
            None
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
