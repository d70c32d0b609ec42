use std::fmt;
use std::path::PathBuf;

use axum::http::HeaderValue;
use chrono::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Origins allowed to call the admin API from a browser, parsed from the
    /// comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Lifetime of cached public responses in seconds. `0` disables caching.
    pub cache_ttl_secs: u64,
    /// Directory uploaded images are written to.
    pub storage_dir: PathBuf,
    /// URL prefix under which `storage_dir` is served.
    pub storage_public_url: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Operator token signing and lifetimes.
    pub tokens: TokenConfig,
}

/// Operator token settings.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret for access tokens.
    pub secret: String,
    pub access_ttl: Duration,
    /// Lifetime of a refresh session.
    pub refresh_ttl: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `CACHE_TTL_SECS`          | `300`                   |
    /// | `STORAGE_DIR`             | `storage/images`        |
    /// | `STORAGE_PUBLIC_URL`      | `/static/images`        |
    /// | `MAX_UPLOAD_BYTES`        | `10485760`              |
    /// | `JWT_SECRET`              | required                |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | `15`                    |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | `7`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin
                    .parse()
                    .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
            })
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cache_ttl_secs: u64 = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("CACHE_TTL_SECS must be a valid u64");

        let storage_dir = PathBuf::from(
            std::env::var("STORAGE_DIR").unwrap_or_else(|_| "storage/images".into()),
        );

        let storage_public_url =
            std::env::var("STORAGE_PUBLIC_URL").unwrap_or_else(|_| "/static/images".into());
        assert!(
            storage_public_url.starts_with('/'),
            "STORAGE_PUBLIC_URL must start with '/'"
        );

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "10485760".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| "7".into())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        let tokens = TokenConfig {
            secret,
            access_ttl: Duration::minutes(access_mins),
            refresh_ttl: Duration::days(refresh_days),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cache_ttl_secs,
            storage_dir,
            storage_public_url,
            max_upload_bytes,
            tokens,
        }
    }
}
