/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the identity provider settings, which production must supply.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Connection pool size (default: `10`).
    pub database_max_connections: u32,
    /// Log output format.
    pub log_format: LogFormat,
    /// Token verification settings.
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default   |
    /// |----------------------------|-----------|
    /// | `HOST`                     | `0.0.0.0` |
    /// | `PORT`                     | `5000`    |
    /// | `CORS_ORIGINS`             | `*`       |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`      |
    /// | `DATABASE_URL`             | --        |
    /// | `DATABASE_MAX_CONNECTIONS` | `10`      |
    /// | `LOG_FORMAT`               | `pretty`  |
    ///
    /// # Panics
    ///
    /// Panics on unparsable numeric values.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            database_max_connections,
            log_format,
            auth: AuthConfig::from_env(),
        }
    }

    /// Whether `CORS_ORIGINS` is the wildcard.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Identity provider and token verification settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Issuer URL with trailing slash, e.g. `https://tenant.auth0.com/`.
    pub issuer: Option<String>,
    /// Expected `aud` claim.
    pub audience: Option<String>,
    /// How long a fetched key set stays valid.
    pub jwks_ttl_secs: u64,
    /// Bound on the key set fetch.
    pub fetch_timeout_secs: u64,
    /// When set, tokens are HS256 and verified with this secret instead of
    /// the provider's key set.
    pub hs256_secret: Option<String>,
}

/// Default JWKS cache lifetime in seconds.
const DEFAULT_JWKS_TTL_SECS: u64 = 600;
/// Default JWKS fetch timeout in seconds.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `AUTH_ISSUER`             | --      |
    /// | `AUTH_AUDIENCE`           | --      |
    /// | `AUTH_JWKS_TTL_SECS`      | `600`   |
    /// | `AUTH_FETCH_TIMEOUT_SECS` | `5`     |
    /// | `AUTH_HS256_SECRET`       | --      |
    pub fn from_env() -> Self {
        let issuer = std::env::var("AUTH_ISSUER").ok().map(|issuer| {
            if issuer.ends_with('/') {
                issuer
            } else {
                format!("{issuer}/")
            }
        });

        let audience = std::env::var("AUTH_AUDIENCE").ok();

        let jwks_ttl_secs: u64 = std::env::var("AUTH_JWKS_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_JWKS_TTL_SECS.to_string())
            .parse()
            .expect("AUTH_JWKS_TTL_SECS must be a valid u64");

        let fetch_timeout_secs: u64 = std::env::var("AUTH_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_FETCH_TIMEOUT_SECS.to_string())
            .parse()
            .expect("AUTH_FETCH_TIMEOUT_SECS must be a valid u64");

        let hs256_secret = std::env::var("AUTH_HS256_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());

        Self {
            issuer,
            audience,
            jwks_ttl_secs,
            fetch_timeout_secs,
            hs256_secret,
        }
    }
}
