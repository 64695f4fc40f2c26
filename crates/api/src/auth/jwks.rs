//! RS256 verification against the identity provider's published key set.
//!
//! The key set is fetched from `<issuer>.well-known/jwks.json` and cached
//! for a fixed TTL. A token whose `kid` is not in the cached set triggers a
//! refetch so key rotation does not wait for the TTL to lapse, but at most
//! once per [`MIN_REFETCH_INTERVAL`]. Refetches run under the cache's write
//! lock, so concurrent misses share one request.

use std::time::{Duration, Instant};

use agora_core::auth::AuthError;
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;

use super::verifier::{AccessClaims, TokenVerifier};
use crate::config::AuthConfig;

/// Shortest gap between two fetches triggered by unknown key ids.
pub const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
enum JwksError {
    #[error("Key set request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Token header is unreadable: {0}")]
    Header(jsonwebtoken::errors::Error),

    #[error("No key with id {0:?}")]
    UnknownKey(Option<String>),

    #[error("Token rejected: {0}")]
    Token(jsonwebtoken::errors::Error),
}

impl JwksError {
    fn unknown(kid: Option<&str>) -> Self {
        JwksError::UnknownKey(kid.map(str::to_string))
    }
}

/// Where the key set comes from.
#[async_trait]
trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, JwksError>;
}

struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        let keys = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        tracing::info!(url = %self.url, keys = keys.keys.len(), "Fetched key set");
        Ok(keys)
    }
}

fn jwks_url(issuer: &str) -> String {
    format!("{issuer}.well-known/jwks.json")
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

pub struct JwksVerifier {
    source: Box<dyn KeySource>,
    issuer: String,
    audience: String,
    ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl JwksVerifier {
    /// Build a verifier for the configured issuer and audience.
    ///
    /// # Panics
    ///
    /// Panics if `AUTH_ISSUER` or `AUTH_AUDIENCE` is missing, or the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &AuthConfig) -> Self {
        let issuer = config
            .issuer
            .clone()
            .expect("AUTH_ISSUER must be set when AUTH_HS256_SECRET is not");
        let audience = config
            .audience
            .clone()
            .expect("AUTH_AUDIENCE must be set when AUTH_HS256_SECRET is not");

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .expect("Failed to build reqwest HTTP client");
        let source = HttpKeySource {
            client,
            url: jwks_url(&issuer),
        };

        Self::with_source(
            Box::new(source),
            issuer,
            audience,
            Duration::from_secs(config.jwks_ttl_secs),
        )
    }

    fn with_source(
        source: Box<dyn KeySource>,
        issuer: String,
        audience: String,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            issuer,
            audience,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Decoding key for `kid`, from cache when fresh.
    async fn key_for(&self, kid: Option<&str>) -> Result<DecodingKey, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < self.ttl {
                    if let Some(key) = find_key(&cached.keys, kid) {
                        return key;
                    }
                    if age < MIN_REFETCH_INTERVAL {
                        return Err(JwksError::unknown(kid));
                    }
                }
            }
        }

        let mut cache = self.cache.write().await;
        // A request that held the lock first may have just refreshed it.
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl.min(MIN_REFETCH_INTERVAL) {
                return find_key(&cached.keys, kid)
                    .unwrap_or_else(|| Err(JwksError::unknown(kid)));
            }
        }

        let keys = self.source.fetch().await?;
        let key = find_key(&keys, kid);
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        key.unwrap_or_else(|| Err(JwksError::unknown(kid)))
    }

    async fn try_verify(&self, token: &str) -> Result<AccessClaims, JwksError> {
        let header = decode_header(token).map_err(JwksError::Header)?;
        let key = self.key_for(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        decode::<AccessClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(JwksError::Token)
    }
}

/// Look up `kid` in a key set. With no `kid`, a single-key set is used.
fn find_key(keys: &JwkSet, kid: Option<&str>) -> Option<Result<DecodingKey, JwksError>> {
    let jwk = match kid {
        Some(kid) => keys.find(kid)?,
        None if keys.keys.len() == 1 => &keys.keys[0],
        None => return None,
    };
    Some(DecodingKey::from_jwk(jwk).map_err(JwksError::Token))
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.try_verify(token).await.map_err(|e| {
            match &e {
                JwksError::Fetch(_) => tracing::warn!(error = %e, "Key set unavailable"),
                _ => tracing::debug!(error = %e, "Rejected RS256 token"),
            }
            AuthError::InvalidToken
        })
    }
}
