//! Shared harness for the API integration tests.
//!
//! Builds the production router over a fresh in-memory store and an HS256
//! verifier, so tests mint their own tokens and seed the store directly.

#![allow(dead_code)]

use std::sync::Arc;

use agora_api::auth::SecretVerifier;
use agora_api::config::{AuthConfig, LogFormat, ServerConfig};
use agora_api::router::build_app_router;
use agora_api::state::AppState;
use agora_core::roles::Role;
use agora_db::models::forum::{CreateForum, Forum};
use agora_db::models::thread::{CreateThread, Thread};
use agora_db::models::user::{CreateUser, User};
use agora_db::{ForumStore, MemoryStore};
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-do-not-use-in-production";
pub const TEST_ISSUER: &str = "https://agora.test/";
pub const TEST_AUDIENCE: &str = "agora-test";

/// Every user permission, without `admin`.
pub const MEMBER_PERMISSIONS: &[&str] = &["post:thread", "post:post", "edit:post", "delete:post"];

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        database_max_connections: 1,
        log_format: LogFormat::Pretty,
        auth: AuthConfig {
            issuer: Some(TEST_ISSUER.to_string()),
            audience: Some(TEST_AUDIENCE.to_string()),
            jwks_ttl_secs: 600,
            fetch_timeout_secs: 1,
            hs256_secret: Some(TEST_SECRET.to_string()),
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<SecretVerifier>,
}

/// Build the full application router over an empty in-memory store.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let tokens = Arc::new(SecretVerifier::new(TEST_SECRET, TEST_ISSUER, TEST_AUDIENCE));

    let state = AppState {
        store: store.clone(),
        verifier: tokens.clone(),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        tokens,
    }
}

impl TestApp {
    /// Token for `user_id` (subject `auth0|<user_id>`) with `permissions`.
    pub fn token(&self, user_id: &str, permissions: &[&str]) -> String {
        self.tokens
            .issue(&format!("auth0|{user_id}"), Some(permissions))
            .expect("signing should succeed")
    }

    pub fn member_token(&self, user_id: &str) -> String {
        self.token(user_id, MEMBER_PERMISSIONS)
    }

    pub fn admin_token(&self) -> String {
        self.token("root", &["admin"])
    }

    pub async fn seed_user(&self, id: &str, name: &str) -> User {
        self.store
            .create_user(&CreateUser {
                user_id: id.to_string(),
                name: name.to_string(),
                role: Role::User,
            })
            .await
            .expect("user creation should succeed")
    }

    pub async fn seed_forum(&self, name: &str) -> Forum {
        self.store
            .create_forum(&CreateForum {
                name: name.to_string(),
                description: "Seeded for tests".to_string(),
            })
            .await
            .expect("forum creation should succeed")
    }

    pub async fn seed_thread(&self, forum_id: i64, author_id: &str, title: &str) -> Thread {
        self.store
            .create_thread(
                forum_id,
                author_id,
                &CreateThread {
                    title: title.to_string(),
                    content: "Opening post".to_string(),
                },
            )
            .await
            .expect("thread creation should succeed")
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post_json_auth(
        &self,
        uri: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn post_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(Method::POST, uri, Some(token), None).await
    }
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
