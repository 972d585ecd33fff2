#![allow(dead_code)]

use std::sync::Arc;

use arogya_api::auth::jwt::{generate_access_token, JwtConfig};
use arogya_api::config::{AccessConfig, ServerConfig};
use arogya_api::router::build_app_router;
use arogya_api::state::{AppState, Stores};
use arogya_core::error::{CoreError, CoreResult};
use arogya_core::memory::{MemoryOwnerDirectory, MemoryUserDirectory, OutboxNotifier};
use arogya_core::owner::{ContactChannel, Owner};
use arogya_core::ports::{NotificationPort, Summarizer};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const MIGRANT_ID: &str = "MIG-0001";
pub const MIGRANT_PHONE: &str = "+919800012345";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(access: AccessConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        access,
    }
}

/// Summarizer stub: echoes the number of input blocks, or fails on demand.
pub struct StubSummarizer {
    pub fail: bool,
}

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, text: &str) -> CoreResult<String> {
        if self.fail {
            return Err(CoreError::Unavailable("stub offline".into()));
        }
        Ok(format!("{} record(s) reviewed", text.split("\n\n").count()))
    }
}

/// The full router over in-memory stores, plus handles for seeding and
/// reading delivered OTPs.
pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub outbox: Arc<OutboxNotifier>,
    pub owners: Arc<MemoryOwnerDirectory>,
    pub users: Arc<MemoryUserDirectory>,
}

pub async fn build_test_app() -> TestApp {
    build_test_app_with(AccessConfig::default(), StubSummarizer { fail: false }).await
}

pub async fn build_test_app_with(access: AccessConfig, summarizer: StubSummarizer) -> TestApp {
    build(test_config(access), summarizer, None).await
}

/// Notifier that takes `delay` to deliver anything.
pub struct StalledNotifier {
    pub delay: std::time::Duration,
}

#[async_trait]
impl NotificationPort for StalledNotifier {
    async fn deliver(&self, _channel: &ContactChannel, _message: &str) -> CoreResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// The full router with OTP delivery routed through `notifier` and a custom
/// request timeout.
pub async fn build_test_app_with_notifier(
    access: AccessConfig,
    request_timeout_secs: u64,
    notifier: Arc<dyn NotificationPort>,
) -> TestApp {
    let mut config = test_config(access);
    config.request_timeout_secs = request_timeout_secs;
    build(config, StubSummarizer { fail: false }, Some(notifier)).await
}

async fn build(
    config: ServerConfig,
    summarizer: StubSummarizer,
    notifier: Option<Arc<dyn NotificationPort>>,
) -> TestApp {
    let (stores, owners, users) = Stores::memory();
    owners
        .upsert(Owner {
            unique_id: MIGRANT_ID.into(),
            name: "Ravi Kumar".into(),
            phone: MIGRANT_PHONE.into(),
            dob: NaiveDate::from_ymd_opt(1990, 4, 12),
            gender: Some("male".into()),
            language: "ml".into(),
            is_verified: true,
            password_hash: Some("$argon2id$secret-owner-hash".into()),
            created_at: Utc::now(),
        })
        .await;

    let outbox = Arc::new(OutboxNotifier::new());
    let notifier = match notifier {
        Some(notifier) => notifier,
        None => outbox.clone() as Arc<dyn NotificationPort>,
    };
    let state = AppState::new(stores, notifier, Arc::new(summarizer), config.clone());
    let router = build_app_router(state, &config);

    TestApp {
        router,
        config,
        outbox,
        owners,
        users,
    }
}

impl TestApp {
    /// Bearer token for an arbitrary staff identity.
    pub fn token(&self, user_id: &str, role: &str) -> String {
        generate_access_token(user_id, role, &self.config.jwt).expect("token generation")
    }

    /// The code most recently texted to the test migrant.
    pub async fn last_otp(&self) -> String {
        let body = self
            .outbox
            .last_to(&ContactChannel::Sms(MIGRANT_PHONE.into()))
            .await
            .expect("an OTP should have been delivered");
        body.rsplit(' ').next().unwrap().to_string()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Open a request as `token` and verify it with the delivered code.
    pub async fn grant(&self, token: &str) -> serde_json::Value {
        let response = self
            .post_json(
                "/api/v1/access/request",
                Some(token),
                serde_json::json!({ "migrant_id": MIGRANT_ID }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let request_id = body_json(response).await["data"]["request_id"].clone();

        let otp = self.last_otp().await;
        let response = self
            .post_json(
                "/api/v1/access/verify",
                Some(token),
                serde_json::json!({ "request_id": request_id, "otp": otp }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
