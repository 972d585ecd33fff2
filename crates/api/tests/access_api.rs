//! HTTP-level integration tests for the consent handshake and the
//! grant-gated record endpoints.

mod common;

use arogya_api::config::AccessConfig;
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use common::{
    body_json, build_test_app, build_test_app_with, build_test_app_with_notifier,
    StalledNotifier, StubSummarizer, MIGRANT_ID,
};
use serde_json::json;

const DOCTOR: &str = "doc-1";
const OTHER_DOCTOR: &str = "doc-2";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_access_returns_pending_request_without_code() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");

    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["request_id"].is_string());
    assert_eq!(data["status"], "pending");
    assert!(data["otp_expires_at"].is_string());
    assert_eq!(data["message"], "OTP sent to migrant phone");

    let otp = app.last_otp().await;
    assert_eq!(otp.len(), 6);
    assert!(!json.to_string().contains(&otp), "code must not be echoed");

    let messages = app.outbox.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].body.starts_with("Your Arogya Saathi OTP is "));
}

#[tokio::test]
async fn request_access_requires_a_token() {
    let app = build_test_app().await;
    let response = app
        .post_json(
            "/api/v1/access/request",
            None,
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn request_access_rejects_non_clinicians() {
    let app = build_test_app().await;
    let token = app.token("worker-1", "worker");
    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "PERMISSION_DENIED");
    assert!(app.outbox.messages().await.is_empty());
}

#[tokio::test]
async fn request_access_for_unknown_migrant_is_404() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");
    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": "MIG-missing" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_access_with_blank_migrant_is_400() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");
    let response = app
        .post_json("/api/v1/access/request", Some(&token), json!({ "migrant_id": "  " }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn sms_failure_still_opens_the_request() {
    let app = build_test_app().await;
    app.outbox.set_failing(true);
    let token = app.token(DOCTOR, "doctor");

    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["status"], "pending");
}

// ---------------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_grant_then_read_write_profile_and_summary() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");

    let verified = app.grant(&token).await;
    assert_eq!(verified["data"]["status"], "granted");
    assert!(verified["data"]["verified_at"].is_string());
    assert!(verified["data"].get("otp_code").is_none());

    // Initially empty.
    let response = app
        .get(&format!("/api/v1/access/records/{MIGRANT_ID}"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));

    // Write.
    let response = app
        .post_json(
            &format!("/api/v1/access/health-records/{MIGRANT_ID}"),
            Some(&token),
            json!({ "title": "Checkup", "content": "BP normal" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["author_id"], DOCTOR);
    assert_eq!(created["data"]["owner_id"], MIGRANT_ID);

    // Read back.
    let response = app
        .get(&format!("/api/v1/access/records/{MIGRANT_ID}"), Some(&token))
        .await;
    let records = body_json(response).await;
    assert_eq!(records["data"].as_array().unwrap().len(), 1);
    assert_eq!(records["data"][0]["title"], "Checkup");

    // Profile is redacted.
    let response = app
        .get(&format!("/api/v1/access/profile/{MIGRANT_ID}"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["data"]["name"], "Ravi Kumar");
    assert_eq!(profile["data"]["language"], "ml");
    assert!(!profile.to_string().contains("secret-owner-hash"));

    // Summary.
    let response = app
        .get(&format!("/api/v1/access/aisummary/{MIGRANT_ID}"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["summary"],
        "1 record(s) reviewed"
    );
}

#[tokio::test]
async fn wrong_code_is_mismatch_and_request_stays_pending() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");

    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    let request_id = body_json(response).await["data"]["request_id"].clone();
    let otp = app.last_otp().await;
    let wrong = if otp == "111111" { "222222" } else { "111111" };

    let response = app
        .post_json(
            "/api/v1/access/verify",
            Some(&token),
            json!({ "request_id": request_id, "otp": wrong }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "OTP_MISMATCH");

    let response = app
        .get(
            &format!("/api/v1/access/requests/{}", request_id.as_str().unwrap()),
            Some(&token),
        )
        .await;
    assert_eq!(body_json(response).await["data"]["status"], "pending");

    // The correct code still works afterwards.
    let response = app
        .post_json(
            "/api/v1/access/verify",
            Some(&token),
            json!({ "request_id": request_id, "otp": otp }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn second_verify_is_invalid_state() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");
    let verified = app.grant(&token).await;
    let request_id = verified["data"]["id"].clone();

    let response = app
        .post_json(
            "/api/v1/access/verify",
            Some(&token),
            json!({ "request_id": request_id, "otp": "000000" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");
}

#[tokio::test]
async fn slow_sms_provider_does_not_time_out_the_request() {
    let app = build_test_app_with_notifier(
        AccessConfig {
            otp_delivery_wait_ms: 100,
            ..AccessConfig::default()
        },
        1,
        Arc::new(StalledNotifier {
            delay: Duration::from_secs(3),
        }),
    )
    .await;
    let token = app.token(DOCTOR, "doctor");

    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let request_id = body["data"]["request_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "pending");

    let response = app
        .get(&format!("/api/v1/access/requests/{request_id}"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "pending");
}

#[tokio::test]
async fn expired_code_is_gone_and_request_expires() {
    let app = build_test_app_with(
        AccessConfig {
            otp_ttl_secs: 0,
            ..AccessConfig::default()
        },
        StubSummarizer { fail: false },
    )
    .await;
    let token = app.token(DOCTOR, "doctor");

    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    let request_id = body_json(response).await["data"]["request_id"].clone();
    let otp = app.last_otp().await;

    let response = app
        .post_json(
            "/api/v1/access/verify",
            Some(&token),
            json!({ "request_id": request_id, "otp": otp }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(body_json(response).await["code"], "OTP_EXPIRED");

    let response = app
        .get(
            &format!("/api/v1/access/requests/{}", request_id.as_str().unwrap()),
            Some(&token),
        )
        .await;
    assert_eq!(body_json(response).await["data"]["status"], "expired");

    let response = app
        .get(&format!("/api/v1/access/records/{MIGRANT_ID}"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn verify_unknown_request_is_404() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");
    let response = app
        .post_json(
            "/api/v1/access/verify",
            Some(&token),
            json!({ "request_id": uuid::Uuid::now_v7(), "otp": "123456" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_requester_may_verify() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");
    let response = app
        .post_json(
            "/api/v1/access/request",
            Some(&token),
            json!({ "migrant_id": MIGRANT_ID }),
        )
        .await;
    let request_id = body_json(response).await["data"]["request_id"].clone();
    let otp = app.last_otp().await;

    let intruder = app.token(OTHER_DOCTOR, "doctor");
    let response = app
        .post_json(
            "/api/v1/access/verify",
            Some(&intruder),
            json!({ "request_id": request_id, "otp": otp }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gated_endpoints_deny_without_grant() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");

    for path in ["records", "profile", "aisummary"] {
        let response = app
            .get(&format!("/api/v1/access/{path}/{MIGRANT_ID}"), Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
        assert_eq!(body_json(response).await["code"], "PERMISSION_DENIED");
    }

    let response = app
        .post_json(
            &format!("/api/v1/access/health-records/{MIGRANT_ID}"),
            Some(&token),
            json!({ "title": "Checkup", "content": "BP normal" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn grant_does_not_extend_to_other_doctors() {
    let app = build_test_app().await;
    app.grant(&app.token(DOCTOR, "doctor")).await;

    let other = app.token(OTHER_DOCTOR, "doctor");
    let response = app
        .get(&format!("/api/v1/access/records/{MIGRANT_ID}"), Some(&other))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn blank_record_title_is_invalid_argument() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");
    app.grant(&token).await;

    let response = app
        .post_json(
            &format!("/api/v1/access/health-records/{MIGRANT_ID}"),
            Some(&token),
            json!({ "title": "   ", "content": "BP normal" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn summary_failure_returns_fallback_text() {
    let app = build_test_app_with(AccessConfig::default(), StubSummarizer { fail: true }).await;
    let token = app.token(DOCTOR, "doctor");
    app.grant(&token).await;

    let response = app
        .get(&format!("/api/v1/access/aisummary/{MIGRANT_ID}"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["summary"],
        "Failed to generate summary."
    );
}

// ---------------------------------------------------------------------------
// Status lookup and history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_status_is_hidden_from_strangers_but_visible_to_admins() {
    let app = build_test_app().await;
    let verified = app.grant(&app.token(DOCTOR, "doctor")).await;
    let id = verified["data"]["id"].as_str().unwrap().to_string();

    let stranger = app.token(OTHER_DOCTOR, "doctor");
    let response = app
        .get(&format!("/api/v1/access/requests/{id}"), Some(&stranger))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = app.token("admin-1", "admin");
    let response = app
        .get(&format!("/api/v1/access/requests/{id}"), Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "granted");
}

#[tokio::test]
async fn history_filters_by_status() {
    let app = build_test_app().await;
    let token = app.token(DOCTOR, "doctor");
    app.grant(&token).await;
    app.post_json(
        "/api/v1/access/request",
        Some(&token),
        json!({ "migrant_id": MIGRANT_ID }),
    )
    .await;

    let response = app
        .get(&format!("/api/v1/access/history/{MIGRANT_ID}"), Some(&token))
        .await;
    let all = body_json(response).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
    assert_eq!(all["data"][0]["status"], "pending");

    let response = app
        .get(
            &format!("/api/v1/access/history/{MIGRANT_ID}?status=granted"),
            Some(&token),
        )
        .await;
    let granted = body_json(response).await;
    assert_eq!(granted["data"].as_array().unwrap().len(), 1);

    let response = app
        .get(
            &format!("/api/v1/access/history/{MIGRANT_ID}?status=bogus"),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
