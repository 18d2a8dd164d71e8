//! API routes: payment intents, widget lookup, CORS and rate limits

#[path = "../common/mod.rs"]
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::*;
use std::sync::Arc;
use tower::ServiceExt;

fn intent_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/payment-intent")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_payment_intent() {
    let processor = Arc::new(FakeProcessor::new());
    let db = create_test_app_state(processor.clone());
    let app = api_app(db.state.clone());

    let response = app
        .oneshot(intent_request(r#"{"amount":"2000","currency":"USD"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], "pi_test");
    assert_eq!(json["client_secret"], "pi_test_secret_123");
    assert_eq!(json["amount"], 2000);
    assert_eq!(json["currency"], "usd");
    assert_eq!(processor.calls(), vec!["create_payment_intent:usd:2000"]);
}

#[tokio::test]
async fn test_payment_intent_rejects_bad_input() {
    let processor = Arc::new(FakeProcessor::new());
    let db = create_test_app_state(processor.clone());
    let app = api_app(db.state.clone());

    for body in [
        r#"{"amount":"twenty","currency":"usd"}"#,
        r#"{"amount":"-5","currency":"usd"}"#,
        r#"{"amount":"2000","currency":" "}"#,
        r#"{"amount":2000}"#,
        "not json",
    ] {
        let response = app.clone().oneshot(intent_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }
    assert!(processor.calls().is_empty());
}

#[tokio::test]
async fn test_payment_intent_card_declined() {
    let processor = FakeProcessor {
        intent: Outcome::Declined,
        ..FakeProcessor::default()
    };
    let db = create_test_app_state(Arc::new(processor));
    let app = api_app(db.state.clone());

    let response = app
        .oneshot(intent_request(r#"{"amount":"2000","currency":"usd"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["details"], "Your card was declined");
}

#[tokio::test]
async fn test_get_widget() {
    let db = create_test_app_state(Arc::new(FakeProcessor::new()));
    let widget = create_test_widget(&db.conn(), "Widget", 1000);
    let app = api_app(db.state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/widget/{}", widget.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Widget");
    assert_eq!(json["price"], 1000);
    assert!(json.get("created_at").is_none());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/widget/424242")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight() {
    let db = create_test_app_state(Arc::new(FakeProcessor::new()));
    let app = api_app(db.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/payment-intent")
                .header(header::ORIGIN, "http://localhost:4000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "300");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("DELETE"));
}

#[tokio::test]
async fn test_payment_intent_strict_rate_limit() {
    let db = create_test_app_state(Arc::new(FakeProcessor::new()));
    let app = api_app_with_limits(
        db.state.clone(),
        RateLimitConfig {
            strict_rpm: 2,
            standard_rpm: 1000,
        },
    );

    for i in 0..2 {
        let response = app
            .clone()
            .oneshot(intent_request(r#"{"amount":"2000","currency":"usd"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {}", i + 1);
    }

    let response = app
        .clone()
        .oneshot(intent_request(r#"{"amount":"2000","currency":"usd"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Standard tier has its own budget
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
