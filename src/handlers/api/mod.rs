//! JSON API used by the checkout pages' scripts.

mod payment_intent;
mod widgets;

pub use payment_intent::*;
pub use widgets::*;

use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::{get, post},
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::RateLimitConfig;
use crate::db::AppState;
use crate::rate_limit;

/// Browsers on the storefront origin call this API directly.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .max_age(Duration::from_secs(300))
}

pub fn router(rate_limit: RateLimitConfig) -> Router<AppState> {
    // Strict tier: each request creates an intent with the payment processor
    let strict = Router::new()
        .route("/api/payment-intent", post(create_payment_intent))
        .layer(rate_limit::strict_layer(rate_limit.strict_rpm));

    let standard = Router::new()
        .route("/health", get(super::health))
        .route("/api/widget/{id}", get(get_widget))
        .layer(rate_limit::standard_layer(rate_limit.standard_rpm));

    strict.merge(standard).layer(cors_layer())
}
