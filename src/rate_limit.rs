//! Per-IP rate limiting for the API server.
//!
//! Tiers:
//! - Strict: /api/payment-intent - calls the payment processor
//! - Standard: /api/widget/{id}, /health
//!
//! Configure via environment variables:
//! - RATE_LIMIT_STRICT_RPM (default: 10)
//! - RATE_LIMIT_STANDARD_RPM (default: 60)

use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;

/// Rate limiter layer type alias using governor types directly
pub type RateLimitLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    axum::body::Body,
>;

/// Milliseconds between replenished requests for a per-minute budget.
/// A budget of zero is treated as one.
fn replenish_interval_ms(requests_per_minute: u32) -> u64 {
    (60_000 / u64::from(requests_per_minute.max(1))).max(1)
}

/// Creates a rate limiter layer allowing `requests_per_minute` per client IP.
///
/// The whole minute's budget may be spent as a burst; it then refills at an
/// even pace.
fn create_layer(requests_per_minute: u32) -> RateLimitLayer {
    let config = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(requests_per_minute))
        .burst_size(requests_per_minute.max(1))
        .finish()
        .expect("period and burst size are non-zero");

    GovernorLayer::new(Arc::new(config))
}

/// Creates a rate limiter layer for the strict tier.
pub fn strict_layer(requests_per_minute: u32) -> RateLimitLayer {
    create_layer(requests_per_minute)
}

/// Creates a rate limiter layer for the standard tier.
pub fn standard_layer(requests_per_minute: u32) -> RateLimitLayer {
    create_layer(requests_per_minute)
}
