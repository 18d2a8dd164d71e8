//! Storefront - a small widget shop with Stripe-confirmed checkout
//!
//! This library provides the order placement workflow, its SQLite ledgers,
//! the receipt handoff, and the HTTP routers for the storefront and API servers.

pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod rate_limit;
pub mod render;
pub mod session;
