//! Storefront server: catalog pages, checkout and the virtual terminal.

mod payment;
mod terminal;

pub use payment::*;
pub use terminal::*;

use axum::{
    Router,
    extract::State,
    response::Html,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::db::{AppState, queries};
use crate::error::{OptionExt, Result, msg};
use crate::extractors::Path;
use crate::middleware::load_session;
use crate::render::{BuyOncePage, HomePage};

pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    let conn = state.db.get()?;
    let widgets = queries::list_widgets(&conn)?;
    Ok(state.renderer.render(&HomePage { widgets }))
}

pub async fn show_widget(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>> {
    let conn = state.db.get()?;
    let widget = queries::get_widget_by_id(&conn, id)?.or_not_found(msg::WIDGET_NOT_FOUND)?;
    Ok(state.renderer.render(&BuyOncePage { widget }))
}

/// Storefront routes. Static assets sit outside the session layer.
pub fn router(state: AppState) -> Router<AppState> {
    let assets = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/health", get(super::health))
        .route("/", get(home))
        .route("/widget/{id}", get(show_widget))
        .route("/payment", post(payment_succeeded))
        .route("/payment/receipt", get(payment_receipt))
        .route("/terminal", get(terminal_page))
        .route("/terminal/payment", post(terminal_payment_succeeded))
        .route("/terminal/receipt", get(terminal_receipt))
        .layer(axum::middleware::from_fn_with_state(state, load_session))
        .nest_service("/static", assets)
}
