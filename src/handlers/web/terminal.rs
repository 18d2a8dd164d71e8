use axum::{
    extract::{Extension, State},
    response::{Html, Redirect},
};

use crate::checkout::{Checkout, PaymentSubmission};
use crate::db::AppState;
use crate::error::{OptionExt, Result, msg};
use crate::extractors::FormOrJson;
use crate::render::{TerminalPage, TerminalReceiptPage};
use crate::session::{SessionId, TERMINAL_RECEIPT_KEY};

pub async fn terminal_page(State(state): State<AppState>) -> Html<String> {
    state.renderer.render(&TerminalPage)
}

/// POST /terminal/payment - records a card-present style charge with no order.
pub async fn terminal_payment_succeeded(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    FormOrJson(submission): FormOrJson<PaymentSubmission>,
) -> Result<Redirect> {
    let ledger = state.ledger();
    Checkout::new(state.processor.as_ref(), &ledger)
        .charge_terminal(&submission, &state.sessions.handoff(&session))
        .await?;

    Ok(Redirect::to("/terminal/receipt"))
}

pub async fn terminal_receipt(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Html<String>> {
    let receipt = state
        .sessions
        .handoff(&session)
        .take_once(TERMINAL_RECEIPT_KEY)?
        .or_not_found(msg::RECEIPT_NOT_FOUND)?;

    Ok(state.renderer.render(&TerminalReceiptPage { receipt }))
}
