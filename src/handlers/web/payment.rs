use axum::{
    extract::{Extension, State},
    response::{Html, Redirect},
};

use crate::checkout::{Checkout, PaymentSubmission};
use crate::db::AppState;
use crate::error::{OptionExt, Result, msg};
use crate::extractors::FormOrJson;
use crate::render::ReceiptPage;
use crate::session::{RECEIPT_KEY, SessionId};

/// POST /payment - runs the order workflow, then redirects to the receipt.
pub async fn payment_succeeded(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    FormOrJson(submission): FormOrJson<PaymentSubmission>,
) -> Result<Redirect> {
    let ledger = state.ledger();
    Checkout::new(state.processor.as_ref(), &ledger)
        .place_order(&submission, &state.sessions.handoff(&session))
        .await?;

    Ok(Redirect::to("/payment/receipt"))
}

/// GET /payment/receipt - shows the staged receipt once.
pub async fn payment_receipt(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Html<String>> {
    let receipt = state
        .sessions
        .handoff(&session)
        .take_once(RECEIPT_KEY)?
        .or_not_found(msg::RECEIPT_NOT_FOUND)?;

    Ok(state.renderer.render(&ReceiptPage { receipt }))
}
