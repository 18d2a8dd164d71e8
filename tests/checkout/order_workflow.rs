//! Buy-once workflow: confirm, customer, transaction, order, receipt

#[path = "../common/mod.rs"]
mod common;

use common::*;
use std::sync::Arc;

fn handoff() -> (SessionStore, SessionId, ReceiptHandoff) {
    let store = SessionStore::new(3600);
    let id = SessionId::generate();
    let handoff = store.handoff(&id);
    (store, id, handoff)
}

#[tokio::test]
async fn test_order_saved_only_after_customer_and_transaction() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1)));
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    let receipt = checkout
        .place_order(&sample_submission(Some(1)), &handoff)
        .await
        .unwrap();

    assert_eq!(
        ledger.events(),
        vec!["widget:1", "customer:11", "transaction:22", "order:33"]
    );
    assert_eq!(
        processor.calls(),
        vec!["retrieve_charge_id:pi_1", "get_payment_method:pm_1"]
    );

    let orders = ledger.orders.lock().unwrap().clone();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].customer_id, 11);
    assert_eq!(orders[0].transaction_id, 22);
    assert_eq!(orders[0].widget_id, 1);
    assert_eq!(orders[0].quantity, 1);
    assert_eq!(orders[0].status, OrderStatus::Cleared);

    assert_eq!(receipt.order_id, Some(33));
    assert_eq!(receipt.customer_id, Some(11));
    assert_eq!(receipt.transaction_id, 22);
}

#[tokio::test]
async fn test_transaction_written_as_pending_with_card_metadata() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1)));
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    checkout
        .place_order(&sample_submission(Some(1)), &handoff)
        .await
        .unwrap();

    let transactions = ledger.transactions.lock().unwrap().clone();
    assert_eq!(
        transactions,
        vec![CreateTransaction {
            amount: 2000,
            currency: "usd".into(),
            last_four: "4242".into(),
            bank_return_code: TEST_CHARGE_ID.into(),
            expiry_month: 12,
            expiry_year: 2026,
            payment_intent: "pi_1".into(),
            payment_method: "pm_1".into(),
            status: TransactionStatus::Pending,
        }]
    );
}

#[tokio::test]
async fn test_malformed_amount_aborts_before_any_write() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1)));
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    for amount in ["twenty", "20.00", "", "0"] {
        let mut submission = sample_submission(Some(1));
        submission.payment_amount = amount.into();

        let err = checkout.place_order(&submission, &handoff).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{:?} gave {:?}", amount, err);
    }

    assert!(ledger.events().is_empty());
    assert!(processor.calls().is_empty(), "no upstream lookup for invalid input");
    assert!(handoff.take_once(RECEIPT_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_missing_fields_and_products_are_validation_errors() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1)));
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    let mut blank_email = sample_submission(Some(1));
    blank_email.email = "  ".into();
    let mut zero_quantity = sample_submission(Some(1));
    zero_quantity.quantity = Some(0);

    for submission in [sample_submission(None), blank_email, zero_quantity] {
        let err = checkout.place_order(&submission, &handoff).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    }

    // Unknown product is detected after confirmation but before any write
    let err = checkout
        .place_order(&sample_submission(Some(7)), &handoff)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(ledger.events(), vec!["widget:7"]);
}

#[tokio::test]
async fn test_amount_must_match_widget_price() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1)));
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    let mut one_cent = sample_submission(Some(1));
    one_cent.payment_amount = "1".into();
    let err = checkout.place_order(&one_cent, &handoff).await.unwrap_err();
    match err {
        AppError::Validation(m) => assert_eq!(m, "payment_amount does not match the price of the order"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(ledger.events(), vec!["widget:1"]);
    assert!(ledger.orders.lock().unwrap().is_empty());
    assert!(handoff.take_once(RECEIPT_KEY).unwrap().is_none());

    // Price for one widget, two ordered
    let mut short = sample_submission(Some(1));
    short.quantity = Some(2);
    assert!(matches!(
        checkout.place_order(&short, &handoff).await,
        Err(AppError::Validation(_))
    ));
    assert_eq!(ledger.events(), vec!["widget:1", "widget:1"]);
}

#[tokio::test]
async fn test_quantity_scales_expected_amount() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1)));
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    let mut two = sample_submission(Some(1));
    two.quantity = Some(2);
    two.payment_amount = "4000".into();
    let receipt = checkout.place_order(&two, &handoff).await.unwrap();

    assert_eq!(receipt.quantity, Some(2));
    let orders = ledger.orders.lock().unwrap().clone();
    assert_eq!(orders[0].quantity, 2);
    assert_eq!(orders[0].amount, 4000);
}

#[tokio::test]
async fn test_upstream_failure_writes_nothing() {
    for (charge, payment_method) in [
        (Outcome::Unavailable, Outcome::Succeed),
        (Outcome::Succeed, Outcome::Unavailable),
    ] {
        let processor = FakeProcessor {
            charge,
            payment_method,
            ..FakeProcessor::default()
        };
        let ledger = RecordingLedger::new(Some(sample_widget(1)));
        let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
        let (_store, _id, handoff) = handoff();

        let err = checkout
            .place_order(&sample_submission(Some(1)), &handoff)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)), "got {:?}", err);
        assert!(ledger.events().is_empty());
        assert!(handoff.take_once(RECEIPT_KEY).unwrap().is_none());
    }
}

#[tokio::test]
async fn test_order_failure_leaves_earlier_writes_and_no_receipt() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1))).failing_on("order");
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    let err = checkout
        .place_order(&sample_submission(Some(1)), &handoff)
        .await
        .unwrap_err();

    assert!(err.is_persistence());
    assert_eq!(
        ledger.events(),
        vec!["widget:1", "customer:11", "transaction:22", "order:failed"]
    );
    assert!(handoff.take_once(RECEIPT_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_customer_failure_stops_before_transaction() {
    let processor = FakeProcessor::new();
    let ledger = RecordingLedger::new(Some(sample_widget(1))).failing_on("customer");
    let checkout = Checkout::with_ledgers(&processor, &ledger, &ledger, &ledger, &ledger);
    let (_store, _id, handoff) = handoff();

    let err = checkout
        .place_order(&sample_submission(Some(1)), &handoff)
        .await
        .unwrap_err();

    assert!(err.is_persistence());
    assert_eq!(ledger.events(), vec!["widget:1", "customer:failed"]);
}

#[tokio::test]
async fn test_ann_lee_scenario_against_sqlite() {
    let db = create_test_app_state(Arc::new(FakeProcessor::new()));
    let widget = create_test_widget(&db.conn(), "Widget", 2000);
    let ledger = db.ledger();
    let processor = FakeProcessor::new();
    let (_store, _id, handoff) = handoff();

    let receipt = Checkout::new(&processor, &ledger)
        .place_order(&sample_submission(Some(widget.id)), &handoff)
        .await
        .unwrap();

    let conn = db.conn();
    let customer_id = receipt.customer_id.unwrap();
    let customer = queries::get_customer_by_id(&conn, customer_id).unwrap().unwrap();
    assert_eq!(
        (customer.first_name.as_str(), customer.last_name.as_str(), customer.email.as_str()),
        ("Ann", "Lee", "a@x.com")
    );

    let tx = queries::get_transaction_by_id(&conn, receipt.transaction_id)
        .unwrap()
        .unwrap();
    assert_eq!(tx.amount, 2000);
    assert_eq!(tx.currency, "usd");
    assert_eq!(tx.last_four, "4242");
    assert_eq!(tx.bank_return_code, "ch_1");

    let order = queries::get_order_by_id(&conn, receipt.order_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(order.amount, 2000);
    assert_eq!(order.transaction_id, tx.id);
    assert_eq!(order.customer_id, customer.id);
    assert_eq!(order.widget_id, widget.id);
    drop(conn);

    let staged = handoff.take_once(RECEIPT_KEY).unwrap().unwrap();
    assert_eq!(staged, receipt);
    assert_eq!(staged.first_name, "Ann");
    assert_eq!(staged.cardholder_name.as_deref(), Some("Ann Lee"));
    assert_eq!(staged.expiry_month, 12);
    assert_eq!(staged.expiry_year, 2026);
    assert_eq!(staged.widget_name.as_deref(), Some("Widget"));
    assert!(handoff.take_once(RECEIPT_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_double_submission_records_two_orders() {
    let db = create_test_app_state(Arc::new(FakeProcessor::new()));
    let widget = create_test_widget(&db.conn(), "Widget", 2000);
    let ledger = db.ledger();
    let processor = FakeProcessor::new();
    let (_store, _id, handoff) = handoff();
    let checkout = Checkout::new(&processor, &ledger);

    let first = checkout
        .place_order(&sample_submission(Some(widget.id)), &handoff)
        .await
        .unwrap();
    let second = checkout
        .place_order(&sample_submission(Some(widget.id)), &handoff)
        .await
        .unwrap();

    assert_ne!(first.order_id, second.order_id);
    assert_eq!(db.count("customers"), 2);
    assert_eq!(db.count("transactions"), 2);
    assert_eq!(db.count("orders"), 2);

    // Second staging overwrote the first
    assert_eq!(handoff.take_once(RECEIPT_KEY).unwrap(), Some(second));
}
