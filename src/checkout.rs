//! Order placement: confirm a client-side payment with the processor, then
//! record customer, transaction and order and stage the receipt.
//!
//! Steps run strictly in sequence and the first failure aborts the run.
//! Earlier ledger writes are not undone when a later one fails.

use serde::Deserialize;

use crate::error::{AppError, Result, msg};
use crate::ledger::{CustomerLedger, OrderLedger, SqliteLedger, TransactionLedger, WidgetCatalog};
use crate::models::{
    CreateCustomer, CreateOrder, CreateTransaction, OrderStatus, Receipt, TransactionStatus,
};
use crate::payments::{CardDetails, PaymentProcessor};
use crate::session::{RECEIPT_KEY, ReceiptHandoff, TERMINAL_RECEIPT_KEY};

/// Fields posted by the checkout and virtual terminal pages.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub cardholder_name: Option<String>,
    pub payment_intent: String,
    pub payment_method: String,
    /// Whole minor currency units, as typed into the form
    pub payment_amount: String,
    pub payment_currency: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// A submission reconciled with the processor's record of the charge.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cardholder_name: Option<String>,
    pub payment_intent: String,
    pub payment_method: String,
    pub amount: i64,
    pub currency: String,
    /// Charge id, stored as the bank return code
    pub charge_id: String,
    pub card: CardDetails,
}

impl PaymentConfirmation {
    fn transaction(&self, status: TransactionStatus) -> CreateTransaction {
        CreateTransaction {
            amount: self.amount,
            currency: self.currency.clone(),
            last_four: self.card.last_four.clone(),
            bank_return_code: self.charge_id.clone(),
            expiry_month: self.card.exp_month,
            expiry_year: self.card.exp_year,
            payment_intent: self.payment_intent.clone(),
            payment_method: self.payment_method.clone(),
            status,
        }
    }

    fn receipt(&self, transaction_id: i64) -> Receipt {
        Receipt {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            cardholder_name: self.cardholder_name.clone(),
            payment_intent: self.payment_intent.clone(),
            payment_method: self.payment_method.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            last_four: self.card.last_four.clone(),
            expiry_month: self.card.exp_month,
            expiry_year: self.card.exp_year,
            bank_return_code: self.charge_id.clone(),
            transaction_id,
            customer_id: None,
            order_id: None,
            widget_name: None,
            quantity: None,
        }
    }
}

/// Parse a base-10 amount in minor currency units. Must be positive.
pub fn parse_amount(raw: &str) -> Result<i64> {
    let amount: i64 = raw
        .parse()
        .map_err(|_| AppError::Validation(msg::INVALID_PAYMENT_AMOUNT.into()))?;
    if amount <= 0 {
        return Err(AppError::Validation(msg::NON_POSITIVE_AMOUNT.into()));
    }
    Ok(amount)
}

/// The confirmed charge must equal the catalog price for the quantity ordered.
pub fn check_order_amount(amount: i64, unit_price: i64, quantity: i64) -> Result<()> {
    match unit_price.checked_mul(quantity) {
        Some(expected) if expected == amount => Ok(()),
        _ => Err(AppError::Validation(msg::AMOUNT_MISMATCH.into())),
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Validate a submission and look up its charge and card with the processor.
///
/// All local checks run before the first upstream call. Nothing is written.
pub async fn confirm_payment(
    processor: &dyn PaymentProcessor,
    submission: &PaymentSubmission,
) -> Result<PaymentConfirmation> {
    let amount = parse_amount(&submission.payment_amount)?;
    let first_name = required("first_name", &submission.first_name)?;
    let last_name = required("last_name", &submission.last_name)?;
    let email = required("email", &submission.email)?;
    let payment_intent = required("payment_intent", &submission.payment_intent)?;
    let payment_method = required("payment_method", &submission.payment_method)?;
    let currency = required("payment_currency", &submission.payment_currency)?;

    let charge_id = processor.retrieve_charge_id(payment_intent).await?;
    tracing::debug!(payment_intent, charge_id = %charge_id, "Charge found");

    let card = processor.get_payment_method(payment_method).await?;
    tracing::debug!(payment_method, last_four = %card.last_four, "Card details retrieved");

    Ok(PaymentConfirmation {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        cardholder_name: submission
            .cardholder_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        payment_intent: payment_intent.to_string(),
        payment_method: payment_method.to_string(),
        amount,
        currency: currency.to_string(),
        charge_id,
        card,
    })
}

/// The order workflow over a processor and the four ledgers.
pub struct Checkout<'a> {
    processor: &'a dyn PaymentProcessor,
    catalog: &'a dyn WidgetCatalog,
    customers: &'a dyn CustomerLedger,
    transactions: &'a dyn TransactionLedger,
    orders: &'a dyn OrderLedger,
}

impl<'a> Checkout<'a> {
    pub fn new(processor: &'a dyn PaymentProcessor, ledger: &'a SqliteLedger) -> Self {
        Self::with_ledgers(processor, ledger, ledger, ledger, ledger)
    }

    pub fn with_ledgers(
        processor: &'a dyn PaymentProcessor,
        catalog: &'a dyn WidgetCatalog,
        customers: &'a dyn CustomerLedger,
        transactions: &'a dyn TransactionLedger,
        orders: &'a dyn OrderLedger,
    ) -> Self {
        Self {
            processor,
            catalog,
            customers,
            transactions,
            orders,
        }
    }

    /// Buy-once flow: customer, then transaction, then order, then receipt.
    ///
    /// The charged amount is checked against the widget's price before any
    /// write. The order is only saved after both its customer and transaction
    /// ids have been returned. The staged receipt is also returned.
    pub async fn place_order(
        &self,
        submission: &PaymentSubmission,
        handoff: &ReceiptHandoff,
    ) -> Result<Receipt> {
        let product_id = submission
            .product_id
            .ok_or_else(|| AppError::Validation(msg::MISSING_PRODUCT.into()))?;
        let quantity = submission.quantity.unwrap_or(1);
        if quantity <= 0 {
            return Err(AppError::Validation(msg::INVALID_QUANTITY.into()));
        }

        let confirmation = confirm_payment(self.processor, submission).await?;

        let widget = self
            .catalog
            .get_widget(product_id)?
            .ok_or_else(|| AppError::Validation(msg::UNKNOWN_PRODUCT.into()))?;
        check_order_amount(confirmation.amount, widget.price, quantity)?;

        let customer_id = self.customers.save_customer(&CreateCustomer {
            first_name: confirmation.first_name.clone(),
            last_name: confirmation.last_name.clone(),
            email: confirmation.email.clone(),
        })?;
        tracing::debug!(customer_id, "Customer saved");

        let transaction_id = self
            .transactions
            .save_transaction(&confirmation.transaction(TransactionStatus::Pending))?;
        tracing::debug!(transaction_id, "Transaction saved");

        let order_id = self.orders.save_order(&CreateOrder {
            widget_id: widget.id,
            transaction_id,
            customer_id,
            status: OrderStatus::Cleared,
            quantity,
            amount: confirmation.amount,
        })?;

        let receipt = Receipt {
            customer_id: Some(customer_id),
            order_id: Some(order_id),
            widget_name: Some(widget.name),
            quantity: Some(quantity),
            ..confirmation.receipt(transaction_id)
        };
        handoff.put(RECEIPT_KEY, &receipt)?;

        tracing::info!(
            order_id,
            transaction_id,
            customer_id,
            amount = receipt.amount,
            currency = %receipt.currency,
            "Order placed"
        );
        Ok(receipt)
    }

    /// Virtual terminal flow: records the transaction only.
    pub async fn charge_terminal(
        &self,
        submission: &PaymentSubmission,
        handoff: &ReceiptHandoff,
    ) -> Result<Receipt> {
        let confirmation = confirm_payment(self.processor, submission).await?;

        let transaction_id = self
            .transactions
            .save_transaction(&confirmation.transaction(TransactionStatus::Pending))?;

        let receipt = confirmation.receipt(transaction_id);
        handoff.put(TERMINAL_RECEIPT_KEY, &receipt)?;

        tracing::info!(
            transaction_id,
            amount = receipt.amount,
            currency = %receipt.currency,
            "Terminal payment recorded"
        );
        Ok(receipt)
    }
}
