//! HTML pages for the storefront.
//!
//! Each view is a typed record implementing [`Page`]; the [`Renderer`] wraps
//! the page body in the shared layout and adds the data every page needs
//! (Stripe publishable key, API URL). All interpolated values are escaped.
//!
//! Pages with a card form also load Stripe.js and the checkout client served
//! from `/static/js/stripe.js`.

use axum::response::Html;

use crate::models::{Receipt, Widget};

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub const STRIPE_JS_URL: &str = "https://js.stripe.com/v3/";
pub const CHECKOUT_JS_PATH: &str = "/static/js/stripe.js";

/// Currencies Stripe charges in whole units (no minor unit).
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

fn is_zero_decimal(currency: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES.contains(&currency)
}

/// Format minor currency units for display, e.g. `2000, "usd"` → `$20.00`
/// and `500, "jpy"` → `500 JPY`.
pub fn format_currency(amount: i64, currency: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let currency = currency.to_lowercase();
    if is_zero_decimal(&currency) {
        return format!("{}{} {}", sign, abs, currency.to_uppercase());
    }

    let major = abs / 100;
    let minor = abs % 100;
    match currency.as_str() {
        "usd" | "" => format!("{}${}.{:02}", sign, major, minor),
        other => format!("{}{}.{:02} {}", sign, major, minor, other.to_uppercase()),
    }
}

/// A renderable view.
pub trait Page {
    fn title(&self) -> String;
    fn body(&self, ctx: &PageContext<'_>) -> String;

    /// Whether the page carries a card form and needs the Stripe scripts.
    fn takes_payment(&self) -> bool {
        false
    }
}

/// Data shared by every page.
pub struct PageContext<'a> {
    pub stripe_publishable_key: &'a str,
    pub api_url: &'a str,
}

pub struct Renderer {
    stripe_publishable_key: String,
    api_url: String,
}

impl Renderer {
    pub fn new(stripe_publishable_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            stripe_publishable_key: stripe_publishable_key.into(),
            api_url: api_url.into(),
        }
    }

    pub fn render(&self, page: &impl Page) -> Html<String> {
        let ctx = PageContext {
            stripe_publishable_key: &self.stripe_publishable_key,
            api_url: &self.api_url,
        };
        let scripts = if page.takes_payment() {
            format!(
                "<script src=\"{}\"></script>\n<script src=\"{}\"></script>\n",
                STRIPE_JS_URL, CHECKOUT_JS_PATH
            )
        } else {
            String::new()
        };
        Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body data-api="{api}">
<nav><a href="/">Home</a> | <a href="/terminal">Virtual Terminal</a></nav>
<main>
{body}
</main>
{scripts}</body>
</html>"#,
            title = escape_html(&page.title()),
            api = escape_html(ctx.api_url),
            body = page.body(&ctx),
            scripts = scripts,
        ))
    }
}

fn payment_form(action: &str, hidden: &str, ctx: &PageContext<'_>) -> String {
    format!(
        r#"<form action="{action}" method="post" id="charge_form" autocomplete="off">
{hidden}
<label>First name <input type="text" name="first_name" required></label>
<label>Last name <input type="text" name="last_name" required></label>
<label>Cardholder name <input type="text" name="cardholder_name" id="cardholder-name"></label>
<label>Email <input type="email" name="email" required></label>
<input type="hidden" id="currency" value="usd">
<div id="card-element"></div>
<div id="card-errors" role="alert" hidden></div>
<input type="hidden" name="payment_intent" id="payment_intent">
<input type="hidden" name="payment_method" id="payment_method">
<input type="hidden" name="payment_amount" id="payment_amount">
<input type="hidden" name="payment_currency" id="payment_currency">
<button type="submit" id="pay-button">Charge card</button>
<div id="processing-payment" hidden>Processing payment...</div>
</form>
<div id="card-messages" role="status" hidden></div>
<span id="stripe_public_key" hidden>{key}</span>
<span id="api_url" hidden>{api}</span>"#,
        action = action,
        hidden = hidden,
        key = escape_html(ctx.stripe_publishable_key),
        api = escape_html(ctx.api_url),
    )
}

pub struct HomePage {
    pub widgets: Vec<Widget>,
}

impl Page for HomePage {
    fn title(&self) -> String {
        "Widget Store".into()
    }

    fn body(&self, _ctx: &PageContext<'_>) -> String {
        let items: String = self
            .widgets
            .iter()
            .map(|w| {
                format!(
                    r#"<li><a href="/widget/{}">{}</a> {}</li>"#,
                    w.id,
                    escape_html(&w.name),
                    format_currency(w.price, "usd")
                )
            })
            .collect();
        format!("<h1>Widgets</h1>\n<ul>{}</ul>", items)
    }
}

pub struct BuyOncePage {
    pub widget: Widget,
}

impl Page for BuyOncePage {
    fn title(&self) -> String {
        format!("Buy {}", self.widget.name)
    }

    fn body(&self, ctx: &PageContext<'_>) -> String {
        let w = &self.widget;
        let hidden = format!(
            r#"<input type="hidden" name="product_id" value="{}">
<input type="hidden" name="quantity" value="1">
<input type="hidden" id="amount" value="{}">"#,
            w.id, w.price
        );
        format!(
            "<h1>Buy one widget</h1>\n<h2>{}</h2>\n<p>{}</p>\n<p>{}</p>\n{}",
            escape_html(&w.name),
            escape_html(&w.description),
            format_currency(w.price, "usd"),
            payment_form("/payment", &hidden, ctx)
        )
    }

    fn takes_payment(&self) -> bool {
        true
    }
}

pub struct TerminalPage;

impl Page for TerminalPage {
    fn title(&self) -> String {
        "Virtual Terminal".into()
    }

    fn body(&self, ctx: &PageContext<'_>) -> String {
        let hidden =
            r#"<label>Amount <input type="text" id="amount" data-units="major" inputmode="decimal" required></label>"#;
        format!(
            "<h1>Virtual Terminal</h1>\n{}",
            payment_form("/terminal/payment", hidden, ctx)
        )
    }

    fn takes_payment(&self) -> bool {
        true
    }
}

fn receipt_table(receipt: &Receipt) -> String {
    let mut rows = vec![
        (
            "Customer",
            format!("{} {}", receipt.first_name, receipt.last_name),
        ),
        ("Email", receipt.email.clone()),
    ];
    if let Some(ref holder) = receipt.cardholder_name {
        rows.push(("Cardholder", holder.clone()));
    }
    if let Some(ref widget) = receipt.widget_name {
        rows.push(("Product", widget.clone()));
    }
    if let Some(quantity) = receipt.quantity {
        rows.push(("Quantity", quantity.to_string()));
    }
    rows.extend([
        ("Amount", format_currency(receipt.amount, &receipt.currency)),
        ("Card", format!("**** **** **** {}", receipt.last_four)),
        (
            "Expires",
            format!("{:02}/{}", receipt.expiry_month, receipt.expiry_year),
        ),
        ("Payment intent", receipt.payment_intent.clone()),
        ("Payment method", receipt.payment_method.clone()),
        ("Bank return code", receipt.bank_return_code.clone()),
    ]);

    let body: String = rows
        .iter()
        .map(|(label, value)| format!("<tr><th>{}</th><td>{}</td></tr>", label, escape_html(value)))
        .collect();
    format!("<table>{}</table>", body)
}

pub struct ReceiptPage {
    pub receipt: Receipt,
}

impl Page for ReceiptPage {
    fn title(&self) -> String {
        "Payment Succeeded".into()
    }

    fn body(&self, _ctx: &PageContext<'_>) -> String {
        let order = self
            .receipt
            .order_id
            .map(|id| format!("<p>Order #{}</p>", id))
            .unwrap_or_default();
        format!(
            "<h1>Payment Succeeded</h1>\n{}\n{}",
            order,
            receipt_table(&self.receipt)
        )
    }
}

pub struct TerminalReceiptPage {
    pub receipt: Receipt,
}

impl Page for TerminalReceiptPage {
    fn title(&self) -> String {
        "Virtual Terminal Payment Succeeded".into()
    }

    fn body(&self, _ctx: &PageContext<'_>) -> String {
        format!(
            "<h1>Virtual Terminal Payment Succeeded</h1>\n<p>Transaction #{}</p>\n{}",
            self.receipt.transaction_id,
            receipt_table(&self.receipt)
        )
    }
}
