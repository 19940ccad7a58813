//! Order confirmation summary shown after the gateway redirects the shopper back.
//!
//! Totals are derived here, never trusted from the caller:
//! `subtotal = Σ price × quantity`, shipping is free for pickup or for
//! subtotals of at least [`FREE_SHIPPING_THRESHOLD`], otherwise
//! [`FLAT_SHIPPING_FEE`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

use crate::models::{LineItem, Order, OrderStatus};

pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(75, 0, 0, false, 0);

pub const ORDER_STATUS_LINK: &str = "/orders";
pub const HOME_LINK: &str = "/";

#[derive(Debug, Error)]
pub enum MalformedInput {
    #[error("cart items are not valid percent-encoding: {0}")]
    Encoding(String),

    #[error("cart items are not a valid line-item list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cart totals exceed the representable amount")]
    Overflow,
}

/// Redirect parameters appended by checkout. Every field is optional because
/// the page can be reached by direct navigation.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuccessParams {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    pub amount: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub customer_name: Option<String>,
    pub shipping_method: Option<String>,
    pub shipping_address: Option<String>,
    pub pickup_location: Option<String>,
    /// URL-encoded JSON array of line items.
    #[serde(rename = "cartItems")]
    pub cart_items: Option<String>,
}

impl SuccessParams {
    pub fn is_empty(&self) -> bool {
        self.order_id.is_none()
            && self.amount.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.customer_name.is_none()
            && self.shipping_method.is_none()
            && self.shipping_address.is_none()
            && self.pickup_location.is_none()
            && self.cart_items.is_none()
    }
}

/// Where the summary's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// The persisted order row.
    OrderRecord,
    /// Only the redirect query string; nothing was found in the store.
    RedirectParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummaryLine {
    #[serde(flatten)]
    pub item: LineItem,
    /// `"{size} / {material}"` when both were chosen.
    pub variant: Option<String>,
    #[schema(value_type = String)]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderSummary {
    pub source: SummarySource,
    pub order_id: String,
    /// Persisted payment status, when the summary was built from the order row.
    pub status: Option<OrderStatus>,
    /// Amount as reported by the redirect or stored on the order; display only.
    pub amount: String,
    pub customer_name: String,
    pub greeting_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub shipping_method: String,
    pub is_pickup: bool,
    pub shipping_address: String,
    pub pickup_location: String,
    pub items: Vec<SummaryLine>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub shipping: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProcessingNotice {
    pub message: String,
    pub order_status_link: String,
    pub home_link: String,
}

impl Default for ProcessingNotice {
    fn default() -> Self {
        Self {
            message: "We're still processing your payment. This may take a few moments."
                .to_string(),
            order_status_link: ORDER_STATUS_LINK.to_string(),
            home_link: HOME_LINK.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Confirmation {
    Processing(ProcessingNotice),
    Summary(OrderSummary),
}

pub fn line_total(item: &LineItem) -> Result<Decimal, MalformedInput> {
    item.price
        .checked_mul(Decimal::from(item.quantity))
        .ok_or(MalformedInput::Overflow)
}

pub fn subtotal(items: &[LineItem]) -> Result<Decimal, MalformedInput> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(line_total(item)?)
            .ok_or(MalformedInput::Overflow)
    })
}

pub fn shipping_fee(subtotal: Decimal, shipping_method: &str) -> Decimal {
    if shipping_method == "pickup" {
        return Decimal::ZERO;
    }
    if subtotal < FREE_SHIPPING_THRESHOLD {
        FLAT_SHIPPING_FEE
    } else {
        Decimal::ZERO
    }
}

/// Decode the `cartItems` parameter. The value may still be percent-encoded
/// after query-string decoding, so one more pass is attempted first.
pub fn parse_cart_items(raw: &str) -> Result<Vec<LineItem>, MalformedInput> {
    let decoded = match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) if raw.trim_start().starts_with('[') => {
            tracing::debug!(error = %err, "cart items already decoded");
            raw.to_string()
        }
        Err(err) => return Err(MalformedInput::Encoding(err.to_string())),
    };
    Ok(serde_json::from_str(&decoded)?)
}

/// Same as [`parse_cart_items`] but degrades to an empty list.
pub fn cart_items_or_empty(raw: Option<&str>) -> Vec<LineItem> {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };
    parse_cart_items(raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring malformed cart items");
        Vec::new()
    })
}

fn greeting_name(customer_name: &str) -> String {
    customer_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn summary_lines(items: Vec<LineItem>) -> Result<Vec<SummaryLine>, MalformedInput> {
    items
        .into_iter()
        .map(|item| {
            let variant = match (&item.selected_size, &item.selected_material) {
                (Some(size), Some(material)) => Some(format!("{size} / {material}")),
                _ => None,
            };
            Ok(SummaryLine {
                line_total: line_total(&item)?,
                item,
                variant,
            })
        })
        .collect()
}

struct Pricing {
    lines: Vec<SummaryLine>,
    subtotal: Decimal,
    shipping: Decimal,
    total: Decimal,
}

fn price(items: Vec<LineItem>, shipping_method: &str) -> Result<Pricing, MalformedInput> {
    let subtotal = subtotal(&items)?;
    let shipping = shipping_fee(subtotal, shipping_method);
    let total = subtotal
        .checked_add(shipping)
        .ok_or(MalformedInput::Overflow)?;
    Ok(Pricing {
        lines: summary_lines(items)?,
        subtotal,
        shipping,
        total,
    })
}

/// Price the items, or an empty cart when the amounts cannot be represented.
fn price_or_empty(items: Vec<LineItem>, shipping_method: &str) -> Pricing {
    price(items, shipping_method).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unpriceable cart items");
        let shipping = shipping_fee(Decimal::ZERO, shipping_method);
        Pricing {
            lines: Vec::new(),
            subtotal: Decimal::ZERO,
            shipping,
            total: shipping,
        }
    })
}

struct SummaryInput {
    source: SummarySource,
    order_id: String,
    status: Option<OrderStatus>,
    amount: String,
    customer_name: String,
    email: String,
    phone: Option<String>,
    shipping_method: String,
    shipping_address: String,
    pickup_location: String,
    items: Vec<LineItem>,
    placed_at: DateTime<Utc>,
}

fn build_summary(input: SummaryInput) -> OrderSummary {
    let pricing = price_or_empty(input.items, &input.shipping_method);
    OrderSummary {
        source: input.source,
        greeting_name: greeting_name(&input.customer_name),
        is_pickup: input.shipping_method == "pickup",
        order_id: input.order_id,
        status: input.status,
        amount: input.amount,
        customer_name: input.customer_name,
        email: input.email,
        phone: input.phone,
        shipping_method: input.shipping_method,
        shipping_address: input.shipping_address,
        pickup_location: input.pickup_location,
        items: pricing.lines,
        subtotal: pricing.subtotal,
        shipping: pricing.shipping,
        total: pricing.total,
        placed_at: input.placed_at,
    }
}

/// Build the confirmation purely from the redirect parameters.
pub fn reconstruct(params: &SuccessParams, now: DateTime<Utc>) -> Confirmation {
    if params.is_empty() {
        return Confirmation::Processing(ProcessingNotice::default());
    }

    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    Confirmation::Summary(build_summary(SummaryInput {
        source: SummarySource::RedirectParams,
        order_id: text(&params.order_id),
        status: None,
        amount: params.amount.clone().unwrap_or_else(|| "0".to_string()),
        customer_name: text(&params.customer_name),
        email: text(&params.email),
        phone: params.phone.clone().filter(|phone| !phone.is_empty()),
        shipping_method: text(&params.shipping_method),
        shipping_address: text(&params.shipping_address),
        pickup_location: text(&params.pickup_location),
        items: cart_items_or_empty(params.cart_items.as_deref()),
        placed_at: now,
    }))
}

/// Build the confirmation from the persisted order.
pub fn from_order(order: Order) -> Confirmation {
    let shipping_method = match order.shipping_method {
        crate::models::ShippingMethod::Delivery => "delivery",
        crate::models::ShippingMethod::Pickup => "pickup",
    };
    Confirmation::Summary(build_summary(SummaryInput {
        source: SummarySource::OrderRecord,
        order_id: order.order_id,
        status: Some(order.status),
        amount: order
            .amount
            .map(|amount| amount.to_string())
            .unwrap_or_else(|| "0".to_string()),
        customer_name: order.customer_name,
        email: order.email,
        phone: order.phone,
        shipping_method: shipping_method.to_string(),
        shipping_address: order.shipping_address.unwrap_or_default(),
        pickup_location: order.pickup_location.unwrap_or_default(),
        items: order.items,
        placed_at: order.created_at,
    }))
}
