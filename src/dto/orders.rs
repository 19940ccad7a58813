use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Order, OrderStatus};

/// Anonymous order-status answer: payment state only, no customer details.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatusView {
    pub order_id: String,
    pub status: OrderStatus,
    pub payment_reference: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Result of applying a gateway notification.
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// The order was marked paid; carries the updated row.
    Reconciled(Order),
    /// Event type or payload did not call for a mutation.
    Ignored,
}
