use chrono::{DateTime, Utc};
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};

use crate::{
    confirmation::{self, Confirmation, SuccessParams},
    dto::{
        orders::{OrderStatusView, ReconcileOutcome},
        webhook::WebhookEvent,
    },
    entity::orders::{Column as OrderCol, Entity as Orders, Model as OrderModel, OrderStatus},
    error::{AppError, AppResult},
    models::{LineItem, Order},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Apply a gateway notification to the order it names.
///
/// Only a successful payment with a transaction id mutates anything. The update
/// sets fixed values and has no precondition on the prior status, so repeated
/// deliveries of the same event converge on the same row.
pub async fn reconcile_payment(
    state: &AppState,
    event: &WebhookEvent,
) -> AppResult<ReconcileOutcome> {
    let Some(transaction_id) = event.succeeded_payment_id() else {
        tracing::debug!(event = %event.event, "ignoring gateway event");
        return Ok(ReconcileOutcome::Ignored);
    };

    let updated = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(OrderStatus::Paid.to_value()))
        .col_expr(OrderCol::PaymentReference, Expr::value(transaction_id))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::OrderId.eq(transaction_id))
        .exec_with_returning(state.db())
        .await?;

    let Some(order) = updated.into_iter().next() else {
        return Err(AppError::NotFound);
    };

    tracing::info!(order_id = %order.order_id, "order marked paid");
    Ok(ReconcileOutcome::Reconciled(order_from_entity(order)))
}

pub async fn find_order(state: &AppState, order_id: &str) -> AppResult<Option<Order>> {
    let order = Orders::find_by_id(order_id.to_string())
        .one(state.db())
        .await?
        .map(order_from_entity);
    Ok(order)
}

/// Public status check. Only payment state is exposed; the caller is anonymous.
pub async fn get_order(state: &AppState, order_id: &str) -> AppResult<ApiResponse<OrderStatusView>> {
    let order = match find_order(state, order_id).await? {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    let view = OrderStatusView {
        order_id: order.order_id,
        status: order.status,
        payment_reference: order.payment_reference,
        updated_at: order.updated_at,
    };
    Ok(ApiResponse::success("OK", view, Some(Meta::now())))
}

/// The redirect must name the order's email before stored contact and
/// address details are shown.
fn owns_order(params: &SuccessParams, order: &Order) -> bool {
    params
        .email
        .as_deref()
        .map(str::trim)
        .is_some_and(|email| !email.is_empty() && email.eq_ignore_ascii_case(order.email.trim()))
}

/// Confirmation for the success page. The stored order is authoritative when
/// the redirect proves ownership; otherwise only the redirect parameters are
/// echoed back. A failed lookup degrades to the redirect parameters.
pub async fn confirmation(
    state: &AppState,
    params: SuccessParams,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<Confirmation>> {
    let stored = match params.order_id.as_deref().filter(|id| !id.is_empty()) {
        Some(order_id) => find_order(state, order_id).await.unwrap_or_else(|err| {
            tracing::warn!(order_id, error = %err, "order lookup failed, using redirect parameters");
            None
        }),
        None => None,
    };

    let view = match stored {
        Some(order) if owns_order(&params, &order) => confirmation::from_order(order),
        Some(order) => {
            tracing::info!(order_id = %order.order_id, "redirect email does not match stored order");
            confirmation::reconstruct(&params, now)
        }
        None => confirmation::reconstruct(&params, now),
    };
    Ok(ApiResponse::success("Order confirmation", view, Some(Meta::now())))
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    let items = serde_json::from_value::<Vec<LineItem>>(model.items).unwrap_or_else(|err| {
        tracing::warn!(order_id = %model.order_id, error = %err, "stored order items unreadable");
        Vec::new()
    });
    Order {
        order_id: model.order_id,
        status: model.status,
        payment_reference: model.payment_reference,
        customer_name: model.customer_name,
        email: model.email,
        phone: model.phone,
        shipping_method: model.shipping_method,
        shipping_address: model.shipping_address,
        pickup_location: model.pickup_location,
        amount: model.amount,
        items,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
