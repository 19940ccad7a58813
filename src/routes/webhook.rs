use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    dto::{
        orders::ReconcileOutcome,
        webhook::{WebhookAck, WebhookError, WebhookEvent},
    },
    error::AppError,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/payment", post(payment_webhook))
}

/// Message reported back to the gateway for a failed notification.
fn failure_message(err: &AppError) -> String {
    match err {
        AppError::NotFound => "Order not found".to_string(),
        AppError::Persistence(db) => db.to_string(),
        other => other.to_string(),
    }
}

fn failure(error: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(WebhookError { error }),
    )
        .into_response()
}

/// Payment gateway callback.
///
/// Failures are answered with `500` and left to the gateway's redelivery;
/// nothing is retried here.
#[utoipa::path(
    post,
    path = "/api/webhooks/payment",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Processed or ignored", body = WebhookAck),
        (status = 500, description = "Order not found or update rejected", body = WebhookError),
    ),
    tag = "Webhooks"
)]
pub async fn payment_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "unreadable webhook payload");
            return failure(err.to_string());
        }
    };

    match order_service::reconcile_payment(&state, &event).await {
        Ok(ReconcileOutcome::Reconciled(order)) => {
            tracing::info!(order_id = %order.order_id, event = %event.event, "payment reconciled");
            Json(WebhookAck { success: true }).into_response()
        }
        Ok(ReconcileOutcome::Ignored) => Json(WebhookAck { success: true }).into_response(),
        Err(err) => {
            let message = failure_message(&err);
            tracing::error!(
                event = %event.event,
                order_id = event.succeeded_payment_id().unwrap_or("-"),
                error = %message,
                "webhook handler failed"
            );
            failure(message)
        }
    }
}
