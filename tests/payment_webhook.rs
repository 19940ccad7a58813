mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::{TestApp, body_json, json_request, order_row, postgres};
use sea_orm::DbErr;
use serde_json::json;
use storefront_api::{
    dto::{orders::ReconcileOutcome, webhook::WebhookEvent},
    entity::orders::{self, OrderStatus},
    services::order_service,
};
use tower::ServiceExt;

const WEBHOOK: &str = "/api/webhooks/payment";

fn paid(order_id: &str) -> serde_json::Value {
    json!({ "event": "payment.success", "data": { "id": order_id } })
}

#[tokio::test]
async fn payment_success_marks_pending_order_paid() {
    let app = TestApp::new(
        postgres().append_query_results([vec![order_row("ORD123", OrderStatus::Paid)]]),
    );

    let response = app
        .router()
        .oneshot(json_request("POST", WEBHOOK, &paid("ORD123")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));

    let statements = app.statements();
    assert_eq!(statements.len(), 1, "exactly one update: {statements:?}");
    assert!(statements[0].contains("UPDATE"));
    assert!(statements[0].contains("ORD123"));
}

#[tokio::test]
async fn update_does_not_depend_on_prior_status() {
    let app = TestApp::new(
        postgres().append_query_results([vec![order_row("ORD123", OrderStatus::Paid)]]),
    );

    app.router()
        .oneshot(json_request("POST", WEBHOOK, &paid("ORD123")))
        .await
        .unwrap();

    let statements = app.statements();
    let where_clause = statements[0]
        .split("WHERE")
        .nth(1)
        .and_then(|rest| rest.split("RETURNING").next())
        .expect("update has a WHERE clause");
    assert!(where_clause.contains("order_id"));
    assert!(
        !where_clause.contains("status"),
        "redelivery must not be rejected by a status guard: {where_clause}"
    );
}

#[tokio::test]
async fn duplicate_delivery_is_idempotent() {
    let app = TestApp::new(postgres().append_query_results([
        vec![order_row("ORD123", OrderStatus::Paid)],
        vec![order_row("ORD123", OrderStatus::Paid)],
    ]));

    for attempt in 0..2 {
        let response = app
            .router()
            .oneshot(json_request("POST", WEBHOOK, &paid("ORD123")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "attempt {attempt}");
        assert_eq!(body_json(response).await, json!({ "success": true }));
    }

    let statements = app.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0], statements[1], "both deliveries issue the same update");
}

#[tokio::test]
async fn reconcile_returns_updated_row() {
    let app = TestApp::new(
        postgres().append_query_results([vec![order_row("ORD123", OrderStatus::Paid)]]),
    );
    let event: WebhookEvent = serde_json::from_value(paid("ORD123")).unwrap();

    let outcome = order_service::reconcile_payment(&app.state, &event)
        .await
        .expect("reconciled");

    match outcome {
        ReconcileOutcome::Reconciled(order) => {
            assert_eq!(order.status, OrderStatus::Paid);
            assert_eq!(order.payment_reference.as_deref(), Some("ORD123"));
            assert_eq!(order.items.len(), 2);
        }
        ReconcileOutcome::Ignored => panic!("payment.success must not be ignored"),
    }
}

#[tokio::test]
async fn unknown_order_is_an_error() {
    let app = TestApp::new(postgres().append_query_results([Vec::<orders::Model>::new()]));

    let response = app
        .router()
        .oneshot(json_request("POST", WEBHOOK, &paid("NOPE")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "Order not found" }));
    assert_eq!(app.statements().len(), 1, "no follow-up writes after a miss");
}

#[tokio::test]
async fn store_failure_is_reported_with_its_message() {
    let app = TestApp::new(
        postgres().append_query_errors([DbErr::Custom("connection reset by peer".into())]),
    );

    let response = app
        .router()
        .oneshot(json_request("POST", WEBHOOK, &paid("ORD123")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    let error = body["error"].as_str().expect("error message");
    assert!(error.contains("connection reset by peer"), "{error}");
}

#[tokio::test]
async fn other_events_are_acknowledged_without_writes() {
    let app = TestApp::new(postgres());

    for body in [
        json!({ "event": "payment.failed", "data": { "id": "ORD123" } }),
        json!({ "event": "refund.succeeded", "data": { "id": "ORD123" } }),
        json!({ "event": "payment.success" }),
        json!({ "event": "payment.success", "data": { "id": "" } }),
        json!({ "event": "checkout.created", "data": null }),
    ] {
        let response = app
            .router()
            .oneshot(json_request("POST", WEBHOOK, &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{body}");
        assert_eq!(body_json(response).await, json!({ "success": true }));
    }

    assert!(app.statements().is_empty());
}

#[tokio::test]
async fn unreadable_payload_is_a_failure() {
    let app = TestApp::new(postgres());

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(WEBHOOK)
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert!(app.statements().is_empty());
}
