mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use chrono::{TimeZone, Utc};
use common::{TestApp, body_json, order_row, postgres};
use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde_json::json;
use storefront_api::{
    confirmation::{
        self, Confirmation, FLAT_SHIPPING_FEE, MalformedInput, SuccessParams, SummarySource,
    },
    entity::orders::{self, OrderStatus},
    models::LineItem,
};
use tower::ServiceExt;

fn item(id: &str, price: i64, quantity: u32) -> LineItem {
    LineItem {
        id: id.to_string(),
        name: id.to_string(),
        price: Decimal::new(price, 0),
        quantity,
        imageurl: None,
        selected_size: None,
        selected_material: None,
    }
}

fn encoded(items: &serde_json::Value) -> String {
    urlencoding::encode(&items.to_string()).into_owned()
}

fn delivery_params(cart: &serde_json::Value) -> SuccessParams {
    SuccessParams {
        order_id: Some("ORD123".into()),
        amount: Some("325.00".into()),
        email: Some("thandi@example.com".into()),
        customer_name: Some("Thandi Mokoena".into()),
        shipping_method: Some("delivery".into()),
        shipping_address: Some("12 Long Street".into()),
        cart_items: Some(encoded(cart)),
        ..Default::default()
    }
}

fn summary(view: Confirmation) -> confirmation::OrderSummary {
    match view {
        Confirmation::Summary(summary) => summary,
        Confirmation::Processing(_) => panic!("expected a summary"),
    }
}

#[test]
fn small_delivery_order_pays_flat_shipping() {
    let cart = json!([
        { "id": "a", "name": "Tee", "price": 100, "quantity": 2 },
        { "id": "b", "name": "Print", "price": 50, "quantity": 1 }
    ]);
    let view = summary(confirmation::reconstruct(&delivery_params(&cart), Utc::now()));

    assert_eq!(view.source, SummarySource::RedirectParams);
    assert_eq!(view.subtotal, Decimal::new(250, 0));
    assert_eq!(view.shipping, FLAT_SHIPPING_FEE);
    assert_eq!(view.total, Decimal::new(325, 0));
    assert_eq!(view.greeting_name, "Thandi");
    assert!(!view.is_pickup);
}

#[test]
fn delivery_reaching_threshold_ships_free() {
    let cart = json!([
        { "id": "a", "name": "Tee", "price": 100, "quantity": 2 },
        { "id": "b", "name": "Print", "price": 50, "quantity": 1 },
        { "id": "c", "name": "Hoodie", "price": 300, "quantity": 1 }
    ]);
    let view = summary(confirmation::reconstruct(&delivery_params(&cart), Utc::now()));

    assert_eq!(view.subtotal, Decimal::new(550, 0));
    assert_eq!(view.shipping, Decimal::ZERO);
    assert_eq!(view.total, Decimal::new(550, 0));
}

#[test]
fn shipping_threshold_is_inclusive() {
    assert_eq!(
        confirmation::shipping_fee(Decimal::new(500, 0), "delivery"),
        Decimal::ZERO
    );
    assert_eq!(
        confirmation::shipping_fee(Decimal::new(49999, 2), "delivery"),
        FLAT_SHIPPING_FEE
    );
}

#[test]
fn pickup_never_pays_shipping() {
    let params = SuccessParams {
        order_id: Some("ORD9".into()),
        customer_name: Some("Sipho".into()),
        shipping_method: Some("pickup".into()),
        pickup_location: Some("Village studio".into()),
        cart_items: Some(encoded(&json!([
            { "id": "a", "name": "Tee", "price": 10, "quantity": 1 }
        ]))),
        ..Default::default()
    };
    let view = summary(confirmation::reconstruct(&params, Utc::now()));

    assert!(view.is_pickup);
    assert_eq!(view.pickup_location, "Village studio");
    assert_eq!(view.shipping, Decimal::ZERO);
    assert_eq!(view.total, Decimal::new(10, 0));
}

#[test]
fn subtotal_multiplies_price_by_quantity() {
    let items = vec![item("a", 100, 2), item("b", 50, 1), item("c", 0, 7)];
    assert_eq!(confirmation::subtotal(&items).unwrap(), Decimal::new(250, 0));
    assert_eq!(confirmation::subtotal(&[]).unwrap(), Decimal::ZERO);
}

#[test]
fn malformed_cart_items_degrade_to_empty_list() {
    let params = SuccessParams {
        order_id: Some("ORD123".into()),
        shipping_method: Some("delivery".into()),
        cart_items: Some("%7Bnot-json".into()),
        ..Default::default()
    };
    let view = summary(confirmation::reconstruct(&params, Utc::now()));

    assert!(view.items.is_empty());
    assert_eq!(view.subtotal, Decimal::ZERO);
    assert_eq!(view.shipping, FLAT_SHIPPING_FEE);
    assert_eq!(view.total, FLAT_SHIPPING_FEE);
}

#[test]
fn parse_reports_what_was_wrong() {
    assert!(matches!(
        confirmation::parse_cart_items("%7B%22id%22"),
        Err(MalformedInput::Json(_))
    ));
    assert!(matches!(
        confirmation::parse_cart_items("%FF%FE"),
        Err(MalformedInput::Encoding(_))
    ));
}

#[test]
fn cart_items_may_arrive_already_decoded() {
    let raw = r#"[{"id":"a","name":"Tee","price":"99.50","quantity":2}]"#;
    let items = confirmation::parse_cart_items(raw).expect("plain json");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].price, Decimal::new(9950, 2));

    let double = urlencoding::encode(&encoded(&json!([
        { "id": "a", "name": "Tee", "price": 1, "quantity": 1 }
    ])))
    .into_owned();
    // One layer is removed by the query parser, the second here.
    let once = urlencoding::decode(&double).unwrap().into_owned();
    assert_eq!(confirmation::parse_cart_items(&once).unwrap().len(), 1);
}

#[test]
fn no_parameters_means_still_processing() {
    match confirmation::reconstruct(&SuccessParams::default(), Utc::now()) {
        Confirmation::Processing(notice) => {
            assert_eq!(notice.order_status_link, confirmation::ORDER_STATUS_LINK);
            assert_eq!(notice.home_link, confirmation::HOME_LINK);
        }
        Confirmation::Summary(_) => panic!("nothing to summarize"),
    }
}

#[test]
fn variant_label_needs_both_choices() {
    let cart = json!([
        { "id": "a", "name": "Tee", "price": 100, "quantity": 1,
          "selectedSize": "M", "selectedMaterial": "Cotton" },
        { "id": "b", "name": "Tee", "price": 100, "quantity": 1, "selectedSize": "L" }
    ]);
    let view = summary(confirmation::reconstruct(&delivery_params(&cart), Utc::now()));

    assert_eq!(view.items[0].variant.as_deref(), Some("M / Cotton"));
    assert_eq!(view.items[1].variant, None);
    assert_eq!(view.items[0].line_total, Decimal::new(100, 0));
}

#[test]
fn placed_at_is_the_render_time_for_redirect_summaries() {
    let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
    let view = summary(confirmation::reconstruct(
        &delivery_params(&json!([])),
        now,
    ));
    assert_eq!(view.placed_at, now);
}

#[tokio::test]
async fn stored_order_wins_over_redirect_params() {
    let app = TestApp::new(
        postgres().append_query_results([vec![order_row("ORD123", OrderStatus::Paid)]]),
    );

    // The redirect claims a different cart; the row is what gets summarized.
    let cart = encoded(&json!([{ "id": "x", "name": "Bogus", "price": 1, "quantity": 1 }]));
    let uri = format!(
        "/api/checkout/success?orderId=ORD123&email=Thandi%40Example.com&amount=1&shipping_method=pickup&cartItems={}",
        urlencoding::encode(&cart)
    );
    let response = app
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["state"], "summary");
    assert_eq!(data["source"], "order_record");
    assert_eq!(data["status"], "paid");
    assert_eq!(data["shipping_method"], "delivery");
    assert_eq!(data["subtotal"], "250");
    assert_eq!(data["shipping"], "75");
    assert_eq!(data["total"], "325");
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["shipping_address"], "12 Long Street, Cape Town");
}

#[tokio::test]
async fn falls_back_to_redirect_params_when_order_is_unknown() {
    let app = TestApp::new(postgres().append_query_results([Vec::<orders::Model>::new()]));

    let cart = encoded(&json!([
        { "id": "a", "name": "Tee", "price": 100, "quantity": 2 },
        { "id": "b", "name": "Print", "price": 50, "quantity": 1 }
    ]));
    let uri = format!(
        "/api/checkout/success?orderId=ORD404&customer_name=Thandi%20Mokoena&shipping_method=delivery&cartItems={cart}"
    );
    let response = app
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["source"], "redirect_params");
    assert_eq!(data["status"], serde_json::Value::Null);
    assert_eq!(data["greeting_name"], "Thandi");
    assert_eq!(data["total"], "325");
    assert_eq!(app.statements().len(), 1);
}

#[tokio::test]
async fn without_order_id_the_store_is_not_consulted() {
    let app = TestApp::new(postgres());

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/checkout/success")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], "processing");
    assert!(app.statements().is_empty());
}

#[test]
fn oversized_prices_degrade_to_empty_cart() {
    let cart = json!([
        { "id": "a", "name": "Tee", "price": "79228162514264337593543950335", "quantity": 2 }
    ]);
    let view = summary(confirmation::reconstruct(&delivery_params(&cart), Utc::now()));

    assert!(view.items.is_empty());
    assert_eq!(view.subtotal, Decimal::ZERO);
    assert_eq!(view.total, FLAT_SHIPPING_FEE);

    let items = vec![LineItem {
        price: Decimal::MAX,
        ..item("a", 0, 2)
    }];
    assert!(matches!(
        confirmation::subtotal(&items),
        Err(MalformedInput::Overflow)
    ));
}

#[test]
fn subtotal_overflow_across_lines_is_reported() {
    let items = vec![
        LineItem {
            price: Decimal::MAX,
            ..item("a", 0, 1)
        },
        item("b", 1, 1),
    ];
    assert!(matches!(
        confirmation::subtotal(&items),
        Err(MalformedInput::Overflow)
    ));
}

#[tokio::test]
async fn failed_lookup_falls_back_to_redirect_params() {
    let app = TestApp::new(
        postgres().append_query_errors([DbErr::Custom("connection refused".into())]),
    );

    let cart = encoded(&json!([
        { "id": "a", "name": "Tee", "price": 100, "quantity": 2 },
        { "id": "b", "name": "Print", "price": 50, "quantity": 1 }
    ]));
    let uri = format!(
        "/api/checkout/success?orderId=ORD9&email=thandi%40example.com&shipping_method=delivery&cartItems={cart}"
    );
    let response = app
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["state"], "summary");
    assert_eq!(data["source"], "redirect_params");
    assert_eq!(data["order_id"], "ORD9");
    assert_eq!(data["total"], "325");
}

#[tokio::test]
async fn stored_details_need_the_order_email() {
    for query in [
        "orderId=ORD123",
        "orderId=ORD123&email=someone.else%40example.com",
    ] {
        let app = TestApp::new(
            postgres().append_query_results([vec![order_row("ORD123", OrderStatus::Paid)]]),
        );

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/checkout/success?{query}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{query}");
        let body = body_json(response).await;
        let data = &body["data"];
        assert_eq!(data["source"], "redirect_params", "{query}");
        assert_eq!(data["status"], serde_json::Value::Null);
        assert_ne!(data["email"], "thandi@example.com");
        assert_eq!(data["shipping_address"], "");
        assert_eq!(data["phone"], serde_json::Value::Null);
        assert!(data["items"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn unreadable_stored_items_degrade_to_empty() {
    let mut row = order_row("ORD7", OrderStatus::Paid);
    row.items = json!({ "not": "a list" });
    let app = TestApp::new(postgres().append_query_results([vec![row]]));

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/checkout/success?orderId=ORD7&email=thandi%40example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["source"], "order_record");
    assert_eq!(body["data"]["items"], json!([]));
}
