use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::orders::OrderStatusView,
    error::AppResult,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{order_id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    params(
        ("order_id" = String, Path, description = "Order ID issued at checkout")
    ),
    responses(
        (status = 200, description = "Current order status", body = ApiResponse<OrderStatusView>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderStatusView>>> {
    let resp = order_service::get_order(&state, &order_id).await?;
    Ok(Json(resp))
}
