use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    confirmation::{Confirmation, SuccessParams},
    error::AppResult,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/success", get(success))
}

#[utoipa::path(
    get,
    path = "/api/checkout/success",
    params(SuccessParams),
    responses(
        (status = 200, description = "Order summary, or a processing notice when no order parameters were given", body = ApiResponse<Confirmation>),
    ),
    tag = "Checkout"
)]
pub async fn success(
    State(state): State<AppState>,
    Query(params): Query<SuccessParams>,
) -> AppResult<Json<ApiResponse<Confirmation>>> {
    let resp = order_service::confirmation(&state, params, chrono::Utc::now()).await?;
    Ok(Json(resp))
}
