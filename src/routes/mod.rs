use axum::{Router, extract::DefaultBodyLimit};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod doc;
pub mod health;
pub mod orders;
pub mod products;
pub mod webhook;

/// Product images are uploaded through the admin routes.
pub const ADMIN_BODY_LIMIT: usize = 10 * 1024 * 1024;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .nest("/checkout", checkout::router())
        .nest("/webhooks", webhook::router())
        .nest(
            "/admin",
            admin::router().layer(DefaultBodyLimit::max(ADMIN_BODY_LIMIT)),
        )
}
