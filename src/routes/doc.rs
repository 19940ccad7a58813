use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    confirmation::{Confirmation, OrderSummary, ProcessingNotice, SummaryLine, SummarySource},
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        orders::OrderStatusView,
        products::{CatalogView, ProductFormSchema, ProductList},
        webhook::{WebhookAck, WebhookData, WebhookError, WebhookEvent},
    },
    models::{AdminProfile, LineItem, OrderStatus, Product, ShippingMethod, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, checkout, health, orders, products, webhook},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::list_products,
        products::get_product,
        orders::get_order,
        checkout::success,
        webhook::payment_webhook,
        admin::me,
        admin::list_products,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
    ),
    components(
        schemas(
            User,
            AdminProfile,
            Product,
            LineItem,
            OrderStatusView,
            OrderStatus,
            ShippingMethod,
            CatalogView,
            ProductList,
            ProductFormSchema,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            WebhookEvent,
            WebhookData,
            WebhookAck,
            WebhookError,
            Confirmation,
            OrderSummary,
            SummaryLine,
            SummarySource,
            ProcessingNotice,
            Meta,
            ApiResponse<Product>,
            ApiResponse<CatalogView>,
            ApiResponse<ProductList>,
            ApiResponse<OrderStatusView>,
            ApiResponse<Confirmation>,
            ApiResponse<AdminProfile>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Public catalog"),
        (name = "Orders", description = "Order status lookup"),
        (name = "Checkout", description = "Post-payment confirmation"),
        (name = "Webhooks", description = "Payment gateway callbacks"),
        (name = "Admin", description = "Product management for allow-listed admins"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
