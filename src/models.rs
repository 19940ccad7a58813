use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::entity::orders::{OrderStatus, ShippingMethod};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

/// Catalog entry. `price` is the display string entered by the admin
/// (e.g. `R427.42`), not a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price: String,
    pub category: Option<String>,
    pub soldout: bool,
    pub description: Option<String>,
    pub imageurl: Option<String>,
    pub availablesizes: Option<Vec<String>>,
    pub availablematerials: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of a cart, as carried in the checkout redirect and stored on the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub imageurl: Option<String>,
    #[serde(
        default,
        rename = "selectedSize",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_size: Option<String>,
    #[serde(
        default,
        rename = "selectedMaterial",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_material: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    pub payment_reference: Option<String>,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub shipping_method: ShippingMethod,
    pub shipping_address: Option<String>,
    pub pickup_location: Option<String>,
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
