#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, Response},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use storefront_api::{
    config::{AppConfig, StorageConfig},
    entity::{
        admins, audit_logs,
        orders::{self, OrderStatus, ShippingMethod},
        products,
    },
    services::auth_service::issue_token,
    state::AppState,
    storage::{ObjectStorage, StorageError},
};
use uuid::Uuid;

pub const PUBLIC_BASE: &str = "http://localhost:3000";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        storage: StorageConfig::Local {
            dir: std::env::temp_dir().join(format!("storefront-test-{}", Uuid::new_v4())),
            public_base_url: PUBLIC_BASE.into(),
        },
    }
}

/// In-memory bucket so tests can see what was uploaded and removed.
#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{PUBLIC_BASE}/media/{key}")
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&format!("{PUBLIC_BASE}/media/"))
            .map(str::to_string)
    }
}

pub struct TestApp {
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
}

impl TestApp {
    pub fn new(mock: MockDatabase) -> Self {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::new(mock.into_connection(), storage.clone(), test_config());
        Self { state, storage }
    }

    pub fn router(&self) -> axum::Router {
        storefront_api::app::build_app(self.state.clone())
    }

    /// SQL statements the app ran against the mock since the last call, in order.
    pub fn statements(&self) -> Vec<String> {
        // `get_mocker_mutex` is crate-private in sea-orm; drain through the
        // public `into_transaction_log` on a second handle to the same mock.
        let mock = match self.state.db() {
            DatabaseConnection::MockDatabaseConnection(mock) => mock.clone(),
            _ => panic!("Not mock connection"),
        };
        DatabaseConnection::MockDatabaseConnection(mock)
            .into_transaction_log()
            .into_iter()
            .map(|txn| format!("{txn:?}"))
            .collect()
    }

    pub fn bearer(&self, user_id: Uuid, email: &str) -> String {
        let token = issue_token(&self.state.config, user_id, email).expect("token");
        format!("Bearer {token}")
    }
}

pub fn postgres() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn order_row(order_id: &str, status: OrderStatus) -> orders::Model {
    let now = Utc::now().into();
    orders::Model {
        order_id: order_id.to_string(),
        status,
        payment_reference: match status {
            OrderStatus::Paid => Some(order_id.to_string()),
            OrderStatus::Pending => None,
        },
        customer_name: "Thandi Mokoena".into(),
        email: "thandi@example.com".into(),
        phone: Some("0820000000".into()),
        shipping_method: ShippingMethod::Delivery,
        shipping_address: Some("12 Long Street, Cape Town".into()),
        pickup_location: None,
        amount: Some(Decimal::new(325, 0)),
        items: serde_json::json!([
            { "id": "tee", "name": "Custom Tee", "price": 100, "quantity": 2, "imageurl": "" },
            { "id": "print", "name": "Classic Print", "price": 50, "quantity": 1, "imageurl": "" }
        ]),
        created_at: now,
        updated_at: now,
    }
}

pub fn product_row(name: &str, category: Option<&str>, imageurl: Option<String>) -> products::Model {
    let now = Utc::now().into();
    products::Model {
        id: Uuid::new_v4(),
        slug: storefront_api::catalog::slugify(name),
        name: name.to_string(),
        price: "R427.42".into(),
        category: category.map(str::to_string),
        soldout: false,
        description: None,
        imageurl,
        availablesizes: Some(vec!["S".into(), "M".into()]),
        availablematerials: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn admin_row(id: Uuid) -> admins::Model {
    admins::Model {
        id,
        full_name: Some("Store Admin".into()),
        created_at: Utc::now().into(),
    }
}

pub fn audit_row(user_id: Uuid, action: &str) -> audit_logs::Model {
    audit_logs::Model {
        id: Uuid::new_v4(),
        user_id: Some(user_id),
        action: action.to_string(),
        resource: Some("products".into()),
        metadata: None,
        created_at: Utc::now().into(),
    }
}

pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("storefront-media-{}", Uuid::new_v4()))
}
