use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const PAYMENT_SUCCEEDED: &str = "payment.success";

/// Notification posted by the payment gateway.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

/// Gateway payload. Only the transaction id is read; other fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookData {
    #[serde(default)]
    pub id: Option<String>,
}

impl WebhookEvent {
    /// Transaction id when this is a successful payment carrying one.
    pub fn succeeded_payment_id(&self) -> Option<&str> {
        if self.event != PAYMENT_SUCCEEDED {
            return None;
        }
        self.data
            .as_ref()
            .and_then(|data| data.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookError {
    pub error: String,
}
