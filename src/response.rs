use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Envelope metadata. Lists here are never paginated, so only the row count
/// travels with them.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    pub served_at: DateTime<Utc>,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            total: None,
            served_at: Utc::now(),
        }
    }

    /// Meta for a full, unpaginated list.
    pub fn list(total: usize) -> Self {
        Self {
            total: Some(total),
            ..Self::now()
        }
    }
}

/// Envelope shared by every JSON endpoint except the payment webhook,
/// whose shape is fixed by the gateway.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    /// Same as [`ApiResponse::success`] with a list count attached.
    pub fn listed(message: impl Into<String>, data: T, total: usize) -> Self {
        Self::success(message, data, Some(Meta::list(total)))
    }
}
