use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const KIND_WEB_PUSH: &str = "web-push";

#[derive(sqlx::FromRow)]
pub struct NotificationEndpoint {
    pub id: String,
    pub user_id: i64,
    pub kind: String,
    pub subscription: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Browser push subscription as handed over by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebPushSubscription {
    pub endpoint: String,
    pub keys: WebPushKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebPushKeys {
    pub p256dh: String,
    pub auth: String,
}
