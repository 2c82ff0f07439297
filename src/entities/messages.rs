use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct Message {
    pub id: u64,
    pub channel_id: String,
    pub author_id: i64,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// Attachments are created detached (`message_id` null) at upload time and
/// claimed exactly once when a message is sent.
#[derive(sqlx::FromRow)]
pub struct Attachment {
    pub id: String,
    pub message_id: Option<u64>,
    pub uploader_id: i64,
    pub url: String,
    pub kind: String,
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
}
