use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub suspended: bool,
    pub push_preferences: i64,
    pub notifications_last_read_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}
