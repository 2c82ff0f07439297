use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct LikeRow {
    pub actor_id: i64,
    pub actor_username: String,
    pub actor_display_name: String,
    pub actor_avatar_url: Option<String>,
    pub post_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct FollowRow {
    pub actor_id: i64,
    pub actor_username: String,
    pub actor_display_name: String,
    pub actor_avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct ReplyRow {
    pub actor_id: i64,
    pub actor_username: String,
    pub actor_display_name: String,
    pub actor_avatar_url: Option<String>,
    pub post_id: u64,
    pub reply_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct MentionRow {
    pub actor_id: i64,
    pub actor_username: String,
    pub actor_display_name: String,
    pub actor_avatar_url: Option<String>,
    pub post_id: u64,
    pub created_at: DateTime<Utc>,
}
