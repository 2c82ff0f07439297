use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct Channel {
    pub id: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct ChannelMember {
    pub channel_id: String,
    pub user_id: i64,
    pub last_read_at: Option<DateTime<Utc>>,
    pub muted: bool,
}

/// Row of the channel-list query, ordered by most recent message.
#[derive(sqlx::FromRow)]
pub struct ChannelWithActivity {
    pub id: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_id: u64,
}

/// Channel member joined with the owning user's public profile.
#[derive(sqlx::FromRow)]
pub struct MemberProfile {
    pub channel_id: String,
    pub user_id: i64,
    pub last_read_at: Option<DateTime<Utc>>,
    pub muted: bool,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
