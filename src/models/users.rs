use crate::entities::users::User as UserEntity;
use bitflags::bitflags;
use chrono::{DateTime, Utc};

bitflags! {
    /// Per-user opt-ins for push notifications. Chat-message pushes are
    /// always eligible and gated only by mute/block/recent-read checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PushPreferences: i64 {
        const REPLY = 1;
        const MENTION = 1 << 1;
        const FOLLOW = 1 << 2;
        const LIKE = 1 << 3;
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub suspended: bool,
    pub preferences: PushPreferences,
    pub notifications_last_read_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for User {
    fn from(value: UserEntity) -> Self {
        Self {
            user_id: value.id,
            username: value.username,
            display_name: value.display_name,
            avatar_url: value.avatar_url,
            suspended: value.suspended,
            preferences: PushPreferences::from_bits_retain(value.push_preferences),
            notifications_last_read_at: value.notifications_last_read_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_preference_bits_are_retained() {
        let prefs = PushPreferences::from_bits_retain(0b1_1001);
        assert!(prefs.contains(PushPreferences::REPLY));
        assert!(prefs.contains(PushPreferences::LIKE));
        assert!(!prefs.contains(PushPreferences::MENTION));
    }
}
