use crate::entities::notifications::{FollowRow, LikeRow, MentionRow, ReplyRow};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// At most this many events are returned per feed fetch.
pub const FEED_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// The four heterogeneous notification sources, merged into one
/// time-ordered feed. The `type` discriminant drives client rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    Like {
        actor: Actor,
        post_id: u64,
        created_at: DateTime<Utc>,
    },
    Follow {
        actor: Actor,
        created_at: DateTime<Utc>,
    },
    Reply {
        actor: Actor,
        post_id: u64,
        reply_id: u64,
        created_at: DateTime<Utc>,
    },
    Mention {
        actor: Actor,
        post_id: u64,
        created_at: DateTime<Utc>,
    },
}

impl NotificationEvent {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            NotificationEvent::Like { created_at, .. }
            | NotificationEvent::Follow { created_at, .. }
            | NotificationEvent::Reply { created_at, .. }
            | NotificationEvent::Mention { created_at, .. } => *created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub event: NotificationEvent,
    pub read: bool,
}

#[derive(Debug, Serialize)]
pub struct NotificationsFeed {
    pub unread_count: usize,
    pub notifications: Vec<NotificationView>,
    pub last_read_at: Option<DateTime<Utc>>,
}

/// Merges pre-fetched events into the final feed. Read/unread is derived
/// from the user's single watermark timestamp; a null watermark means the
/// user has never marked notifications read and sees everything as unread.
pub fn build_feed(
    mut events: Vec<NotificationEvent>,
    watermark: Option<DateTime<Utc>>,
) -> NotificationsFeed {
    events.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

    let unread_count = events
        .iter()
        .filter(|event| !is_read(event.created_at(), watermark))
        .count();

    let notifications = events
        .into_iter()
        .take(FEED_LIMIT)
        .map(|event| {
            let read = is_read(event.created_at(), watermark);
            NotificationView { event, read }
        })
        .collect();

    NotificationsFeed {
        unread_count,
        notifications,
        last_read_at: watermark,
    }
}

fn is_read(created_at: DateTime<Utc>, watermark: Option<DateTime<Utc>>) -> bool {
    watermark.is_some_and(|watermark| created_at <= watermark)
}

fn actor(user_id: i64, username: String, display_name: String, avatar_url: Option<String>) -> Actor {
    Actor {
        user_id,
        username,
        display_name,
        avatar_url,
    }
}

impl From<LikeRow> for NotificationEvent {
    fn from(value: LikeRow) -> Self {
        NotificationEvent::Like {
            actor: actor(
                value.actor_id,
                value.actor_username,
                value.actor_display_name,
                value.actor_avatar_url,
            ),
            post_id: value.post_id,
            created_at: value.created_at,
        }
    }
}

impl From<FollowRow> for NotificationEvent {
    fn from(value: FollowRow) -> Self {
        NotificationEvent::Follow {
            actor: actor(
                value.actor_id,
                value.actor_username,
                value.actor_display_name,
                value.actor_avatar_url,
            ),
            created_at: value.created_at,
        }
    }
}

impl From<ReplyRow> for NotificationEvent {
    fn from(value: ReplyRow) -> Self {
        NotificationEvent::Reply {
            actor: actor(
                value.actor_id,
                value.actor_username,
                value.actor_display_name,
                value.actor_avatar_url,
            ),
            post_id: value.post_id,
            reply_id: value.reply_id,
            created_at: value.created_at,
        }
    }
}

impl From<MentionRow> for NotificationEvent {
    fn from(value: MentionRow) -> Self {
        NotificationEvent::Mention {
            actor: actor(
                value.actor_id,
                value.actor_username,
                value.actor_display_name,
                value.actor_avatar_url,
            ),
            post_id: value.post_id,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn event(kind: u8, created_at: DateTime<Utc>) -> NotificationEvent {
        let actor = Actor {
            user_id: 2,
            username: "bruno".to_owned(),
            display_name: "Bruno".to_owned(),
            avatar_url: None,
        };
        match kind {
            0 => NotificationEvent::Like {
                actor,
                post_id: 1,
                created_at,
            },
            1 => NotificationEvent::Follow { actor, created_at },
            2 => NotificationEvent::Reply {
                actor,
                post_id: 1,
                reply_id: 2,
                created_at,
            },
            _ => NotificationEvent::Mention {
                actor,
                post_id: 1,
                created_at,
            },
        }
    }

    #[test]
    fn null_watermark_reports_everything_unread() {
        let now = Utc::now();
        let feed = build_feed(vec![event(0, now), event(1, now), event(3, now)], None);
        assert_eq!(feed.unread_count, 3);
        assert!(feed.notifications.iter().all(|n| !n.read));
    }

    #[test]
    fn feed_is_sorted_descending() {
        let now = Utc::now();
        let feed = build_feed(
            vec![
                event(0, now - TimeDelta::minutes(3)),
                event(2, now),
                event(1, now - TimeDelta::minutes(1)),
            ],
            None,
        );
        let times: Vec<_> = feed
            .notifications
            .iter()
            .map(|n| n.event.created_at())
            .collect();
        assert!(times.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn events_at_the_watermark_count_as_read() {
        let now = Utc::now();
        let feed = build_feed(
            vec![event(0, now), event(1, now + TimeDelta::seconds(1))],
            Some(now),
        );
        assert_eq!(feed.unread_count, 1);
        assert!(feed.notifications.iter().any(|n| n.read));
    }

    #[test]
    fn type_discriminant_is_serialized() {
        let encoded = serde_json::to_value(event(2, Utc::now())).unwrap();
        assert_eq!(encoded["type"], "reply");
        assert_eq!(encoded["reply_id"], 2);
    }
}
