use crate::entities::channels::MemberProfile;
use crate::models::messages::MessageView;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChannelMemberView {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub last_read_at: Option<DateTime<Utc>>,
    pub muted: bool,
}

impl From<MemberProfile> for ChannelMemberView {
    fn from(value: MemberProfile) -> Self {
        Self {
            user_id: value.user_id,
            username: value.username,
            display_name: value.display_name,
            avatar_url: value.avatar_url,
            last_read_at: value.last_read_at,
            muted: value.muted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChannelView {
    pub id: String,
    pub name: Option<String>,
    /// Resolved client-facing name; 1:1 channels have no stored name and
    /// fall back to the other member's display name.
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub members: Vec<ChannelMemberView>,
    pub last_message: Option<MessageView>,
    pub unread: bool,
    pub muted: bool,
    pub last_read_at: Option<DateTime<Utc>>,
}

impl ChannelView {
    pub fn assemble(
        id: String,
        name: Option<String>,
        created_at: DateTime<Utc>,
        viewer_id: i64,
        members: Vec<MemberProfile>,
        last_message: Option<MessageView>,
    ) -> Self {
        let display_name = match &name {
            Some(name) => name.clone(),
            None => {
                let others: Vec<&str> = members
                    .iter()
                    .filter(|member| member.user_id != viewer_id)
                    .map(|member| member.display_name.as_str())
                    .collect();
                others.join(", ")
            }
        };

        let viewer = members.iter().find(|member| member.user_id == viewer_id);
        let muted = viewer.is_some_and(|member| member.muted);
        let last_read_at = viewer.and_then(|member| member.last_read_at);
        let unread = last_message.as_ref().is_some_and(|message| {
            message.author_id != viewer_id
                && last_read_at.is_none_or(|read_at| message.created_at > read_at)
        });

        Self {
            id,
            name,
            display_name,
            created_at,
            members: members.into_iter().map(ChannelMemberView::from).collect(),
            last_message,
            unread,
            muted,
            last_read_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn member(user_id: i64, display_name: &str) -> MemberProfile {
        MemberProfile {
            channel_id: "c1".to_owned(),
            user_id,
            last_read_at: None,
            muted: false,
            username: display_name.to_lowercase(),
            display_name: display_name.to_owned(),
            avatar_url: None,
        }
    }

    fn preview(author_id: i64, created_at: DateTime<Utc>) -> MessageView {
        MessageView {
            id: 10,
            channel_id: "c1".to_owned(),
            author_id,
            content: Some("hey".to_owned()),
            created_at,
            edited_at: None,
            attachments: vec![],
        }
    }

    #[test]
    fn direct_channel_name_falls_back_to_other_member() {
        let view = ChannelView::assemble(
            "c1".to_owned(),
            None,
            Utc::now(),
            1,
            vec![member(1, "Ana"), member(2, "Bruno")],
            None,
        );
        assert_eq!(view.display_name, "Bruno");
    }

    #[test]
    fn stored_name_wins_over_fallback() {
        let view = ChannelView::assemble(
            "c1".to_owned(),
            Some("plans".to_owned()),
            Utc::now(),
            1,
            vec![member(1, "Ana"), member(2, "Bruno")],
            None,
        );
        assert_eq!(view.display_name, "plans");
    }

    #[test]
    fn unread_when_last_message_is_newer_than_watermark() {
        let now = Utc::now();
        let mut viewer = member(1, "Ana");
        viewer.last_read_at = Some(now - TimeDelta::minutes(5));
        let view = ChannelView::assemble(
            "c1".to_owned(),
            None,
            now,
            1,
            vec![viewer, member(2, "Bruno")],
            Some(preview(2, now)),
        );
        assert!(view.unread);
    }

    #[test]
    fn own_message_never_counts_as_unread() {
        let now = Utc::now();
        let view = ChannelView::assemble(
            "c1".to_owned(),
            None,
            now,
            1,
            vec![member(1, "Ana"), member(2, "Bruno")],
            Some(preview(1, now)),
        );
        assert!(!view.unread);
    }
}
