use crate::entities::messages::{Attachment, Message};
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::Serialize;

pub const MAX_PAGE_SIZE: usize = 50;
pub const MAX_CONTENT_LENGTH: usize = 4096;
pub const MAX_ATTACHMENTS: usize = 10;

#[derive(Debug, Serialize)]
pub struct AttachmentView {
    pub id: String,
    pub url: String,
    pub kind: String,
    pub width: i32,
    pub height: i32,
}

impl From<Attachment> for AttachmentView {
    fn from(value: Attachment) -> Self {
        Self {
            id: value.id,
            url: value.url,
            kind: value.kind,
            width: value.width,
            height: value.height,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: u64,
    pub channel_id: String,
    pub author_id: i64,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub attachments: Vec<AttachmentView>,
}

impl MessageView {
    /// Joins a page of messages with the attachments claimed by them,
    /// preserving message order.
    pub fn hydrate(messages: Vec<Message>, attachments: Vec<Attachment>) -> Vec<MessageView> {
        let mut by_message: HashMap<u64, Vec<AttachmentView>> = HashMap::new();
        for attachment in attachments {
            if let Some(message_id) = attachment.message_id {
                by_message
                    .entry(message_id)
                    .or_default()
                    .push(AttachmentView::from(attachment));
            }
        }
        messages
            .into_iter()
            .map(|message| {
                let attachments = by_message.remove(&message.id).unwrap_or_default();
                MessageView {
                    id: message.id,
                    channel_id: message.channel_id,
                    author_id: message.author_id,
                    content: message.content,
                    created_at: message.created_at,
                    edited_at: message.edited_at,
                    attachments,
                }
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct MessagePage {
    pub data: Vec<MessageView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<u64>,
}

/// Clamps a client-supplied page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(limit: Option<usize>) -> usize {
    match limit {
        None | Some(0) => MAX_PAGE_SIZE,
        Some(limit) => limit.min(MAX_PAGE_SIZE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(id: u64) -> Message {
        Message {
            id,
            channel_id: "c1".to_owned(),
            author_id: 1,
            content: Some("hello".to_owned()),
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    fn attachment(id: &str, message_id: Option<u64>) -> Attachment {
        Attachment {
            id: id.to_owned(),
            message_id,
            uploader_id: 1,
            url: format!("https://media.example/{id}"),
            kind: "image".to_owned(),
            width: 800,
            height: 600,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hydrate_groups_attachments_by_message() {
        let messages = vec![message(1), message(2)];
        let attachments = vec![
            attachment("a", Some(1)),
            attachment("b", Some(2)),
            attachment("c", Some(2)),
        ];
        let views = MessageView::hydrate(messages, attachments);
        assert_eq!(views[0].attachments.len(), 1);
        assert_eq!(views[1].attachments.len(), 2);
    }

    #[test]
    fn hydrate_skips_detached_attachments() {
        let views = MessageView::hydrate(vec![message(1)], vec![attachment("a", None)]);
        assert!(views[0].attachments.is_empty());
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(clamp_page_size(None), 50);
        assert_eq!(clamp_page_size(Some(0)), 50);
        assert_eq!(clamp_page_size(Some(20)), 20);
        assert_eq!(clamp_page_size(Some(500)), 50);
    }
}
