use crate::common::broadcaster::{Broadcaster, Topic};
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::channels::MemberProfile;
use crate::entities::jobs::UnfurlJob;
use crate::models::messages::{
    MAX_ATTACHMENTS, MAX_CONTENT_LENGTH, MessagePage, MessageView, clamp_page_size,
};
use crate::models::users::User;
use crate::repositories::jobs::QueueName;
use crate::repositories::{attachments, blocks, channels, jobs, messages, rate_limits, users};
use crate::usecases::channels::require_membership;
use crate::usecases::notifications::{self, PushKind};
use chrono::{TimeDelta, Utc};
use serde_json::json;
use std::time::Duration;

const SEND_RATE: i64 = 10;
const SEND_RATE_WINDOW: Duration = Duration::from_secs(10);

/// A member who read the channel within this window is assumed to be
/// looking at it, so a push would only be noise.
const READ_DEBOUNCE_SECONDS: i64 = 15;

pub struct SendArgs {
    pub channel_id: String,
    pub content: Option<String>,
    pub attachment_ids: Vec<String>,
}

pub async fn fetch_page<C: Context>(
    ctx: &C,
    user_id: i64,
    channel_id: &str,
    cursor: Option<u64>,
    limit: Option<usize>,
) -> ServiceResult<MessagePage> {
    require_membership(ctx, channel_id, user_id).await?;

    let limit = clamp_page_size(limit);
    let page = match messages::fetch_page(ctx, channel_id, cursor, limit).await {
        Ok(page) => page,
        Err(e) => return unexpected(e),
    };
    let next_cursor = match page.len() == limit {
        true => page.last().map(|message| message.id),
        false => None,
    };

    let message_ids: Vec<u64> = page.iter().map(|message| message.id).collect();
    let page_attachments = attachments::fetch_for_messages(ctx, &message_ids).await?;
    Ok(MessagePage {
        data: MessageView::hydrate(page, page_attachments),
        next_cursor,
    })
}

/// Validates and persists a message, then fans out: real-time broadcast to
/// the channel topic and each member's badge topic, plus one push job per
/// eligible member.
pub async fn send<C: Context>(ctx: &C, sender: &User, args: SendArgs) -> ServiceResult<()> {
    require_membership(ctx, &args.channel_id, sender.user_id).await?;

    let content = args
        .content
        .as_deref()
        .map(str::trim)
        .filter(|content| !content.is_empty());
    validate_payload(content, args.attachment_ids.len())?;

    let sent_recently = rate_limits::hit(ctx, "messages", sender.user_id, SEND_RATE_WINDOW).await?;
    if sent_recently > SEND_RATE {
        return Err(AppError::MessagesRateLimited);
    }

    // The one place an all-or-nothing guarantee matters: a message must
    // never exist without its claimed attachments, nor attachments end up
    // claimed without a message.
    let created_at = Utc::now();
    let mut tx = ctx.db().begin().await?;
    let message_id = messages::create(
        &mut *tx,
        &args.channel_id,
        sender.user_id,
        content,
        created_at,
    )
    .await?;
    let claimed = attachments::claim(
        &mut *tx,
        message_id,
        sender.user_id,
        &args.attachment_ids,
    )
    .await?;
    if claimed != args.attachment_ids.len() as u64 {
        tx.rollback().await?;
        return Err(AppError::MessagesInvalidAttachments);
    }
    tx.commit().await?;

    let members = channels::fetch_member_profiles(ctx, &args.channel_id).await?;
    let mut visible: Vec<&MemberProfile> = Vec::with_capacity(members.len());
    for member in &members {
        if member.user_id != sender.user_id
            && blocks::is_blocked_either(ctx, sender.user_id, member.user_id).await?
        {
            continue;
        }
        visible.push(member);
    }

    let visible_ids: Vec<i64> = visible.iter().map(|member| member.user_id).collect();
    broadcast_message(
        ctx.broadcaster(),
        &args.channel_id,
        message_id,
        sender.user_id,
        &visible_ids,
    );

    fan_out_pushes(ctx, sender, &args.channel_id, content, created_at, &visible).await?;

    if let Some(url) = content.and_then(first_url) {
        jobs::enqueue(ctx, QueueName::Unfurl, &UnfurlJob { url: url.to_owned() }).await?;
    }
    Ok(())
}

/// One channel event for open chat views, one badge event per member. Badge
/// events go to per-user topics and carry no message text, so no socket ever
/// sees activity outside its own conversations.
fn broadcast_message(
    broadcaster: &Broadcaster,
    channel_id: &str,
    message_id: u64,
    sender_id: i64,
    member_ids: &[i64],
) {
    broadcaster.publish(
        Topic::Channel(channel_id),
        "message",
        Some(message_id),
        json!({ "from": sender_id }),
    );
    for &member_id in member_ids {
        broadcaster.publish(
            Topic::User(member_id),
            "message",
            Some(message_id),
            json!({ "channel_id": channel_id, "from": sender_id }),
        );
    }
}

async fn fan_out_pushes<C: Context>(
    ctx: &C,
    sender: &User,
    channel_id: &str,
    content: Option<&str>,
    sent_at: chrono::DateTime<Utc>,
    members: &[&MemberProfile],
) -> ServiceResult<()> {
    let debounce_floor = sent_at - TimeDelta::seconds(READ_DEBOUNCE_SECONDS);

    let mut recipient_ids = vec![];
    for member in members {
        if member.user_id == sender.user_id || member.muted {
            continue;
        }
        if member
            .last_read_at
            .is_some_and(|read_at| read_at > debounce_floor)
        {
            continue;
        }
        recipient_ids.push(member.user_id);
    }

    let body = match content {
        Some(content) => content.to_owned(),
        None => "Sent an attachment".to_owned(),
    };
    let url = format!("/messages/{channel_id}");
    for recipient in users::fetch_many(ctx, &recipient_ids).await? {
        let recipient = User::from(recipient);
        notifications::push_to_user(
            ctx,
            &recipient,
            PushKind::Message,
            &sender.display_name,
            &body,
            Some(&url),
        )
        .await?;
    }
    Ok(())
}

fn validate_payload(content: Option<&str>, attachment_count: usize) -> ServiceResult<()> {
    match content {
        None if attachment_count == 0 => return Err(AppError::MessagesEmpty),
        Some(content) if content.chars().count() > MAX_CONTENT_LENGTH => {
            return Err(AppError::MessagesInvalidLength);
        }
        _ => {}
    }
    if attachment_count > MAX_ATTACHMENTS {
        return Err(AppError::MessagesTooManyAttachments);
    }
    Ok(())
}

/// First http(s) link in the message text, if any; feeds the unfurl queue.
fn first_url(content: &str) -> Option<&str> {
    content
        .split_whitespace()
        .find(|word| word.starts_with("http://") || word.starts_with("https://"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            validate_payload(None, 0),
            Err(AppError::MessagesEmpty)
        ));
    }

    #[test]
    fn attachments_without_text_are_enough() {
        assert!(validate_payload(None, 1).is_ok());
    }

    #[test]
    fn eleventh_attachment_is_rejected() {
        assert!(validate_payload(Some("hi"), 10).is_ok());
        assert!(matches!(
            validate_payload(Some("hi"), 11),
            Err(AppError::MessagesTooManyAttachments)
        ));
    }

    #[test]
    fn oversized_content_is_rejected() {
        let content = "a".repeat(MAX_CONTENT_LENGTH + 1);
        assert!(matches!(
            validate_payload(Some(&content), 0),
            Err(AppError::MessagesInvalidLength)
        ));
    }

    #[tokio::test]
    async fn badge_events_are_scoped_to_members_and_carry_no_text() {
        let broadcaster = Broadcaster::new();
        let mut rx = broadcaster.subscribe();
        broadcast_message(&broadcaster, "c1", 9, 1, &[1, 2]);

        let channel_event = rx.recv().await.unwrap();
        assert_eq!(channel_event.topic, "messages:c1");

        for expected_topic in ["messages:user:1", "messages:user:2"] {
            let badge = rx.recv().await.unwrap();
            assert_eq!(badge.topic, expected_topic);
            assert_eq!(badge.payload["channel_id"], "c1");
            assert!(badge.payload.get("content").is_none());
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn first_url_finds_links_mid_sentence() {
        assert_eq!(
            first_url("check this https://example.com/a out"),
            Some("https://example.com/a")
        );
        assert_eq!(first_url("no links here"), None);
    }
}
