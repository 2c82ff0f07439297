use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::channels::{Channel, ChannelMember};
use crate::models::channels::ChannelView;
use crate::models::messages::MessageView;
use crate::repositories::{attachments, blocks, channels, messages, users};

/// Returns the existing 1:1 channel for the pair or creates one. Idempotent
/// under calls from either side; both orders resolve to the same row.
pub async fn find_or_create_direct<C: Context>(
    ctx: &C,
    user_id: i64,
    target_id: i64,
) -> ServiceResult<Channel> {
    if target_id == user_id {
        return Err(AppError::ChannelsInvalidTarget);
    }
    match users::fetch_one(ctx, target_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(AppError::UsersNotFound),
        Err(e) => return unexpected(e),
    }
    if blocks::is_blocked_either(ctx, user_id, target_id).await? {
        return Err(AppError::InteractionBlocked);
    }

    match channels::find_direct(ctx, user_id, target_id).await {
        Ok(Some(channel)) => Ok(channel),
        Ok(None) => match channels::create_direct(ctx, user_id, target_id).await {
            Ok(channel) => Ok(channel),
            Err(e) => unexpected(e),
        },
        Err(e) => unexpected(e),
    }
}

/// Channel list for the conversation overview: most recent activity first,
/// hydrated with members and a last-message preview.
pub async fn fetch_for_user<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<Vec<ChannelView>> {
    let active = match channels::fetch_active_for_user(ctx, user_id).await {
        Ok(active) => active,
        Err(e) => return unexpected(e),
    };

    let mut views = Vec::with_capacity(active.len());
    for channel in active {
        let members = channels::fetch_member_profiles(ctx, &channel.id).await?;
        let last_message = match messages::fetch_one_by_id(ctx, channel.last_message_id).await? {
            Some(message) => {
                let message_attachments =
                    attachments::fetch_for_messages(ctx, &[message.id]).await?;
                MessageView::hydrate(vec![message], message_attachments).pop()
            }
            None => None,
        };
        views.push(ChannelView::assemble(
            channel.id,
            channel.name,
            channel.created_at,
            user_id,
            members,
            last_message,
        ));
    }
    Ok(views)
}

/// Fails with `channels.not_member` when the channel exists but the user
/// does not belong to it, and `channels.not_found` when it does not exist.
pub async fn require_membership<C: Context>(
    ctx: &C,
    channel_id: &str,
    user_id: i64,
) -> ServiceResult<ChannelMember> {
    match channels::fetch_member(ctx, channel_id, user_id).await {
        Ok(Some(member)) => Ok(member),
        Ok(None) => match channels::fetch_one(ctx, channel_id).await {
            Ok(Some(_)) => Err(AppError::ChannelsNotMember),
            Ok(None) => Err(AppError::ChannelsNotFound),
            Err(e) => unexpected(e),
        },
        Err(e) => unexpected(e),
    }
}

pub async fn mark_read<C: Context>(ctx: &C, channel_id: &str, user_id: i64) -> ServiceResult<()> {
    require_membership(ctx, channel_id, user_id).await?;
    match channels::mark_read(ctx, channel_id, user_id, chrono::Utc::now()).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Mute suppresses push notifications for this member only; real-time
/// delivery and read counts are unaffected.
pub async fn set_muted<C: Context>(
    ctx: &C,
    channel_id: &str,
    user_id: i64,
    muted: bool,
) -> ServiceResult<()> {
    require_membership(ctx, channel_id, user_id).await?;
    match channels::set_muted(ctx, channel_id, user_id, muted).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

pub async fn unread_count<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<i64> {
    match channels::unread_channel_count(ctx, user_id).await {
        Ok(count) => Ok(count),
        Err(e) => unexpected(e),
    }
}
