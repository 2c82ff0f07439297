use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::endpoints::{KIND_WEB_PUSH, WebPushSubscription};
use crate::entities::jobs::PushJob;
use crate::models::notifications::{NotificationEvent, NotificationsFeed, build_feed};
use crate::models::users::{PushPreferences, User};
use crate::repositories::jobs::QueueName;
use crate::repositories::{endpoints, jobs, notifications, users};
use sha2::{Digest, Sha256};

#[derive(Copy, Clone)]
pub enum PushKind {
    /// Direct messages are always push-eligible; only mute, blocks and the
    /// read debounce suppress them.
    Message,
    Reply,
    Mention,
    Follow,
    Like,
}

impl PushKind {
    fn required_preference(self) -> Option<PushPreferences> {
        match self {
            PushKind::Message => None,
            PushKind::Reply => Some(PushPreferences::REPLY),
            PushKind::Mention => Some(PushPreferences::MENTION),
            PushKind::Follow => Some(PushPreferences::FOLLOW),
            PushKind::Like => Some(PushPreferences::LIKE),
        }
    }
}

/// Merged feed of the four notification sources, newest first, with
/// read/unread derived from the user's watermark.
pub async fn fetch_feed<C: Context>(ctx: &C, user: &User) -> ServiceResult<NotificationsFeed> {
    let mut events: Vec<NotificationEvent> = vec![];
    match notifications::fetch_likes(ctx, user.user_id).await {
        Ok(likes) => events.extend(likes.into_iter().map(NotificationEvent::from)),
        Err(e) => return unexpected(e),
    }
    match notifications::fetch_follows(ctx, user.user_id).await {
        Ok(follows) => events.extend(follows.into_iter().map(NotificationEvent::from)),
        Err(e) => return unexpected(e),
    }
    match notifications::fetch_replies(ctx, user.user_id).await {
        Ok(replies) => events.extend(replies.into_iter().map(NotificationEvent::from)),
        Err(e) => return unexpected(e),
    }
    match notifications::fetch_mentions(ctx, user.user_id).await {
        Ok(mentions) => events.extend(mentions.into_iter().map(NotificationEvent::from)),
        Err(e) => return unexpected(e),
    }
    Ok(build_feed(events, user.notifications_last_read_at))
}

/// The only write of the aggregator: advances the watermark to now. Coarse
/// by design; there is no per-notification read state.
pub async fn mark_all_read<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<()> {
    match users::advance_notifications_watermark(ctx, user_id, chrono::Utc::now()).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Enqueues a push job for the user if their preferences allow this kind.
/// Delivery itself happens in the worker process, fire-and-forget.
pub async fn push_to_user<C: Context>(
    ctx: &C,
    user: &User,
    kind: PushKind,
    title: &str,
    body: &str,
    url: Option<&str>,
) -> ServiceResult<()> {
    if let Some(required) = kind.required_preference() {
        if !user.preferences.contains(required) {
            return Ok(());
        }
    }
    let job = PushJob {
        user_id: user.user_id,
        title: title.to_owned(),
        body: body.to_owned(),
        url: url.map(str::to_owned),
    };
    match jobs::enqueue(ctx, QueueName::Push, &job).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Stable endpoint id derived from the subscription's key material, making
/// registration idempotent per browser subscription.
pub fn endpoint_id(subscription: &WebPushSubscription) -> String {
    let mut hasher = Sha256::new();
    hasher.update(subscription.keys.auth.as_bytes());
    hasher.update(subscription.keys.p256dh.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

pub async fn register_web_endpoint<C: Context>(
    ctx: &C,
    user_id: i64,
    subscription: WebPushSubscription,
    user_agent: Option<&str>,
) -> ServiceResult<()> {
    if subscription.endpoint.is_empty()
        || subscription.keys.auth.is_empty()
        || subscription.keys.p256dh.is_empty()
    {
        return Err(AppError::NotificationsInvalidSubscription);
    }
    let id = endpoint_id(&subscription);
    let serialized = serde_json::to_string(&subscription)?;
    match endpoints::create(ctx, &id, user_id, KIND_WEB_PUSH, &serialized, user_agent).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

pub async fn unregister_web_endpoint<C: Context>(
    ctx: &C,
    user_id: i64,
    subscription: WebPushSubscription,
) -> ServiceResult<()> {
    let id = endpoint_id(&subscription);
    match endpoints::delete(ctx, &id, user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::NotificationsEndpointNotFound),
        Err(e) => unexpected(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::endpoints::WebPushKeys;

    fn subscription(auth: &str, p256dh: &str) -> WebPushSubscription {
        WebPushSubscription {
            endpoint: "https://push.example/send/abc".to_owned(),
            keys: WebPushKeys {
                p256dh: p256dh.to_owned(),
                auth: auth.to_owned(),
            },
        }
    }

    #[test]
    fn endpoint_id_is_deterministic() {
        let a = endpoint_id(&subscription("auth", "p256dh"));
        let b = endpoint_id(&subscription("auth", "p256dh"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn endpoint_id_differs_per_key_material() {
        assert_ne!(
            endpoint_id(&subscription("auth-1", "p256dh")),
            endpoint_id(&subscription("auth-2", "p256dh"))
        );
    }

    #[test]
    fn message_pushes_need_no_preference() {
        assert!(PushKind::Message.required_preference().is_none());
        assert_eq!(
            PushKind::Like.required_preference(),
            Some(PushPreferences::LIKE)
        );
    }
}
