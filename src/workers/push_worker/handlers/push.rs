use crate::adapters::web_push::{self, PushOutcome};
use crate::common::error::ServiceResult;
use crate::common::state::AppState;
use crate::entities::endpoints::{KIND_WEB_PUSH, WebPushSubscription};
use crate::entities::jobs::PushJob;
use crate::repositories::endpoints;
use tracing::{debug, info, warn};

/// Wakes up every registered browser for the job's recipient. Subscriptions
/// the push service reports as gone are pruned on the spot.
pub async fn handle(ctx: &AppState, job: &PushJob) -> ServiceResult<()> {
    let registered = endpoints::fetch_for_user(ctx, job.user_id).await?;
    if registered.is_empty() {
        debug!(user_id = job.user_id, "no endpoints registered, skipping push");
        return Ok(());
    }

    for endpoint in registered {
        if endpoint.kind != KIND_WEB_PUSH {
            continue;
        }
        let subscription: WebPushSubscription = match serde_json::from_str(&endpoint.subscription)
        {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(endpoint_id = endpoint.id, error = %e, "unreadable subscription record");
                continue;
            }
        };
        match web_push::send_tickle(&subscription).await {
            Ok(PushOutcome::Delivered) => {
                debug!(
                    user_id = job.user_id,
                    endpoint_id = endpoint.id,
                    title = job.title,
                    "delivered push"
                );
            }
            Ok(PushOutcome::Skipped) => {
                warn!(
                    user_id = job.user_id,
                    endpoint_id = endpoint.id,
                    "VAPID key pair not set, dropping push"
                );
            }
            Ok(PushOutcome::Gone) => {
                endpoints::delete(ctx, &endpoint.id, job.user_id).await?;
                info!(
                    user_id = job.user_id,
                    endpoint_id = endpoint.id,
                    "pruned expired push subscription"
                );
            }
            Ok(PushOutcome::Rejected(status)) => {
                warn!(
                    user_id = job.user_id,
                    endpoint_id = endpoint.id,
                    status,
                    "push service rejected delivery"
                );
            }
            Err(e) => {
                warn!(
                    user_id = job.user_id,
                    endpoint_id = endpoint.id,
                    error = ?e,
                    "push delivery failed"
                );
            }
        }
    }
    Ok(())
}
