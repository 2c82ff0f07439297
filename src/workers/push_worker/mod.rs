pub mod handlers;

use crate::common::init;
use crate::common::state::AppState;
use crate::entities::jobs::{PushJob, UnfurlJob};
use crate::repositories::jobs::{self, QueueName};
use crate::settings::AppSettings;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

/// Pause after a failed dequeue so a Redis outage does not spin the loop.
const DEQUEUE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Runs one consumer task per queue until a shutdown signal arrives, then
/// lets each consumer finish its in-flight job before exiting.
pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let shutdown = Arc::new(AtomicBool::new(false));

    let push_backlog = jobs::queue_len(&state, QueueName::Push).await?;
    let unfurl_backlog = jobs::queue_len(&state, QueueName::Unfurl).await?;
    let push_consumer = tokio::spawn(consume_push(state.clone(), shutdown.clone()));
    let unfurl_consumer = tokio::spawn(consume_unfurl(state.clone(), shutdown.clone()));
    info!(push_backlog, unfurl_backlog, "push worker started");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining consumers");
    shutdown.store(true, Ordering::Relaxed);

    let (push, unfurl) = tokio::join!(push_consumer, unfurl_consumer);
    push?;
    unfurl?;
    info!("push worker stopped");
    Ok(())
}

async fn consume_push(ctx: AppState, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        let job: Option<PushJob> = match jobs::dequeue(&ctx, QueueName::Push).await {
            Ok(job) => job,
            Err(e) => {
                error!(error = %e, "failed to dequeue push job");
                tokio::time::sleep(DEQUEUE_RETRY_DELAY).await;
                continue;
            }
        };
        let Some(job) = job else { continue };
        // delivery is best-effort; a failed job is logged and dropped
        if let Err(e) = handlers::push::handle(&ctx, &job).await {
            warn!(user_id = job.user_id, error = ?e, "dropping failed push job");
        }
    }
}

async fn consume_unfurl(ctx: AppState, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        let job: Option<UnfurlJob> = match jobs::dequeue(&ctx, QueueName::Unfurl).await {
            Ok(job) => job,
            Err(e) => {
                error!(error = %e, "failed to dequeue unfurl job");
                tokio::time::sleep(DEQUEUE_RETRY_DELAY).await;
                continue;
            }
        };
        let Some(job) = job else { continue };
        if let Err(e) = handlers::unfurl::handle(&ctx, &job).await {
            warn!(url = job.url, error = ?e, "dropping failed unfurl job");
        }
    }
}
