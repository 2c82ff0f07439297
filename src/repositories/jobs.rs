use crate::common::context::Context;
use crate::common::redis_json::Json;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Display, Formatter};

/// How long a blocking pop waits before giving the consumer loop a chance
/// to observe shutdown.
pub const DEQUEUE_BLOCK_SECS: f64 = 5.0;

#[derive(Copy, Clone)]
pub enum QueueName {
    Push,
    Unfurl,
}

impl Display for QueueName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueName::Push => write!(f, "push"),
            QueueName::Unfurl => write!(f, "unfurl"),
        }
    }
}

fn make_key(queue: QueueName) -> String {
    format!("folks:queue:{queue}")
}

pub async fn enqueue<C: Context + ?Sized, T: Serialize + Sync>(
    ctx: &C,
    queue: QueueName,
    job: &T,
) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let key = make_key(queue);
    let _: () = redis.lpush(key, Json(job)).await?;
    Ok(())
}

/// Blocking pop with a timeout; `None` means the queue stayed empty for the
/// whole window.
pub async fn dequeue<C: Context, T: DeserializeOwned>(
    ctx: &C,
    queue: QueueName,
) -> anyhow::Result<Option<T>> {
    let mut redis = ctx.redis().await?;
    let key = make_key(queue);
    let reply: Option<(String, Json<T>)> = redis.brpop(key, DEQUEUE_BLOCK_SECS).await?;
    Ok(reply.map(|(_, job)| job.into_inner()))
}

pub async fn queue_len<C: Context>(ctx: &C, queue: QueueName) -> anyhow::Result<usize> {
    let mut redis = ctx.redis().await?;
    let key = make_key(queue);
    Ok(redis.llen(key).await?)
}
