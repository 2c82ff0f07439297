use crate::common::context::Context;
use std::ops::DerefMut;
use std::time::Duration;

fn make_key(scope: &str, user_id: i64) -> String {
    format!("folks:ratelimit:{scope}:{user_id}")
}

/// Counts a hit against the window and returns the running total. INCR and
/// EXPIRE run in one atomic pipeline, so concurrent bursts cannot lose
/// counts the way a read-increment-write cycle would.
pub async fn hit<C: Context>(
    ctx: &C,
    scope: &str,
    user_id: i64,
    window: Duration,
) -> anyhow::Result<i64> {
    let mut redis = ctx.redis().await?;
    let key = make_key(scope, user_id);
    let count: [i64; 1] = redis::pipe()
        .atomic()
        .incr(&key, 1)
        .expire(&key, window.as_secs() as i64)
        .ignore()
        .query_async(redis.deref_mut())
        .await?;
    Ok(count[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_per_user() {
        assert_eq!(make_key("messages", 7), "folks:ratelimit:messages:7");
        assert_ne!(make_key("messages", 7), make_key("messages", 8));
    }
}
