use crate::common::context::Context;
use crate::common::redis_json::Json;
use crate::entities::sessions::Session;
use redis::AsyncCommands;
use uuid::Uuid;

fn make_key(user_id: i64, session_id: Uuid) -> String {
    format!("folks:sessions:{user_id}:{session_id}")
}

fn make_user_pattern(user_id: i64) -> String {
    format!("folks:sessions:{user_id}:*")
}

pub async fn fetch_one<C: Context>(
    ctx: &C,
    user_id: i64,
    session_id: Uuid,
) -> anyhow::Result<Option<Session>> {
    let mut redis = ctx.redis().await?;
    let key = make_key(user_id, session_id);
    let session: Option<Json<Session>> = redis.get(key).await?;
    Ok(session.map(Json::into_inner))
}

/// Logout: revokes a single session record.
pub async fn delete<C: Context>(ctx: &C, user_id: i64, session_id: Uuid) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let key = make_key(user_id, session_id);
    let _: () = redis.del(key).await?;
    Ok(())
}

/// Password reset: revokes every session of the user by prefix scan.
pub async fn delete_all<C: Context>(ctx: &C, user_id: i64) -> anyhow::Result<usize> {
    let mut redis = ctx.redis().await?;
    let pattern = make_user_pattern(user_id);
    let keys: Vec<String> = {
        let mut iter: redis::AsyncIter<String> = redis.scan_match(pattern).await?;
        let mut keys = vec![];
        while let Some(key) = iter.next_item().await {
            keys.push(key?);
        }
        keys
    };
    if !keys.is_empty() {
        let _: () = redis.del(&keys).await?;
    }
    Ok(keys.len())
}
