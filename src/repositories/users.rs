use crate::common::context::Context;
use crate::entities::users::User;
use chrono::{DateTime, Utc};

const TABLE_NAME: &str = "users";
const READ_FIELDS: &str = const_str::concat!(
    "id, username, display_name, avatar_url, suspended, push_preferences, ",
    "notifications_last_read_at, deleted_at"
);

pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Option<User>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ? AND deleted_at IS NULL"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_optional(ctx.db())
        .await
}

pub async fn fetch_many<C: Context>(ctx: &C, user_ids: &[i64]) -> sqlx::Result<Vec<User>> {
    if user_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; user_ids.len()].join(",");
    let query = format!(
        "SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE id IN ({placeholders}) AND deleted_at IS NULL"
    );
    let mut query = sqlx::query_as(&query);
    for user_id in user_ids {
        query = query.bind(user_id);
    }
    query.fetch_all(ctx.db()).await
}

/// Advances the notifications watermark. `GREATEST` keeps it monotonic even
/// when a stale concurrent call carries an older timestamp.
pub async fn advance_notifications_watermark<C: Context>(
    ctx: &C,
    user_id: i64,
    read_at: DateTime<Utc>,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET notifications_last_read_at = ",
        "GREATEST(COALESCE(notifications_last_read_at, '1970-01-01'), ?) ",
        "WHERE id = ?"
    );
    sqlx::query(QUERY)
        .bind(read_at)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}
