use crate::common::context::Context;
use crate::entities::endpoints::NotificationEndpoint;
use chrono::Utc;

const TABLE_NAME: &str = "notification_endpoints";
const READ_FIELDS: &str = "id, user_id, kind, subscription, user_agent, created_at";

/// Idempotent registration: the id is derived from the subscription keys,
/// so re-subscribing the same browser touches the existing row.
pub async fn create<C: Context>(
    ctx: &C,
    id: &str,
    user_id: i64,
    kind: &str,
    subscription: &str,
    user_agent: Option<&str>,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (id, user_id, kind, subscription, user_agent, created_at) ",
        "VALUES (?, ?, ?, ?, ?, ?) ON DUPLICATE KEY UPDATE id = id"
    );
    sqlx::query(QUERY)
        .bind(id)
        .bind(user_id)
        .bind(kind)
        .bind(subscription)
        .bind(user_agent)
        .bind(Utc::now())
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn fetch_for_user<C: Context>(
    ctx: &C,
    user_id: i64,
) -> sqlx::Result<Vec<NotificationEndpoint>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE user_id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

/// Returns whether a row was actually removed.
pub async fn delete<C: Context>(ctx: &C, id: &str, user_id: i64) -> sqlx::Result<bool> {
    const QUERY: &str = const_str::concat!(
        "DELETE FROM ",
        TABLE_NAME,
        " WHERE id = ? AND user_id = ?"
    );
    let result = sqlx::query(QUERY)
        .bind(id)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(result.rows_affected() > 0)
}
