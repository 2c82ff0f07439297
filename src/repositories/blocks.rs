use crate::common::context::Context;

const TABLE_NAME: &str = "user_blocks";

/// Block checks are always evaluated in both directions.
pub async fn is_blocked_either<C: Context>(
    ctx: &C,
    user_id: i64,
    other_id: i64,
) -> sqlx::Result<bool> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*) FROM ",
        TABLE_NAME,
        " WHERE (user_id = ? AND target_id = ?) OR (user_id = ? AND target_id = ?)"
    );
    let count: i64 = sqlx::query_scalar(QUERY)
        .bind(user_id)
        .bind(other_id)
        .bind(other_id)
        .bind(user_id)
        .fetch_one(ctx.db())
        .await?;
    Ok(count > 0)
}
