use crate::common::context::Context;
use crate::entities::messages::Message;
use chrono::{DateTime, Utc};
use sqlx::MySqlConnection;

const TABLE_NAME: &str = "messages";
const READ_FIELDS: &str = "id, channel_id, author_id, content, created_at, edited_at";

/// Reverse-chronological keyset page. The cursor is the id of the last
/// message the client has seen; results are strictly older.
pub async fn fetch_page<C: Context>(
    ctx: &C,
    channel_id: &str,
    cursor: Option<u64>,
    limit: usize,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE channel_id = ? AND id < ? ORDER BY id DESC LIMIT ?"
    );
    sqlx::query_as(QUERY)
        .bind(channel_id)
        .bind(cursor.unwrap_or(u64::MAX))
        .bind(limit as u64)
        .fetch_all(ctx.db())
        .await
}

pub async fn fetch_one_by_id<C: Context>(
    ctx: &C,
    message_id: u64,
) -> sqlx::Result<Option<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(message_id)
        .fetch_optional(ctx.db())
        .await
}

/// Inserts the message row inside the caller's transaction so attachment
/// claiming commits (or rolls back) together with it.
pub async fn create(
    tx: &mut MySqlConnection,
    channel_id: &str,
    author_id: i64,
    content: Option<&str>,
    created_at: DateTime<Utc>,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (channel_id, author_id, content, created_at) VALUES (?, ?, ?, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(channel_id)
        .bind(author_id)
        .bind(content)
        .bind(created_at)
        .execute(tx)
        .await?;
    Ok(result.last_insert_id())
}
