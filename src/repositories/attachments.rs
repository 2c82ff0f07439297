use crate::common::context::Context;
use crate::entities::messages::Attachment;
use sqlx::MySqlConnection;

const TABLE_NAME: &str = "message_attachments";
const READ_FIELDS: &str = "id, message_id, uploader_id, url, kind, width, height, created_at";

/// Claims detached attachments for a message inside the send transaction.
/// Rows are written by the upload pipeline and stay unclaimed
/// (`message_id IS NULL`) until a send takes them. The WHERE
/// clause enforces ownership and one-time claiming; the caller compares
/// `rows_affected` against the requested count and rolls back on mismatch.
pub async fn claim(
    tx: &mut MySqlConnection,
    message_id: u64,
    uploader_id: i64,
    attachment_ids: &[String],
) -> sqlx::Result<u64> {
    if attachment_ids.is_empty() {
        return Ok(0);
    }
    let placeholders = vec!["?"; attachment_ids.len()].join(",");
    let query = format!(
        "UPDATE {TABLE_NAME} SET message_id = ? \
         WHERE id IN ({placeholders}) AND uploader_id = ? AND message_id IS NULL"
    );
    let mut query = sqlx::query(&query).bind(message_id);
    for attachment_id in attachment_ids {
        query = query.bind(attachment_id);
    }
    let result = query.bind(uploader_id).execute(tx).await?;
    Ok(result.rows_affected())
}

pub async fn fetch_for_messages<C: Context>(
    ctx: &C,
    message_ids: &[u64],
) -> sqlx::Result<Vec<Attachment>> {
    if message_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; message_ids.len()].join(",");
    let query =
        format!("SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE message_id IN ({placeholders})");
    let mut query = sqlx::query_as(&query);
    for message_id in message_ids {
        query = query.bind(message_id);
    }
    query.fetch_all(ctx.db()).await
}
