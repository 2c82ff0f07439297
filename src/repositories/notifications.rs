use crate::common::context::Context;
use crate::entities::notifications::{FollowRow, LikeRow, MentionRow, ReplyRow};
use crate::models::notifications::FEED_LIMIT;

const ACTOR_FIELDS: &str = const_str::concat!(
    "u.id AS actor_id, u.username AS actor_username, ",
    "u.display_name AS actor_display_name, u.avatar_url AS actor_avatar_url"
);

/// Likes on the user's posts by other users.
pub async fn fetch_likes<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Vec<LikeRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        ACTOR_FIELDS,
        ", l.post_id, l.created_at FROM post_likes l ",
        "INNER JOIN posts p ON p.id = l.post_id ",
        "INNER JOIN users u ON u.id = l.user_id ",
        "WHERE p.author_id = ? AND l.user_id <> ? AND u.deleted_at IS NULL ",
        "ORDER BY l.created_at DESC LIMIT ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .bind(FEED_LIMIT as u64)
        .fetch_all(ctx.db())
        .await
}

pub async fn fetch_follows<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Vec<FollowRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        ACTOR_FIELDS,
        ", f.created_at FROM follows f ",
        "INNER JOIN users u ON u.id = f.user_id ",
        "WHERE f.target_id = ? AND u.deleted_at IS NULL ",
        "ORDER BY f.created_at DESC LIMIT ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(FEED_LIMIT as u64)
        .fetch_all(ctx.db())
        .await
}

/// Replies to the user's posts, excluding self-replies.
pub async fn fetch_replies<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Vec<ReplyRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        ACTOR_FIELDS,
        ", p.id AS post_id, r.id AS reply_id, r.created_at FROM posts r ",
        "INNER JOIN posts p ON p.id = r.reply_to_id ",
        "INNER JOIN users u ON u.id = r.author_id ",
        "WHERE p.author_id = ? AND r.author_id <> ? AND u.deleted_at IS NULL ",
        "ORDER BY r.created_at DESC LIMIT ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .bind(FEED_LIMIT as u64)
        .fetch_all(ctx.db())
        .await
}

pub async fn fetch_mentions<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Vec<MentionRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        ACTOR_FIELDS,
        ", pm.post_id, pm.created_at FROM post_mentions pm ",
        "INNER JOIN posts p ON p.id = pm.post_id ",
        "INNER JOIN users u ON u.id = p.author_id ",
        "WHERE pm.user_id = ? AND p.author_id <> ? AND u.deleted_at IS NULL ",
        "ORDER BY pm.created_at DESC LIMIT ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .bind(FEED_LIMIT as u64)
        .fetch_all(ctx.db())
        .await
}
