use crate::common::context::Context;
use crate::entities::channels::{Channel, ChannelMember, ChannelWithActivity, MemberProfile};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const TABLE_NAME: &str = "channels";
const MEMBERS_TABLE: &str = "channel_members";
const READ_FIELDS: &str = "id, name, created_at";
const MEMBER_FIELDS: &str = "channel_id, user_id, last_read_at, muted";

pub async fn fetch_one<C: Context>(ctx: &C, channel_id: &str) -> sqlx::Result<Option<Channel>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(channel_id)
        .fetch_optional(ctx.db())
        .await
}

/// Finds the 1:1 channel holding exactly these two members, by membership
/// intersection. Query-then-act; duplicate channels under a true race are a
/// known edge case, not a hard invariant.
pub async fn find_direct<C: Context>(
    ctx: &C,
    user_a: i64,
    user_b: i64,
) -> sqlx::Result<Option<Channel>> {
    const QUERY: &str = const_str::concat!(
        "SELECT c.id, c.name, c.created_at FROM ",
        TABLE_NAME,
        " c INNER JOIN ",
        MEMBERS_TABLE,
        " m1 ON m1.channel_id = c.id AND m1.user_id = ? INNER JOIN ",
        MEMBERS_TABLE,
        " m2 ON m2.channel_id = c.id AND m2.user_id = ? ",
        "WHERE c.name IS NULL AND ",
        "(SELECT COUNT(*) FROM channel_members m WHERE m.channel_id = c.id) = 2 ",
        "LIMIT 1"
    );
    sqlx::query_as(QUERY)
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(ctx.db())
        .await
}

pub async fn create_direct<C: Context>(
    ctx: &C,
    user_a: i64,
    user_b: i64,
) -> sqlx::Result<Channel> {
    const CHANNEL_QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (id, name, created_at) VALUES (?, NULL, ?)"
    );
    const MEMBER_QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        MEMBERS_TABLE,
        " (channel_id, user_id, last_read_at, muted) VALUES (?, ?, NULL, FALSE)"
    );

    let channel_id = Uuid::new_v4().to_string();
    let created_at = Utc::now();

    let mut tx = ctx.db().begin().await?;
    sqlx::query(CHANNEL_QUERY)
        .bind(&channel_id)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    for user_id in [user_a, user_b] {
        sqlx::query(MEMBER_QUERY)
            .bind(&channel_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(Channel {
        id: channel_id,
        name: None,
        created_at,
    })
}

pub async fn fetch_member<C: Context>(
    ctx: &C,
    channel_id: &str,
    user_id: i64,
) -> sqlx::Result<Option<ChannelMember>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        MEMBER_FIELDS,
        " FROM ",
        MEMBERS_TABLE,
        " WHERE channel_id = ? AND user_id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(channel_id)
        .bind(user_id)
        .fetch_optional(ctx.db())
        .await
}

/// Members joined with their public profile; soft-deleted users are
/// excluded via the null check on `deleted_at`.
pub async fn fetch_member_profiles<C: Context>(
    ctx: &C,
    channel_id: &str,
) -> sqlx::Result<Vec<MemberProfile>> {
    const QUERY: &str = const_str::concat!(
        "SELECT m.channel_id, m.user_id, m.last_read_at, m.muted, ",
        "u.username, u.display_name, u.avatar_url FROM ",
        MEMBERS_TABLE,
        " m INNER JOIN users u ON u.id = m.user_id ",
        "WHERE m.channel_id = ? AND u.deleted_at IS NULL"
    );
    sqlx::query_as(QUERY)
        .bind(channel_id)
        .fetch_all(ctx.db())
        .await
}

/// Channels the user belongs to that have at least one message and no
/// blocked counterpart (either direction), newest activity first.
pub async fn fetch_active_for_user<C: Context>(
    ctx: &C,
    user_id: i64,
) -> sqlx::Result<Vec<ChannelWithActivity>> {
    const QUERY: &str = const_str::concat!(
        "SELECT c.id, c.name, c.created_at, MAX(m.id) AS last_message_id FROM ",
        TABLE_NAME,
        " c INNER JOIN ",
        MEMBERS_TABLE,
        " cm ON cm.channel_id = c.id AND cm.user_id = ? ",
        "INNER JOIN messages m ON m.channel_id = c.id ",
        "WHERE NOT EXISTS (",
        "SELECT 1 FROM channel_members om INNER JOIN user_blocks b ",
        "ON (b.user_id = ? AND b.target_id = om.user_id) ",
        "OR (b.user_id = om.user_id AND b.target_id = ?) ",
        "WHERE om.channel_id = c.id AND om.user_id <> ?",
        ") GROUP BY c.id, c.name, c.created_at ",
        "ORDER BY last_message_id DESC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn mark_read<C: Context>(
    ctx: &C,
    channel_id: &str,
    user_id: i64,
    read_at: DateTime<Utc>,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        MEMBERS_TABLE,
        " SET last_read_at = ? WHERE channel_id = ? AND user_id = ?"
    );
    sqlx::query(QUERY)
        .bind(read_at)
        .bind(channel_id)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn set_muted<C: Context>(
    ctx: &C,
    channel_id: &str,
    user_id: i64,
    muted: bool,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        MEMBERS_TABLE,
        " SET muted = ? WHERE channel_id = ? AND user_id = ?"
    );
    sqlx::query(QUERY)
        .bind(muted)
        .bind(channel_id)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// Number of channels holding messages from other members newer than the
/// member's read watermark. Drives the navigation badge.
pub async fn unread_channel_count<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(DISTINCT m.channel_id) FROM messages m INNER JOIN ",
        MEMBERS_TABLE,
        " cm ON cm.channel_id = m.channel_id AND cm.user_id = ? ",
        "WHERE m.author_id <> ? AND ",
        "(cm.last_read_at IS NULL OR m.created_at > cm.last_read_at)"
    );
    sqlx::query_scalar(QUERY)
        .bind(user_id)
        .bind(user_id)
        .fetch_one(ctx.db())
        .await
}
