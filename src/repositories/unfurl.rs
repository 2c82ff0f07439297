use crate::common::context::Context;
use crate::common::redis_json::Json;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

/// Unfurled metadata is a small cache entry; one day covers the useful
/// lifetime of a link preview.
const CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlMetadata {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

fn make_key(url: &str) -> String {
    format!("folks:unfurl:{url}")
}

pub async fn cache_set<C: Context>(ctx: &C, metadata: &UrlMetadata) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let key = make_key(&metadata.url);
    let _: () = redis.set_ex(key, Json(metadata), CACHE_TTL_SECS).await?;
    Ok(())
}

pub async fn cache_get<C: Context>(ctx: &C, url: &str) -> anyhow::Result<Option<UrlMetadata>> {
    let mut redis = ctx.redis().await?;
    let key = make_key(url);
    let cached: Option<Json<UrlMetadata>> = redis.get(key).await?;
    Ok(cached.map(Json::into_inner))
}
