use crate::api::RequestContext;
use crate::common::error::ServiceResponse;
use axum::Json;
use serde::Serialize;
use std::ops::DerefMut;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(ctx: RequestContext) -> ServiceResponse<HealthResponse> {
    sqlx::query("SELECT 1").execute(&ctx.db).await?;
    let mut redis = ctx.redis.get().await?;
    let _: () = redis::cmd("PING").query_async(redis.deref_mut()).await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
