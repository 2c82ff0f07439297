use crate::api::{AuthedSession, OkResponse, RequestContext};
use crate::common::error::ServiceResponse;
use crate::common::state::AppState;
use crate::entities::endpoints::WebPushSubscription;
use crate::models::notifications::NotificationsFeed;
use crate::usecases::notifications;
use axum::Json;
use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::routing::{get, post};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed))
        .route("/read", post(mark_all_read))
        .route(
            "/register/web",
            post(register_web).delete(unregister_web),
        )
}

pub async fn feed(ctx: RequestContext, auth: AuthedSession) -> ServiceResponse<NotificationsFeed> {
    let feed = notifications::fetch_feed(&ctx, &auth.user).await?;
    Ok(Json(feed))
}

pub async fn mark_all_read(
    ctx: RequestContext,
    auth: AuthedSession,
) -> ServiceResponse<OkResponse> {
    notifications::mark_all_read(&ctx, auth.user.user_id).await?;
    Ok(Json(OkResponse::new()))
}

#[derive(Deserialize)]
pub struct RegisterWebArgs {
    pub sub: WebPushSubscription,
}

pub async fn register_web(
    ctx: RequestContext,
    auth: AuthedSession,
    headers: HeaderMap,
    Json(args): Json<RegisterWebArgs>,
) -> ServiceResponse<OkResponse> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok());
    notifications::register_web_endpoint(&ctx, auth.user.user_id, args.sub, user_agent).await?;
    Ok(Json(OkResponse::new()))
}

pub async fn unregister_web(
    ctx: RequestContext,
    auth: AuthedSession,
    Json(args): Json<RegisterWebArgs>,
) -> ServiceResponse<OkResponse> {
    notifications::unregister_web_endpoint(&ctx, auth.user.user_id, args.sub).await?;
    Ok(Json(OkResponse::new()))
}
