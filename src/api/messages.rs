use crate::api::{AuthedSession, OkResponse, RequestContext};
use crate::common::error::ServiceResponse;
use crate::common::state::AppState;
use crate::models::channels::ChannelView;
use crate::models::messages::MessagePage;
use crate::usecases::{channels, messages};
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::routing::{get, patch, post};
use serde::{Deserialize, Serialize};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/channels", get(list_channels))
        .route("/channel", post(create_channel))
        .route("/messages/{channel_id}", get(list_messages))
        .route("/message", post(send_message))
        .route("/muted", patch(set_muted))
        .route("/read", post(mark_read))
        .route("/unread-count", get(unread_count))
}

pub async fn list_channels(
    ctx: RequestContext,
    auth: AuthedSession,
) -> ServiceResponse<Vec<ChannelView>> {
    let channels = channels::fetch_for_user(&ctx, auth.user.user_id).await?;
    Ok(Json(channels))
}

#[derive(Deserialize)]
pub struct CreateChannelArgs {
    pub target_id: i64,
}

#[derive(Serialize)]
pub struct CreateChannelResponse {
    pub channel_id: String,
}

pub async fn create_channel(
    ctx: RequestContext,
    auth: AuthedSession,
    Json(args): Json<CreateChannelArgs>,
) -> ServiceResponse<CreateChannelResponse> {
    let channel = channels::find_or_create_direct(&ctx, auth.user.user_id, args.target_id).await?;
    Ok(Json(CreateChannelResponse {
        channel_id: channel.id,
    }))
}

#[derive(Deserialize)]
pub struct ListMessagesArgs {
    pub cursor: Option<u64>,
    pub limit: Option<usize>,
}

pub async fn list_messages(
    ctx: RequestContext,
    auth: AuthedSession,
    Path(channel_id): Path<String>,
    Query(args): Query<ListMessagesArgs>,
) -> ServiceResponse<MessagePage> {
    let page = messages::fetch_page(
        &ctx,
        auth.user.user_id,
        &channel_id,
        args.cursor,
        args.limit,
    )
    .await?;
    Ok(Json(page))
}

#[derive(Deserialize)]
pub struct SendMessageArgs {
    pub channel_id: String,
    pub message: Option<String>,
    #[serde(default)]
    pub attachment_ids: Vec<String>,
}

pub async fn send_message(
    ctx: RequestContext,
    auth: AuthedSession,
    Json(args): Json<SendMessageArgs>,
) -> ServiceResponse<OkResponse> {
    messages::send(
        &ctx,
        &auth.user,
        messages::SendArgs {
            channel_id: args.channel_id,
            content: args.message,
            attachment_ids: args.attachment_ids,
        },
    )
    .await?;
    Ok(Json(OkResponse::new()))
}

#[derive(Deserialize)]
pub struct SetMutedArgs {
    pub channel_id: String,
    pub muted: bool,
}

pub async fn set_muted(
    ctx: RequestContext,
    auth: AuthedSession,
    Json(args): Json<SetMutedArgs>,
) -> ServiceResponse<OkResponse> {
    channels::set_muted(&ctx, &args.channel_id, auth.user.user_id, args.muted).await?;
    Ok(Json(OkResponse::new()))
}

#[derive(Deserialize)]
pub struct MarkReadArgs {
    pub channel_id: String,
}

pub async fn mark_read(
    ctx: RequestContext,
    auth: AuthedSession,
    Json(args): Json<MarkReadArgs>,
) -> ServiceResponse<OkResponse> {
    channels::mark_read(&ctx, &args.channel_id, auth.user.user_id).await?;
    Ok(Json(OkResponse::new()))
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

pub async fn unread_count(
    ctx: RequestContext,
    auth: AuthedSession,
) -> ServiceResponse<UnreadCountResponse> {
    let count = channels::unread_count(&ctx, auth.user.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}
