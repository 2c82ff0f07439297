use crate::api::{self, RequestContext};
use crate::common::broadcaster::Topic;
use crate::common::error::AppError;
use crate::common::state::AppState;
use crate::models::users::User;
use crate::repositories::channels;
use crate::usecases::sessions;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use hashbrown::HashSet;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing::debug;

const PING_INTERVAL: Duration = Duration::from_secs(5);
const PONG_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
pub struct UpgradeArgs {
    pub token: Option<String>,
}

/// Subscribe/unsubscribe frames sent by the client after connecting.
#[derive(Deserialize)]
struct ClientFrame {
    op: String,
    topic: String,
}

pub async fn upgrade(
    State(state): State<AppState>,
    Query(args): Query<UpgradeArgs>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let token = match args.token {
        Some(token) => token,
        None => headers
            .get(axum::http::header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookies| api::cookie_value(cookies, api::SESSION_COOKIE))
            .map(str::to_owned)
            .ok_or(AppError::Unauthorized)?,
    };
    let ctx = RequestContext::from(&state);
    let signing_key = &crate::settings::settings().session_signing_key;
    let (_, user) = sessions::authenticate(&ctx, signing_key, &token).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(state, user, socket)))
}

/// Per-socket loop: forwards subscribed broadcast events, handles the
/// client's topic frames and enforces the ping/pong liveness window.
async fn handle_socket(state: AppState, user: User, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let mut events = state.broadcaster.subscribe();

    // every connection listens on its own badge topic
    let mut topics: HashSet<String> = HashSet::new();
    topics.insert(Topic::User(user.user_id).to_string());

    let mut ping = tokio::time::interval(PING_INTERVAL);
    let mut last_pong = Instant::now();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if topics.contains(&event.topic) => {
                    let frame = match serde_json::to_string(&*event) {
                        Ok(frame) => frame,
                        Err(_) => continue,
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                // a lagged client missed events; it reconciles over REST
                Err(RecvError::Lagged(skipped)) => {
                    debug!(user_id = user.user_id, skipped, "socket lagged behind broadcast");
                }
                Err(RecvError::Closed) => break,
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(frame) = serde_json::from_str::<ClientFrame>(&text) {
                        handle_frame(&state, &user, &mut topics, frame).await;
                    }
                }
                Some(Ok(Message::Pong(_))) => last_pong = Instant::now(),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
            _ = ping.tick() => {
                if last_pong.elapsed() > PONG_TIMEOUT {
                    debug!(user_id = user.user_id, "dropping unresponsive socket");
                    break;
                }
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn handle_frame(
    state: &AppState,
    user: &User,
    topics: &mut HashSet<String>,
    frame: ClientFrame,
) {
    match frame.op.as_str() {
        "subscribe" => {
            if is_joinable(state, user, &frame.topic).await {
                topics.insert(frame.topic);
            }
        }
        "unsubscribe" => {
            topics.remove(&frame.topic);
        }
        _ => {}
    }
}

/// Channel topics are only joinable by channel members; badge topics only
/// by the user they belong to.
async fn is_joinable(state: &AppState, user: &User, topic: &str) -> bool {
    if topic.starts_with("messages:user:") {
        return owns_user_topic(topic, user.user_id);
    }
    let Some(channel_id) = topic.strip_prefix("messages:") else {
        return false;
    };
    matches!(
        channels::fetch_member(state, channel_id, user.user_id).await,
        Ok(Some(_))
    )
}

fn owns_user_topic(topic: &str, user_id: i64) -> bool {
    topic
        .strip_prefix("messages:user:")
        .and_then(|id| id.parse::<i64>().ok())
        == Some(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_topics_belong_to_one_user() {
        assert!(owns_user_topic("messages:user:7", 7));
        assert!(!owns_user_topic("messages:user:7", 8));
        assert!(!owns_user_topic("messages:c1", 7));
        assert!(!owns_user_topic("messages:user:", 7));
    }
}
