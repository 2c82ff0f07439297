use crate::common::broadcaster::Broadcaster;
use crate::common::context::Context;
use crate::common::error::AppError;
use crate::common::init;
use crate::common::redis_pool::{PoolResult, RedisPool};
use crate::common::state::AppState;
use crate::models::sessions::Session;
use crate::models::users::User;
use crate::settings::AppSettings;
use async_trait::async_trait;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::routing::get;
use serde::Serialize;
use sqlx::{MySql, Pool};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

pub mod health;
pub mod messages;
pub mod notifications;
pub mod sessions;
pub mod ws;

pub const SESSION_COOKIE: &str = "folks_session";

pub struct RequestContext {
    pub db: Pool<MySql>,
    pub redis: RedisPool,
    pub broadcaster: Broadcaster,
}

/// Resolved session of a protected endpoint. Extraction fails with
/// `unauthorized` when the token or its server-side record is missing.
pub struct AuthedSession {
    pub session: Session,
    pub user: User,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub const fn new() -> Self {
        Self { ok: true }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/ws", get(ws::upgrade))
        .merge(sessions::router())
        .nest("/messages", messages::router())
        .nest("/notifications", notifications::router())
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let app = router().with_state(state);
    let addr = SocketAddr::from((settings.app_host, settings.app_port));
    let listener = TcpListener::bind(addr).await?;
    info!("folks-service api listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

impl From<&AppState> for RequestContext {
    fn from(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            redis: state.redis.clone(),
            broadcaster: state.broadcaster.clone(),
        }
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from(state))
    }
}

impl FromRequestParts<AppState> for AuthedSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let ctx = RequestContext::from(state);
        let signing_key = &crate::settings::settings().session_signing_key;
        let (session, user) =
            crate::usecases::sessions::authenticate(&ctx, signing_key, &token).await?;
        Ok(Self { session, user })
    }
}

/// Pulls the session token from the Authorization header or, failing that,
/// the `folks_session` cookie.
fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_owned());
            }
        }
    }
    let cookies = parts.headers.get(COOKIE)?.to_str().ok()?;
    cookie_value(cookies, SESSION_COOKIE).map(str::to_owned)
}

pub(crate) fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

#[async_trait]
impl Context for RequestContext {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    async fn redis(&self) -> PoolResult {
        self.redis.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_parsing_handles_multiple_pairs() {
        let cookies = "theme=dark; folks_session=abc.def.ghi; lang=en";
        assert_eq!(cookie_value(cookies, "folks_session"), Some("abc.def.ghi"));
        assert_eq!(cookie_value(cookies, "missing"), None);
    }
}
