use crate::api::{AuthedSession, OkResponse, RequestContext};
use crate::common::error::ServiceResponse;
use crate::common::state::AppState;
use crate::usecases::sessions;
use axum::Json;
use axum::Router;
use axum::routing::post;
use serde::Serialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/logout/all", post(logout_all))
}

/// Deletes the calling session's server-side record; the signed token is
/// useless afterwards.
pub async fn logout(ctx: RequestContext, auth: AuthedSession) -> ServiceResponse<OkResponse> {
    sessions::logout(&ctx, &auth.session).await?;
    Ok(Json(OkResponse::new()))
}

#[derive(Serialize)]
pub struct LogoutAllResponse {
    pub revoked: usize,
}

/// Signs the user out everywhere. The password-reset flow calls this too.
pub async fn logout_all(
    ctx: RequestContext,
    auth: AuthedSession,
) -> ServiceResponse<LogoutAllResponse> {
    let revoked = sessions::revoke_all(&ctx, auth.user.user_id).await?;
    Ok(Json(LogoutAllResponse { revoked }))
}
