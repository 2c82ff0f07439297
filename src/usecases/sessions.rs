use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::sessions::{Session, SessionClaims};
use crate::models::users::User;
use crate::repositories::{sessions, users};
use chrono::TimeDelta;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

const TOKEN_LIFETIME_DAYS: i64 = 30;

pub fn encode_token(signing_key: &str, session: &Session) -> ServiceResult<String> {
    let claims = SessionClaims {
        sub: session.user_id,
        sid: session.session_id,
        exp: (chrono::Utc::now() + TimeDelta::days(TOKEN_LIFETIME_DAYS)).timestamp(),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(signing_key: &str, token: &str) -> ServiceResult<SessionClaims> {
    let mut validation = Validation::default();
    validation.set_required_spec_claims(&["exp"]);
    match jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(_) => Err(AppError::Unauthorized),
    }
}

/// Resolves a bearer token to its session and user. A valid signature is
/// necessary but not sufficient; the server-side session record is the
/// actual authority, so revoked tokens fail here.
pub async fn authenticate<C: Context>(
    ctx: &C,
    signing_key: &str,
    token: &str,
) -> ServiceResult<(Session, User)> {
    let claims = decode_token(signing_key, token)?;
    let session = match sessions::fetch_one(ctx, claims.sub, claims.sid).await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(AppError::Unauthorized),
        Err(e) => return unexpected(e),
    };
    let user = match users::fetch_one(ctx, session.user_id).await {
        Ok(Some(user)) => User::from(user),
        Ok(None) => return Err(AppError::Unauthorized),
        Err(e) => return unexpected(e),
    };
    if user.suspended {
        return Err(AppError::Unauthorized);
    }
    Ok((Session::from(session), user))
}

pub async fn logout<C: Context>(ctx: &C, session: &Session) -> ServiceResult<()> {
    match sessions::delete(ctx, session.user_id, session.session_id).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Password reset path: revokes every session of the user.
pub async fn revoke_all<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<usize> {
    match sessions::delete_all(ctx, user_id).await {
        Ok(revoked) => Ok(revoked),
        Err(e) => unexpected(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn session() -> Session {
        let now = Utc::now();
        Session {
            session_id: Uuid::new_v4(),
            user_id: 42,
            user_agent: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trips() {
        let session = session();
        let token = encode_token("secret", &session).unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.sid, session.session_id);
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let token = encode_token("secret", &session()).unwrap();
        assert!(matches!(
            decode_token("other-secret", &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(matches!(
            decode_token("secret", "not-a-token"),
            Err(AppError::Unauthorized)
        ));
    }
}
