use crate::common::error::ServiceResult;
use crate::entities::endpoints::WebPushSubscription;
use crate::settings::AppSettings;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::LazyLock;

const VAPID_TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;
const PUSH_TTL_SECS: u32 = 60;
const DEFAULT_CONTACT: &str = "mailto:ops@folks.social";

static HTTP: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    /// Delivery is disabled because no VAPID key pair is configured.
    Skipped,
    /// The push service reports the subscription no longer exists.
    Gone,
    Rejected(u16),
}

struct VapidConfig<'a> {
    private_key: &'a str,
    public_key: &'a str,
    contact: &'a str,
}

fn vapid_config<'a>(
    private_key: Option<&'a str>,
    public_key: Option<&'a str>,
    contact: Option<&'a str>,
) -> Option<VapidConfig<'a>> {
    Some(VapidConfig {
        private_key: private_key?,
        public_key: public_key?,
        contact: contact.unwrap_or(DEFAULT_CONTACT),
    })
}

#[derive(Serialize)]
struct VapidClaims<'a> {
    aud: String,
    exp: i64,
    sub: &'a str,
}

/// Sends a payload-less wakeup to the browser's push service. The service
/// worker on the other end fetches actual content over the REST api.
pub async fn send_tickle(subscription: &WebPushSubscription) -> ServiceResult<PushOutcome> {
    let settings = AppSettings::get();
    let Some(vapid) = vapid_config(
        settings.vapid_private_key.as_deref(),
        settings.vapid_public_key.as_deref(),
        settings.vapid_contact.as_deref(),
    ) else {
        return Ok(PushOutcome::Skipped);
    };

    let url = reqwest::Url::parse(&subscription.endpoint).map_err(anyhow::Error::from)?;
    let claims = VapidClaims {
        aud: url.origin().ascii_serialization(),
        exp: Utc::now().timestamp() + VAPID_TOKEN_LIFETIME_SECS,
        sub: vapid.contact,
    };
    let signing_key = EncodingKey::from_ec_pem(vapid.private_key.as_bytes())?;
    let token = jsonwebtoken::encode(&Header::new(Algorithm::ES256), &claims, &signing_key)?;

    let response = HTTP
        .post(url)
        .header(
            "Authorization",
            format!("vapid t={token}, k={}", vapid.public_key),
        )
        .header("TTL", PUSH_TTL_SECS)
        .send()
        .await?;
    match response.status() {
        status if status.is_success() => Ok(PushOutcome::Delivered),
        StatusCode::GONE | StatusCode::NOT_FOUND => Ok(PushOutcome::Gone),
        status => Ok(PushOutcome::Rejected(status.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_pair_disables_delivery() {
        assert!(vapid_config(None, Some("pub"), None).is_none());
        assert!(vapid_config(Some("priv"), None, None).is_none());
        assert!(vapid_config(None, None, Some("mailto:a@b.c")).is_none());
    }

    #[test]
    fn contact_falls_back_to_default() {
        let vapid = vapid_config(Some("priv"), Some("pub"), None).unwrap();
        assert_eq!(vapid.contact, DEFAULT_CONTACT);
        let vapid = vapid_config(Some("priv"), Some("pub"), Some("mailto:a@b.c")).unwrap();
        assert_eq!(vapid.contact, "mailto:a@b.c");
    }
}
