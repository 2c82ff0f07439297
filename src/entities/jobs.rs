use serde::{Deserialize, Serialize};

/// Web-push delivery job, consumed by the push worker outside the
/// request/response cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushJob {
    pub user_id: i64,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// URL-metadata prefetch job; shares the worker with push delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnfurlJob {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_job_round_trips_through_json() {
        let job = PushJob {
            user_id: 7,
            title: "maria".to_owned(),
            body: "hi there".to_owned(),
            url: Some("/messages/c1".to_owned()),
        };
        let encoded = serde_json::to_string(&job).unwrap();
        let decoded: PushJob = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.url.as_deref(), Some("/messages/c1"));
    }

    #[test]
    fn push_job_omits_absent_url() {
        let job = PushJob {
            user_id: 1,
            title: "t".to_owned(),
            body: "b".to_owned(),
            url: None,
        };
        let encoded = serde_json::to_string(&job).unwrap();
        assert!(!encoded.contains("url"));
    }
}
