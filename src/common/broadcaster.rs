use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the underlying broadcast channel. Receivers that fall behind
/// skip events (`RecvError::Lagged`) and reconcile over REST.
const BROADCAST_CAPACITY: usize = 4096;

/// A real-time topic a connected socket may subscribe to.
#[derive(Copy, Clone)]
pub enum Topic<'a> {
    /// Per-user badge topic, invalidating unread counts across that user's
    /// open tabs. Only the owning user's sockets may subscribe.
    User(i64),
    /// Chat events scoped to a single channel.
    Channel(&'a str),
}

impl Display for Topic<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::User(user_id) => write!(f, "messages:user:{user_id}"),
            Topic::Channel(channel_id) => write!(f, "messages:{channel_id}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastEvent {
    pub topic: String,
    pub event: &'static str,
    /// Latest message id of the channel, letting clients detect missed
    /// events on reconnect and replay through the REST cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    pub payload: Value,
}

/// Process-local fan-out hub. Delivery is best effort to currently
/// connected sockets; there is no queuing or acknowledgment.
#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<Arc<BroadcastEvent>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Each connected socket calls this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastEvent>> {
        self.sender.subscribe()
    }

    pub fn publish(&self, topic: Topic<'_>, event: &'static str, seq: Option<u64>, payload: Value) {
        let broadcast_event = BroadcastEvent {
            topic: topic.to_string(),
            event,
            seq,
            payload,
        };
        // send() errors when no socket is connected, which is fine
        let _ = self.sender.send(Arc::new(broadcast_event));
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn topic_names() {
        assert_eq!(Topic::User(7).to_string(), "messages:user:7");
        assert_eq!(Topic::Channel("c1").to_string(), "messages:c1");
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let broadcaster = Broadcaster::new();
        let mut rx = broadcaster.subscribe();
        broadcaster.publish(Topic::Channel("c1"), "message", Some(7), json!({"from": 1}));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.topic, "messages:c1");
        assert_eq!(event.event, "message");
        assert_eq!(event.seq, Some(7));
        assert_eq!(event.payload["from"], 1);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_a_noop() {
        let broadcaster = Broadcaster::new();
        broadcaster.publish(Topic::User(1), "message", None, json!({}));
    }
}
