use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;

use crate::core::store::types::{ScholarshipRecord, ThoughtRecord};

const DASHBOARD_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of live agent events to every connected dashboard client.
///
/// Publishing is strictly best-effort: the durable write always happens
/// first, and a send with no subscribers (or a lagging one) never fails the
/// caller.
#[derive(Clone)]
pub struct DashboardBroadcaster {
    tx: broadcast::Sender<String>,
}

impl DashboardBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DASHBOARD_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn publish(&self, envelope: serde_json::Value) {
        if let Err(e) = self.tx.send(envelope.to_string()) {
            debug!("Dashboard broadcast dropped (no subscribers): {}", e);
        }
    }

    pub fn publish_thinking(&self, agent_name: &str, thought: &ThoughtRecord) {
        self.publish(json!({
            "type": "ai_thinking",
            "agent": agent_name,
            "content": thought.content,
            "thought_type": thought.thought_type,
            "importance": thought.importance,
            "confidence": thought.confidence,
            "timestamp": thought.created_at,
        }));
    }

    pub fn publish_scholarship(&self, scholarship: &ScholarshipRecord) {
        self.publish(json!({
            "type": "scholarship_found",
            "scholarship": scholarship,
        }));
    }

    pub fn publish_source_visit(&self, name: &str, url: &str) {
        self.publish(json!({
            "type": "source_visit",
            "source": name,
            "url": url,
        }));
    }

    pub fn publish_hunt_status(&self, message: &str) {
        self.publish(json!({
            "type": "hunt_status",
            "message": message,
        }));
    }
}

impl Default for DashboardBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thought() -> ThoughtRecord {
        ThoughtRecord {
            id: "t1".to_string(),
            agent_id: "a1".to_string(),
            thought_type: "discovery".to_string(),
            content: "Found 3 scholarships at ETH Zurich".to_string(),
            importance: "high".to_string(),
            confidence: 0.8,
            created_at: "2025-06-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let broadcaster = DashboardBroadcaster::new();
        broadcaster.publish_thinking("Hunter", &thought());
        // nothing to assert beyond "did not panic / did not error"
    }

    #[tokio::test]
    async fn subscriber_receives_thinking_envelope() {
        let broadcaster = DashboardBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        broadcaster.publish_thinking("Hunter", &thought());

        let raw = rx.recv().await.unwrap();
        let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope["type"], "ai_thinking");
        assert_eq!(envelope["agent"], "Hunter");
        assert_eq!(envelope["thought_type"], "discovery");
        assert_eq!(envelope["confidence"], 0.8);
    }
}
