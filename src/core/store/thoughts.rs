use anyhow::Result;
use rusqlite::params;

use super::AgentStore;
use super::types::{Importance, ThoughtRecord};

impl AgentStore {
    /// Append a thought. Confidence is clamped into [0,1]; rows are immutable
    /// once written.
    pub async fn record_thought(
        &self,
        agent_id: &str,
        thought_type: &str,
        content: &str,
        importance: Importance,
        confidence: f64,
    ) -> Result<ThoughtRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let confidence = confidence.clamp(0.0, 1.0);

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO thoughts (id, agent_id, thought_type, content, importance, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                agent_id,
                thought_type,
                content,
                importance.as_str(),
                confidence
            ],
        )?;

        let created_at: String = db.query_row(
            "SELECT created_at FROM thoughts WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(ThoughtRecord {
            id,
            agent_id: agent_id.to_string(),
            thought_type: thought_type.to_string(),
            content: content.to_string(),
            importance: importance.as_str().to_string(),
            confidence,
            created_at,
        })
    }

    /// Most recent thoughts across all agents, newest first.
    pub async fn recent_thoughts(&self, limit: usize) -> Result<Vec<ThoughtRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, agent_id, thought_type, content, importance, confidence, created_at
             FROM thoughts ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ThoughtRecord {
                id: row.get(0)?,
                agent_id: row.get(1)?,
                thought_type: row.get(2)?,
                content: row.get(3)?,
                importance: row.get(4)?,
                confidence: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{AgentStore, test_support};
    use super::*;

    #[tokio::test]
    async fn thought_persists_and_reads_back() {
        let store = AgentStore::open_in_memory().unwrap();
        let agent = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();

        let thought = store
            .record_thought(
                &agent.id,
                "discovery",
                "Found 3 scholarships at ETH Zurich",
                Importance::High,
                0.8,
            )
            .await
            .unwrap();
        assert_eq!(thought.thought_type, "discovery");
        assert_eq!(thought.importance, "high");
        assert!(!thought.created_at.is_empty());

        let recent = store.recent_thoughts(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "Found 3 scholarships at ETH Zurich");
    }

    #[tokio::test]
    async fn confidence_is_clamped() {
        let store = AgentStore::open_in_memory().unwrap();
        let agent = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();

        let high = store
            .record_thought(&agent.id, "planning", "x", Importance::Low, 3.5)
            .await
            .unwrap();
        assert_eq!(high.confidence, 1.0);

        let low = store
            .record_thought(&agent.id, "planning", "y", Importance::Low, -0.2)
            .await
            .unwrap();
        assert_eq!(low.confidence, 0.0);
    }

    #[tokio::test]
    async fn thought_for_unknown_agent_is_rejected() {
        let store = AgentStore::open_in_memory().unwrap();
        let result = store
            .record_thought("no-such-agent", "planning", "x", Importance::Medium, 0.5)
            .await;
        assert!(result.is_err());
    }
}
