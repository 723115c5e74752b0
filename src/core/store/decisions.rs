use anyhow::Result;
use rusqlite::{Row, params};

use super::AgentStore;
use super::types::{DecisionRecord, NewDecision};

impl AgentStore {
    /// Persist a decision row. Failed decisions land here too; the audit
    /// trail keeps failures next to successes. A successful decision also
    /// bumps the owning agent's task counter and activity timestamp.
    pub async fn insert_decision(&self, new: NewDecision) -> Result<DecisionRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let confidence = new.confidence_score.clamp(0.0, 1.0);

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO decisions (id, agent_id, decision_type, input_data, output_data,
                reasoning, confidence_score, processing_time, tokens_used, success, error_message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id,
                new.agent_id,
                new.decision_type,
                new.input_data.to_string(),
                new.output_data.to_string(),
                new.reasoning,
                confidence,
                new.processing_time,
                new.tokens_used,
                new.success as i64,
                new.error_message,
            ],
        )?;

        if new.success {
            db.execute(
                "UPDATE agents SET tasks_completed = tasks_completed + 1,
                    last_activity = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![new.agent_id],
            )?;
        }

        let created_at: String = db.query_row(
            "SELECT created_at FROM decisions WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(DecisionRecord {
            id,
            agent_id: new.agent_id,
            decision_type: new.decision_type,
            input_data: new.input_data,
            output_data: new.output_data,
            reasoning: new.reasoning,
            confidence_score: confidence,
            processing_time: new.processing_time,
            tokens_used: new.tokens_used,
            success: new.success,
            error_message: new.error_message,
            created_at,
        })
    }

    /// Recent decisions, newest first. Pass an agent id to scope the listing.
    pub async fn recent_decisions(
        &self,
        agent_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DecisionRecord>> {
        let db = self.db.lock().await;

        let mut results = Vec::new();
        if let Some(agent_id) = agent_id {
            let mut stmt = db.prepare(
                "SELECT id, agent_id, decision_type, input_data, output_data, reasoning,
                        confidence_score, processing_time, tokens_used, success, error_message,
                        created_at
                 FROM decisions WHERE agent_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![agent_id, limit as i64], Self::map_decision)?;
            for row in rows {
                results.push(row?);
            }
        } else {
            let mut stmt = db.prepare(
                "SELECT id, agent_id, decision_type, input_data, output_data, reasoning,
                        confidence_score, processing_time, tokens_used, success, error_message,
                        created_at
                 FROM decisions ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], Self::map_decision)?;
            for row in rows {
                results.push(row?);
            }
        }

        Ok(results)
    }

    fn map_decision(row: &Row) -> rusqlite::Result<DecisionRecord> {
        let input_raw: String = row.get(3)?;
        let output_raw: String = row.get(4)?;
        Ok(DecisionRecord {
            id: row.get(0)?,
            agent_id: row.get(1)?,
            decision_type: row.get(2)?,
            input_data: serde_json::from_str(&input_raw)
                .unwrap_or_else(|_| serde_json::json!({})),
            output_data: serde_json::from_str(&output_raw)
                .unwrap_or_else(|_| serde_json::json!({})),
            reasoning: row.get(5)?,
            confidence_score: row.get(6)?,
            processing_time: row.get(7)?,
            tokens_used: row.get(8)?,
            success: row.get::<_, i64>(9)? != 0,
            error_message: row.get(10)?,
            created_at: row.get(11)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::{AgentStore, test_support};
    use super::*;
    use serde_json::json;

    fn new_decision(agent_id: &str, success: bool) -> NewDecision {
        NewDecision {
            agent_id: agent_id.to_string(),
            decision_type: "strategy_planning".to_string(),
            input_data: json!({"phase": 1}),
            output_data: json!({"decision": "focus on Europe"}),
            reasoning: "most funded programs are EU-based".to_string(),
            confidence_score: 0.9,
            processing_time: 1.2,
            tokens_used: 150,
            success,
            error_message: if success {
                None
            } else {
                Some("API error: 500".to_string())
            },
        }
    }

    #[tokio::test]
    async fn successful_decision_bumps_task_counter() {
        let store = AgentStore::open_in_memory().unwrap();
        let agent = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();

        let decision = store.insert_decision(new_decision(&agent.id, true)).await.unwrap();
        assert!(decision.success);
        assert_eq!(decision.input_data["phase"], 1);

        let reloaded = store.get_agent(&agent.id).await.unwrap().unwrap();
        assert_eq!(reloaded.tasks_completed, 1);
        assert_eq!(reloaded.total_decisions, 1);
    }

    #[tokio::test]
    async fn failed_decision_is_kept_without_bumping_counter() {
        let store = AgentStore::open_in_memory().unwrap();
        let agent = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();

        let decision = store.insert_decision(new_decision(&agent.id, false)).await.unwrap();
        assert!(!decision.success);
        assert_eq!(decision.error_message.as_deref(), Some("API error: 500"));

        let reloaded = store.get_agent(&agent.id).await.unwrap().unwrap();
        assert_eq!(reloaded.tasks_completed, 0);
        assert_eq!(reloaded.total_decisions, 1);
    }

    #[tokio::test]
    async fn recent_decisions_scopes_by_agent() {
        let store = AgentStore::open_in_memory().unwrap();
        let a = store
            .get_or_create_agent(&test_support::seed("A"))
            .await
            .unwrap();
        let b = store
            .get_or_create_agent(&test_support::seed("B"))
            .await
            .unwrap();

        store.insert_decision(new_decision(&a.id, true)).await.unwrap();
        store.insert_decision(new_decision(&b.id, true)).await.unwrap();

        assert_eq!(store.recent_decisions(None, 10).await.unwrap().len(), 2);
        assert_eq!(
            store.recent_decisions(Some(&a.id), 10).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn confidence_outside_unit_interval_is_clamped() {
        let store = AgentStore::open_in_memory().unwrap();
        let agent = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();

        let mut new = new_decision(&agent.id, true);
        new.confidence_score = 42.0;
        let decision = store.insert_decision(new).await.unwrap();
        assert_eq!(decision.confidence_score, 1.0);
    }
}
