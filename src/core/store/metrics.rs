use anyhow::Result;
use rusqlite::params;

use super::AgentStore;
use super::types::MetricRecord;

impl AgentStore {
    /// Append one named metric sample for an agent.
    pub async fn record_metric(
        &self,
        agent_id: &str,
        name: &str,
        value: f64,
        unit: &str,
        context: Option<serde_json::Value>,
    ) -> Result<()> {
        let context = context.unwrap_or_else(|| serde_json::json!({}));
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO metrics (agent_id, metric_name, metric_value, metric_unit, context)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![agent_id, name, value, unit, context.to_string()],
        )?;
        Ok(())
    }

    /// Recent metric samples, newest first, optionally scoped to one name.
    pub async fn recent_metrics(
        &self,
        name: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MetricRecord>> {
        let db = self.db.lock().await;

        let mut results = Vec::new();
        if let Some(name) = name {
            let mut stmt = db.prepare(
                "SELECT id, agent_id, metric_name, metric_value, metric_unit, context, recorded_at
                 FROM metrics WHERE metric_name = ?1
                 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![name, limit as i64], Self::map_metric)?;
            for row in rows {
                results.push(row?);
            }
        } else {
            let mut stmt = db.prepare(
                "SELECT id, agent_id, metric_name, metric_value, metric_unit, context, recorded_at
                 FROM metrics ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], Self::map_metric)?;
            for row in rows {
                results.push(row?);
            }
        }

        Ok(results)
    }

    fn map_metric(row: &rusqlite::Row) -> rusqlite::Result<MetricRecord> {
        let context_raw: String = row.get(5)?;
        Ok(MetricRecord {
            id: row.get(0)?,
            agent_id: row.get(1)?,
            metric_name: row.get(2)?,
            metric_value: row.get(3)?,
            metric_unit: row.get(4)?,
            context: serde_json::from_str(&context_raw).unwrap_or_else(|_| serde_json::json!({})),
            recorded_at: row.get(6)?,
        })
    }
}
