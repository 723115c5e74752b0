mod decisions;
mod hunts;
mod metrics;
mod scholarships;
mod thoughts;
pub mod types;

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use types::{AgentRecord, AgentSeed, AgentStatistics};

/// SQLite-backed store for agents and their audit trail (thoughts, decisions,
/// metrics), plus discovered scholarships and hunt sessions.
pub struct AgentStore {
    db: Arc<Mutex<Connection>>,
}

const AGENT_COLUMNS: &str = "id, name, agent_type, ai_model, model_provider, temperature, \
     max_tokens, is_active, system_prompt, capabilities, tasks_completed, \
     (SELECT COUNT(*) FROM decisions d WHERE d.agent_id = agents.id) AS total_decisions, \
     created_at, last_activity";

impl AgentStore {
    pub async fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db = Connection::open(db_path)?;
        Self::apply_schema(&db)?;
        info!("Agent store ready at {}", db_path.display());

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        Self::apply_schema(&db)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    fn apply_schema(db: &Connection) -> Result<()> {
        db.execute_batch("PRAGMA foreign_keys = ON;")?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                agent_type TEXT NOT NULL,
                ai_model TEXT NOT NULL,
                model_provider TEXT NOT NULL,
                temperature REAL NOT NULL DEFAULT 0.7,
                max_tokens INTEGER NOT NULL DEFAULT 4000,
                is_active INTEGER NOT NULL DEFAULT 1,
                system_prompt TEXT NOT NULL DEFAULT '',
                capabilities TEXT NOT NULL DEFAULT '{}',
                tasks_completed INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                last_activity DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS thoughts (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL REFERENCES agents(id),
                thought_type TEXT NOT NULL,
                content TEXT NOT NULL,
                importance TEXT NOT NULL DEFAULT 'medium',
                confidence REAL NOT NULL DEFAULT 0.0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_thoughts_agent_type
             ON thoughts(agent_id, thought_type)",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS decisions (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL REFERENCES agents(id),
                decision_type TEXT NOT NULL,
                input_data TEXT NOT NULL DEFAULT '{}',
                output_data TEXT NOT NULL DEFAULT '{}',
                reasoning TEXT NOT NULL DEFAULT '',
                confidence_score REAL NOT NULL DEFAULT 0.0,
                processing_time REAL NOT NULL DEFAULT 0.0,
                tokens_used INTEGER NOT NULL DEFAULT 0,
                success INTEGER NOT NULL DEFAULT 1,
                error_message TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_decisions_agent_type
             ON decisions(agent_id, decision_type)",
            [],
        )?;
        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_decisions_outcome
             ON decisions(success, created_at)",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id TEXT NOT NULL REFERENCES agents(id),
                metric_name TEXT NOT NULL,
                metric_value REAL NOT NULL,
                metric_unit TEXT NOT NULL DEFAULT '',
                context TEXT NOT NULL DEFAULT '{}',
                recorded_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_metrics_agent_name
             ON metrics(agent_id, metric_name)",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS scholarships (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                provider TEXT NOT NULL DEFAULT '',
                country TEXT NOT NULL DEFAULT '',
                field_of_study TEXT NOT NULL DEFAULT '',
                academic_level TEXT NOT NULL DEFAULT 'any',
                target_eligible INTEGER NOT NULL DEFAULT 0,
                funding_type TEXT NOT NULL DEFAULT 'full',
                funding_amount TEXT NOT NULL DEFAULT '',
                application_deadline TEXT,
                application_url TEXT NOT NULL DEFAULT '',
                ai_relevance_score REAL NOT NULL DEFAULT 0.0,
                web_dev_relevance_score REAL NOT NULL DEFAULT 0.0,
                it_relevance_score REAL NOT NULL DEFAULT 0.0,
                overall_relevance_score REAL NOT NULL DEFAULT 0.0,
                source_url TEXT NOT NULL DEFAULT '',
                discovered_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_scholarships_relevance
             ON scholarships(overall_relevance_score)",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS hunt_sessions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'running',
                target_count INTEGER NOT NULL DEFAULT 50,
                scholarships_found INTEGER NOT NULL DEFAULT 0,
                sources_visited INTEGER NOT NULL DEFAULT 0,
                strategy TEXT NOT NULL DEFAULT '',
                started_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                ended_at DATETIME
            )",
            [],
        )?;

        Ok(())
    }

    // ── agents ──

    /// Get-or-create by name. Calling twice with the same name returns the
    /// same row; seed values only apply on first creation.
    pub async fn get_or_create_agent(&self, seed: &AgentSeed) -> Result<AgentRecord> {
        let db = self.db.lock().await;
        if let Some(existing) = Self::agent_by_name(&db, &seed.name)? {
            info!("Using existing AI agent: {}", existing.name);
            return Ok(existing);
        }

        let id = uuid::Uuid::new_v4().to_string();
        db.execute(
            "INSERT INTO agents (id, name, agent_type, ai_model, model_provider,
                temperature, max_tokens, system_prompt, capabilities)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                seed.name,
                seed.agent_type,
                seed.ai_model,
                seed.model_provider,
                seed.temperature,
                seed.max_tokens,
                seed.system_prompt,
                seed.capabilities.to_string(),
            ],
        )?;
        info!("Created new AI agent: {}", seed.name);

        Self::agent_by_name(&db, &seed.name)?
            .ok_or_else(|| anyhow!("agent vanished after insert: {}", seed.name))
    }

    pub async fn get_agent(&self, id: &str) -> Result<Option<AgentRecord>> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!("SELECT {} FROM agents WHERE id = ?1", AGENT_COLUMNS),
                params![id],
                Self::map_agent,
            )
            .optional()?;
        Ok(record)
    }

    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {} FROM agents ORDER BY last_activity DESC",
            AGENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_agent)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub async fn agent_statistics(&self) -> Result<AgentStatistics> {
        let db = self.db.lock().await;

        let total_agents: i64 = db.query_row("SELECT COUNT(*) FROM agents", [], |r| r.get(0))?;
        let active_agents: i64 = db.query_row(
            "SELECT COUNT(*) FROM agents WHERE is_active = 1",
            [],
            |r| r.get(0),
        )?;
        let total_decisions: i64 =
            db.query_row("SELECT COUNT(*) FROM decisions", [], |r| r.get(0))?;
        let successful_decisions: i64 = db.query_row(
            "SELECT COUNT(*) FROM decisions WHERE success = 1",
            [],
            |r| r.get(0),
        )?;

        let mut agent_types: HashMap<String, i64> = HashMap::new();
        let mut stmt = db.prepare("SELECT agent_type, COUNT(*) FROM agents GROUP BY agent_type")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (kind, count) = row?;
            agent_types.insert(kind, count);
        }

        let average_success_rate = if total_decisions > 0 {
            successful_decisions as f64 / total_decisions as f64
        } else {
            0.0
        };

        Ok(AgentStatistics {
            total_agents,
            active_agents,
            total_decisions,
            successful_decisions,
            average_success_rate,
            agent_types,
        })
    }

    fn agent_by_name(db: &Connection, name: &str) -> Result<Option<AgentRecord>> {
        let record = db
            .query_row(
                &format!("SELECT {} FROM agents WHERE name = ?1", AGENT_COLUMNS),
                params![name],
                Self::map_agent,
            )
            .optional()?;
        Ok(record)
    }

    fn map_agent(row: &Row) -> rusqlite::Result<AgentRecord> {
        let capabilities_raw: String = row.get(9)?;
        Ok(AgentRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            agent_type: row.get(2)?,
            ai_model: row.get(3)?,
            model_provider: row.get(4)?,
            temperature: row.get(5)?,
            max_tokens: row.get(6)?,
            is_active: row.get::<_, i64>(7)? != 0,
            system_prompt: row.get(8)?,
            capabilities: serde_json::from_str(&capabilities_raw)
                .unwrap_or_else(|_| serde_json::json!({})),
            tasks_completed: row.get(10)?,
            total_decisions: row.get(11)?,
            created_at: row.get(12)?,
            last_activity: row.get(13)?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = AgentStore::open_in_memory().unwrap();
        let first = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();
        let second = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let all = store.list_agents().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].agent_type, "master");
        assert!(all[0].is_active);
    }

    #[tokio::test]
    async fn capabilities_survive_the_roundtrip() {
        let store = AgentStore::open_in_memory().unwrap();
        let agent = store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();
        assert_eq!(agent.capabilities["content_analysis"], true);
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("hunter.db");
        let store = AgentStore::open(&db_path).await.unwrap();
        assert!(db_path.exists());

        store
            .get_or_create_agent(&test_support::seed("Hunter"))
            .await
            .unwrap();
        assert_eq!(store.list_agents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn statistics_on_empty_store() {
        let store = AgentStore::open_in_memory().unwrap();
        let stats = store.agent_statistics().await.unwrap();
        assert_eq!(stats.total_agents, 0);
        assert_eq!(stats.total_decisions, 0);
        assert_eq!(stats.average_success_rate, 0.0);
    }
}
