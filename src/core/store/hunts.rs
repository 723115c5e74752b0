use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

use super::AgentStore;
use super::types::HuntSessionRecord;

impl AgentStore {
    pub async fn create_hunt_session(
        &self,
        name: &str,
        target_count: i64,
        strategy: &str,
    ) -> Result<HuntSessionRecord> {
        let id = uuid::Uuid::new_v4().to_string();

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO hunt_sessions (id, name, status, target_count, strategy)
             VALUES (?1, ?2, 'running', ?3, ?4)",
            params![id, name, target_count, strategy],
        )?;

        db.query_row(
            &format!(
                "SELECT {} FROM hunt_sessions WHERE id = ?1",
                Self::HUNT_COLUMNS
            ),
            params![id],
            Self::map_hunt_session,
        )
        .map_err(Into::into)
    }

    pub async fn active_hunt_session(&self) -> Result<Option<HuntSessionRecord>> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!(
                    "SELECT {} FROM hunt_sessions WHERE status = 'running'
                     ORDER BY started_at DESC LIMIT 1",
                    Self::HUNT_COLUMNS
                ),
                [],
                Self::map_hunt_session,
            )
            .optional()?;
        Ok(record)
    }

    pub async fn bump_hunt_progress(
        &self,
        session_id: &str,
        found_delta: i64,
        visited_delta: i64,
    ) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "UPDATE hunt_sessions
             SET scholarships_found = scholarships_found + ?2,
                 sources_visited = sources_visited + ?3
             WHERE id = ?1",
            params![session_id, found_delta, visited_delta],
        )?;
        Ok(())
    }

    pub async fn finish_hunt_session(&self, session_id: &str, status: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "UPDATE hunt_sessions SET status = ?2, ended_at = CURRENT_TIMESTAMP WHERE id = ?1",
            params![session_id, status],
        )?;
        Ok(())
    }

    /// Mark every running session as stopped. Returns how many were affected.
    pub async fn stop_running_hunts(&self) -> Result<usize> {
        let db = self.db.lock().await;
        let changed = db.execute(
            "UPDATE hunt_sessions SET status = 'stopped', ended_at = CURRENT_TIMESTAMP
             WHERE status = 'running'",
            [],
        )?;
        Ok(changed)
    }

    const HUNT_COLUMNS: &'static str = "id, name, status, target_count, scholarships_found, \
         sources_visited, strategy, started_at, ended_at";

    fn map_hunt_session(row: &Row) -> rusqlite::Result<HuntSessionRecord> {
        Ok(HuntSessionRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            status: row.get(2)?,
            target_count: row.get(3)?,
            scholarships_found: row.get(4)?,
            sources_visited: row.get(5)?,
            strategy: row.get(6)?,
            started_at: row.get(7)?,
            ended_at: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::AgentStore;

    #[tokio::test]
    async fn session_lifecycle() {
        let store = AgentStore::open_in_memory().unwrap();
        let session = store
            .create_hunt_session("Live Hunt", 50, "CS + AI, EU focus")
            .await
            .unwrap();
        assert_eq!(session.status, "running");
        assert_eq!(session.target_count, 50);
        assert!(session.ended_at.is_none());

        let active = store.active_hunt_session().await.unwrap();
        assert_eq!(active.unwrap().id, session.id);

        store.bump_hunt_progress(&session.id, 3, 1).await.unwrap();
        store
            .finish_hunt_session(&session.id, "completed")
            .await
            .unwrap();

        assert!(store.active_hunt_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stop_running_hunts_marks_all() {
        let store = AgentStore::open_in_memory().unwrap();
        store.create_hunt_session("A", 10, "").await.unwrap();
        store.create_hunt_session("B", 10, "").await.unwrap();

        let stopped = store.stop_running_hunts().await.unwrap();
        assert_eq!(stopped, 2);
        assert!(store.active_hunt_session().await.unwrap().is_none());
    }
}
