use anyhow::Result;
use rusqlite::{Row, params};

use super::AgentStore;
use super::types::{NewScholarship, ScholarshipFilter, ScholarshipRecord, ScholarshipStatistics};

impl AgentStore {
    pub async fn insert_scholarship(&self, new: NewScholarship) -> Result<ScholarshipRecord> {
        let id = uuid::Uuid::new_v4().to_string();

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO scholarships (id, name, provider, country, field_of_study,
                academic_level, target_eligible, funding_type, funding_amount,
                application_deadline, application_url, ai_relevance_score,
                web_dev_relevance_score, it_relevance_score, overall_relevance_score, source_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                id,
                new.name,
                new.provider,
                new.country,
                new.field_of_study,
                new.academic_level,
                new.target_eligible as i64,
                new.funding_type,
                new.funding_amount,
                new.application_deadline,
                new.application_url,
                new.ai_relevance_score,
                new.web_dev_relevance_score,
                new.it_relevance_score,
                new.overall_relevance_score,
                new.source_url,
            ],
        )?;

        let discovered_at: String = db.query_row(
            "SELECT discovered_at FROM scholarships WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(ScholarshipRecord {
            id,
            name: new.name,
            provider: new.provider,
            country: new.country,
            field_of_study: new.field_of_study,
            academic_level: new.academic_level,
            target_eligible: new.target_eligible,
            funding_type: new.funding_type,
            funding_amount: new.funding_amount,
            application_deadline: new.application_deadline,
            application_url: new.application_url,
            ai_relevance_score: new.ai_relevance_score,
            web_dev_relevance_score: new.web_dev_relevance_score,
            it_relevance_score: new.it_relevance_score,
            overall_relevance_score: new.overall_relevance_score,
            source_url: new.source_url,
            discovered_at,
        })
    }

    /// List scholarships ordered by overall relevance, applying the filter.
    pub async fn list_scholarships(
        &self,
        filter: &ScholarshipFilter,
    ) -> Result<Vec<ScholarshipRecord>> {
        let limit = filter.limit.unwrap_or(100).clamp(1, 500);

        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, provider, country, field_of_study, academic_level,
                    target_eligible, funding_type, funding_amount, application_deadline,
                    application_url, ai_relevance_score, web_dev_relevance_score,
                    it_relevance_score, overall_relevance_score, source_url, discovered_at
             FROM scholarships
             ORDER BY overall_relevance_score DESC, discovered_at DESC",
        )?;
        let rows = stmt.query_map([], Self::map_scholarship)?;

        let mut results = Vec::new();
        for row in rows {
            let record = row?;
            if let Some(eligible) = filter.eligible
                && record.target_eligible != eligible
            {
                continue;
            }
            if let Some(funding) = &filter.funding
                && &record.funding_type != funding
            {
                continue;
            }
            if let Some(min_score) = filter.min_score
                && record.overall_relevance_score < min_score
            {
                continue;
            }
            results.push(record);
            if results.len() >= limit {
                break;
            }
        }
        Ok(results)
    }

    pub async fn scholarship_statistics(&self) -> Result<ScholarshipStatistics> {
        let db = self.db.lock().await;
        let total: i64 = db.query_row("SELECT COUNT(*) FROM scholarships", [], |r| r.get(0))?;
        let target_eligible: i64 = db.query_row(
            "SELECT COUNT(*) FROM scholarships WHERE target_eligible = 1",
            [],
            |r| r.get(0),
        )?;
        let fully_funded: i64 = db.query_row(
            "SELECT COUNT(*) FROM scholarships WHERE funding_type = 'full'",
            [],
            |r| r.get(0),
        )?;
        let average_relevance: f64 = db.query_row(
            "SELECT COALESCE(AVG(overall_relevance_score), 0.0) FROM scholarships",
            [],
            |r| r.get(0),
        )?;

        Ok(ScholarshipStatistics {
            total,
            target_eligible,
            fully_funded,
            average_relevance,
        })
    }

    fn map_scholarship(row: &Row) -> rusqlite::Result<ScholarshipRecord> {
        Ok(ScholarshipRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            provider: row.get(2)?,
            country: row.get(3)?,
            field_of_study: row.get(4)?,
            academic_level: row.get(5)?,
            target_eligible: row.get::<_, i64>(6)? != 0,
            funding_type: row.get(7)?,
            funding_amount: row.get(8)?,
            application_deadline: row.get(9)?,
            application_url: row.get(10)?,
            ai_relevance_score: row.get(11)?,
            web_dev_relevance_score: row.get(12)?,
            it_relevance_score: row.get(13)?,
            overall_relevance_score: row.get(14)?,
            source_url: row.get(15)?,
            discovered_at: row.get(16)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::AgentStore;
    use super::*;

    fn sample(name: &str, eligible: bool, funding: &str, score: f64) -> NewScholarship {
        NewScholarship {
            name: name.to_string(),
            provider: "Test University".to_string(),
            country: "Germany".to_string(),
            field_of_study: "Computer Science".to_string(),
            academic_level: "master".to_string(),
            target_eligible: eligible,
            funding_type: funding.to_string(),
            funding_amount: "full tuition".to_string(),
            application_deadline: None,
            application_url: "https://example.org/apply".to_string(),
            ai_relevance_score: score,
            web_dev_relevance_score: score,
            it_relevance_score: score,
            overall_relevance_score: score,
            source_url: "https://example.org".to_string(),
        }
    }

    #[tokio::test]
    async fn listing_orders_by_relevance_and_filters() {
        let store = AgentStore::open_in_memory().unwrap();
        store
            .insert_scholarship(sample("Low", true, "partial", 0.3))
            .await
            .unwrap();
        store
            .insert_scholarship(sample("High", true, "full", 0.9))
            .await
            .unwrap();
        store
            .insert_scholarship(sample("Ineligible", false, "full", 0.95))
            .await
            .unwrap();

        let all = store
            .list_scholarships(&ScholarshipFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Ineligible"); // highest score first

        let eligible = store
            .list_scholarships(&ScholarshipFilter {
                eligible: Some(true),
                min_score: Some(0.5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].name, "High");

        let partial = store
            .list_scholarships(&ScholarshipFilter {
                funding: Some("partial".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(partial.len(), 1);
    }

    #[tokio::test]
    async fn statistics_aggregate_counts() {
        let store = AgentStore::open_in_memory().unwrap();
        store
            .insert_scholarship(sample("A", true, "full", 0.8))
            .await
            .unwrap();
        store
            .insert_scholarship(sample("B", false, "partial", 0.4))
            .await
            .unwrap();

        let stats = store.scholarship_statistics().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.target_eligible, 1);
        assert_eq!(stats.fully_funded, 1);
        assert!((stats.average_relevance - 0.6).abs() < 1e-9);
    }
}
