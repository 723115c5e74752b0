use anyhow::{Result, anyhow};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::core::agent::{HunterAgent, ScholarshipCandidate};
use crate::core::broadcast::DashboardBroadcaster;
use crate::core::store::AgentStore;
use crate::core::store::types::{HuntSessionRecord, Importance, NewScholarship};

const DEFAULT_TARGET_COUNT: i64 = 50;

/// A scholarship source to sweep: a page we already hold content for.
/// Fetching/scraping lives elsewhere; the hunt only analyzes.
#[derive(Debug, Clone, Deserialize)]
pub struct HuntSource {
    pub name: String,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HuntRequest {
    #[serde(default)]
    pub max_scholarships: Option<i64>,
}

/// Owns the lifecycle of live hunt sessions: at most one running at a time,
/// cooperatively stoppable between sources.
pub struct HuntCoordinator {
    store: Arc<AgentStore>,
    agent: Arc<HunterAgent>,
    broadcaster: DashboardBroadcaster,
    sources: Vec<HuntSource>,
    pace_ms: u64,
    stop: Arc<AtomicBool>,
}

impl HuntCoordinator {
    pub fn new(
        store: Arc<AgentStore>,
        agent: Arc<HunterAgent>,
        broadcaster: DashboardBroadcaster,
        sources: Vec<HuntSource>,
        pace_ms: u64,
    ) -> Self {
        Self {
            store,
            agent,
            broadcaster,
            sources,
            pace_ms,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a hunt session in the background. Rejected while one is running.
    pub async fn start(&self, request: HuntRequest) -> Result<HuntSessionRecord> {
        if self.store.active_hunt_session().await?.is_some() {
            return Err(anyhow!("a hunt is already in progress"));
        }

        let target = request.max_scholarships.unwrap_or(DEFAULT_TARGET_COUNT).max(1);
        let strategy = format!(
            "Live sweep across {} configured sources",
            self.sources.len()
        );
        let session = self
            .store
            .create_hunt_session("Live Hunt", target, &strategy)
            .await?;

        self.stop.store(false, Ordering::Relaxed);

        let store = self.store.clone();
        let agent = self.agent.clone();
        let broadcaster = self.broadcaster.clone();
        let sources = self.sources.clone();
        let pace_ms = self.pace_ms;
        let stop = self.stop.clone();
        let spawned_session = session.clone();
        tokio::spawn(async move {
            run_session(store, agent, broadcaster, sources, pace_ms, stop, spawned_session).await;
        });

        Ok(session)
    }

    /// Signal the running session (if any) to stop and mark its row.
    pub async fn stop(&self) -> Result<usize> {
        self.stop.store(true, Ordering::Relaxed);
        let stopped = self.store.stop_running_hunts().await?;
        info!("Stopped {} running hunt session(s)", stopped);
        Ok(stopped)
    }

    pub async fn status(&self) -> Result<Option<HuntSessionRecord>> {
        self.store.active_hunt_session().await
    }
}

async fn run_session(
    store: Arc<AgentStore>,
    agent: Arc<HunterAgent>,
    broadcaster: DashboardBroadcaster,
    mut sources: Vec<HuntSource>,
    pace_ms: u64,
    stop: Arc<AtomicBool>,
    session: HuntSessionRecord,
) {
    broadcaster.publish_hunt_status("Starting AI scholarship hunt");
    if let Err(e) = agent
        .think(
            "Initializing scholarship discovery sweep",
            "planning",
            Importance::High,
        )
        .await
    {
        warn!("Could not record hunt planning thought: {}", e);
    }

    sources.shuffle(&mut rand::thread_rng());

    let mut found: i64 = 0;
    for source in &sources {
        if stop.load(Ordering::Relaxed) || found >= session.target_count {
            break;
        }

        if let Err(e) = agent
            .think(
                &format!("Visiting {} ({})", source.name, source.url),
                "discovery",
                Importance::Medium,
            )
            .await
        {
            warn!("Could not record visit thought: {}", e);
        }
        broadcaster.publish_source_visit(&source.name, &source.url);

        let report = agent
            .analyze_content(&source.content, &source.url, "scholarship_detection")
            .await;

        let mut saved_here: i64 = 0;
        if let Some(error) = &report.error {
            warn!("Skipping {} after analysis error: {}", source.url, error);
        } else {
            for candidate in &report.scholarships {
                if candidate.name.trim().is_empty() {
                    continue;
                }
                match store
                    .insert_scholarship(candidate_to_record(candidate, &source.url))
                    .await
                {
                    Ok(saved) => {
                        saved_here += 1;
                        found += 1;
                        broadcaster.publish_scholarship(&saved);
                    }
                    Err(e) => warn!("Could not save scholarship from {}: {}", source.url, e),
                }
            }
        }

        if let Err(e) = store.bump_hunt_progress(&session.id, saved_here, 1).await {
            warn!("Could not update hunt progress: {}", e);
        }

        if pace_ms > 0 {
            let jitter = rand::thread_rng().gen_range(0.8..1.2);
            let delay = (pace_ms as f64 * jitter) as u64;
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
    }

    let status = if stop.load(Ordering::Relaxed) {
        "stopped"
    } else {
        "completed"
    };
    if let Err(e) = store.finish_hunt_session(&session.id, status).await {
        warn!("Could not finish hunt session: {}", e);
    }

    broadcaster.publish_hunt_status(&format!(
        "Hunt {}: {} scholarships found",
        status, found
    ));
    if let Err(e) = agent
        .think(
            &format!("Hunt {} with {} scholarships discovered", status, found),
            "reflection",
            Importance::High,
        )
        .await
    {
        warn!("Could not record hunt summary thought: {}", e);
    }
    info!("Hunt session {} {}: {} scholarships", session.id, status, found);
}

fn candidate_to_record(candidate: &ScholarshipCandidate, source_url: &str) -> NewScholarship {
    let application_url = match url::Url::parse(&candidate.application_url) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => String::new(),
    };
    let academic_level = if candidate.academic_level.trim().is_empty() {
        "any".to_string()
    } else {
        candidate.academic_level.clone()
    };

    NewScholarship {
        name: candidate.name.clone(),
        provider: candidate.provider.clone(),
        country: candidate.country.clone(),
        field_of_study: candidate.field_of_study.clone(),
        academic_level,
        target_eligible: candidate.target_eligible,
        funding_type: if candidate.funding_type.trim().is_empty() {
            "full".to_string()
        } else {
            candidate.funding_type.clone()
        },
        funding_amount: candidate.funding_amount.clone(),
        application_deadline: candidate.application_deadline.clone(),
        application_url,
        ai_relevance_score: candidate.relevance_scores.ai,
        web_dev_relevance_score: candidate.relevance_scores.web_dev,
        it_relevance_score: candidate.relevance_scores.it,
        overall_relevance_score: candidate.relevance_scores.overall(),
        source_url: source_url.to_string(),
    }
}

/// Built-in sources used when the config file doesn't provide any. Content is
/// a cached snapshot of each funding page, kept short.
pub fn default_sources() -> Vec<HuntSource> {
    vec![
        HuntSource {
            name: "University of Cambridge".to_string(),
            url: "https://www.cambridge.example/graduate-funding".to_string(),
            content: "Gates Cambridge Scholarships\n\
                Full funding for international students across all subjects, \
                including Computer Science. Covers the full cost of study plus \
                a living allowance. Open to applicants worldwide."
                .to_string(),
        },
        HuntSource {
            name: "DAAD Germany".to_string(),
            url: "https://www.daad.example/en/scholarships".to_string(),
            content: "DAAD Development-Related Postgraduate Courses\n\
                Monthly stipend of 861 EUR plus tuition coverage for students \
                from developing countries. Fields include IT, Computer Science \
                and Engineering. Duration 12-24 months."
                .to_string(),
        },
        HuntSource {
            name: "Fulbright Program".to_string(),
            url: "https://www.fulbright.example/foreign-student".to_string(),
            content: "Fulbright Foreign Student Program\n\
                Master's and PhD programs in the US with full funding: tuition, \
                living stipend and health insurance. All academic disciplines \
                including Computer Science."
                .to_string(),
        },
        HuntSource {
            name: "Erasmus Mundus".to_string(),
            url: "https://erasmus.example/joint-masters".to_string(),
            content: "Erasmus Mundus Joint Master Degrees\n\
                Monthly allowance of 1,400 EUR with travel and installation \
                allowances. Study in two or more European countries. Programs \
                include Data Science, Computer Vision and Cybersecurity."
                .to_string(),
        },
        HuntSource {
            name: "Chevening Scholarships".to_string(),
            url: "https://www.chevening.example/apply".to_string(),
            content: "Chevening Scholarships\n\
                UK government scholarships covering full tuition fees, a \
                monthly living allowance and return flights. Eligible subjects \
                include Computer Science, AI and Data Science."
                .to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::MASTER_AGENT_NAME;
    use crate::core::config::HunterConfig;
    use crate::core::llm::testing::CannedBackend;
    use crate::core::llm::CompletionOutcome;

    const ANALYSIS_WITH_ONE: &str = r#"{
        "scholarships": [
            {"name": "Gates Cambridge", "provider": "University of Cambridge",
             "country": "United Kingdom", "target_eligible": true,
             "funding_type": "full",
             "application_url": "https://www.gatescambridge.example/apply",
             "relevance_scores": {"ai": 0.9, "web_dev": 0.8, "it": 0.85}}
        ],
        "analysis_summary": "One match."
    }"#;

    async fn coordinator_with(outcomes: Vec<CompletionOutcome>) -> (HuntCoordinator, Arc<AgentStore>) {
        let store = Arc::new(AgentStore::open_in_memory().unwrap());
        let broadcaster = DashboardBroadcaster::new();
        let agent = Arc::new(
            HunterAgent::initialize(
                store.clone(),
                Arc::new(CannedBackend::with(outcomes)),
                broadcaster.clone(),
                Arc::new(HunterConfig::default()),
                MASTER_AGENT_NAME,
                "master",
            )
            .await
            .unwrap(),
        );
        let sources = vec![HuntSource {
            name: "Cambridge".to_string(),
            url: "https://www.cambridge.example/funding".to_string(),
            content: "funding page".to_string(),
        }];
        let coordinator = HuntCoordinator::new(store.clone(), agent, broadcaster, sources, 0);
        (coordinator, store)
    }

    fn success(content: &str) -> CompletionOutcome {
        CompletionOutcome::Success {
            content: content.to_string(),
            tokens_used: 10,
            processing_time: 0.01,
        }
    }

    async fn wait_until_idle(coordinator: &HuntCoordinator) {
        for _ in 0..100 {
            if coordinator.status().await.unwrap().is_none() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("hunt session never finished");
    }

    #[tokio::test]
    async fn hunt_saves_extracted_scholarships() {
        let (coordinator, store) = coordinator_with(vec![success(ANALYSIS_WITH_ONE)]).await;

        let session = coordinator.start(HuntRequest::default()).await.unwrap();
        assert_eq!(session.status, "running");

        wait_until_idle(&coordinator).await;

        let scholarships = store
            .list_scholarships(&Default::default())
            .await
            .unwrap();
        assert_eq!(scholarships.len(), 1);
        assert_eq!(scholarships[0].name, "Gates Cambridge");
        assert!(scholarships[0].target_eligible);
        assert!((scholarships[0].overall_relevance_score - 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_running() {
        let (coordinator, store) = coordinator_with(vec![success(ANALYSIS_WITH_ONE)]).await;

        // simulate an already-running session
        store.create_hunt_session("Other", 10, "").await.unwrap();

        let result = coordinator.start(HuntRequest::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn stop_marks_sessions_stopped() {
        let (coordinator, store) = coordinator_with(vec![]).await;
        store.create_hunt_session("Other", 10, "").await.unwrap();

        let stopped = coordinator.stop().await.unwrap();
        assert_eq!(stopped, 1);
        assert!(coordinator.status().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn analysis_error_does_not_abort_the_session() {
        let (coordinator, store) = coordinator_with(vec![CompletionOutcome::Failure {
            error: "timeout".to_string(),
            processing_time: 0.01,
        }])
        .await;

        coordinator.start(HuntRequest::default()).await.unwrap();
        wait_until_idle(&coordinator).await;

        let scholarships = store
            .list_scholarships(&Default::default())
            .await
            .unwrap();
        assert!(scholarships.is_empty());
    }

    #[test]
    fn invalid_application_url_is_blanked() {
        let mut candidate = ScholarshipCandidate::default();
        candidate.name = "X".to_string();
        candidate.application_url = "not a url".to_string();
        let record = candidate_to_record(&candidate, "https://source.example");
        assert_eq!(record.application_url, "");
        assert_eq!(record.academic_level, "any");
        assert_eq!(record.funding_type, "full");
    }
}
