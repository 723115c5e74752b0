use anyhow::Result;

use crate::core::config::HunterConfig;
use crate::core::store::AgentStore;
use crate::core::store::types::NewScholarship;

/// Load a set of real, well-known scholarship programs so the dashboard has
/// data before the first hunt runs.
pub async fn run() -> Result<()> {
    let data_dir = HunterConfig::resolve_data_dir();
    let store = AgentStore::open(data_dir.join("hunter.db")).await?;

    let samples = sample_scholarships();
    let total = samples.len();
    for scholarship in samples {
        store.insert_scholarship(scholarship).await?;
    }

    println!("Seeded {} sample scholarships into {}", total, data_dir.display());
    Ok(())
}

fn entry(
    name: &str,
    provider: &str,
    country: &str,
    field: &str,
    funding_amount: &str,
    url: &str,
    scores: (f64, f64, f64),
) -> NewScholarship {
    let (ai, web_dev, it) = scores;
    NewScholarship {
        name: name.to_string(),
        provider: provider.to_string(),
        country: country.to_string(),
        field_of_study: field.to_string(),
        academic_level: "master".to_string(),
        target_eligible: true,
        funding_type: "full".to_string(),
        funding_amount: funding_amount.to_string(),
        application_deadline: None,
        application_url: url.to_string(),
        ai_relevance_score: ai,
        web_dev_relevance_score: web_dev,
        it_relevance_score: it,
        overall_relevance_score: (ai + web_dev + it) / 3.0,
        source_url: url.to_string(),
    }
}

pub(crate) fn sample_scholarships() -> Vec<NewScholarship> {
    vec![
        entry(
            "Gates Cambridge Scholarship",
            "University of Cambridge",
            "United Kingdom",
            "Computer Science",
            "Full cost of studying plus living allowance",
            "https://www.gatescambridge.org/apply/",
            (0.95, 0.80, 0.90),
        ),
        entry(
            "Fulbright Foreign Student Program",
            "Fulbright Commission",
            "United States",
            "Computer Science",
            "Full tuition, living stipend and health insurance",
            "https://foreign.fulbrightonline.org/",
            (0.88, 0.85, 0.92),
        ),
        entry(
            "DAAD Development-Related Postgraduate Courses",
            "DAAD Germany",
            "Germany",
            "Information Technology",
            "861 EUR monthly plus tuition coverage",
            "https://www.daad.de/en/",
            (0.82, 0.88, 0.95),
        ),
        entry(
            "Erasmus Mundus Joint Master in Data Science",
            "European Commission",
            "Multiple EU Countries",
            "Computer Science",
            "1,400 EUR monthly plus travel allowance",
            "https://erasmus-plus.ec.europa.eu/",
            (0.93, 0.75, 0.89),
        ),
        entry(
            "Chevening Scholarships",
            "UK Government",
            "United Kingdom",
            "Computer Science",
            "Full tuition, living allowance and flights",
            "https://www.chevening.org/apply/",
            (0.87, 0.83, 0.91),
        ),
    ]
}
