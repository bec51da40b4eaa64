//! Codeforces contest listing adapter.

use crate::error::SourceError;
use contest_core::{Contest, Platform};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct CodeforcesResponse {
    #[serde(default)]
    result: Vec<CodeforcesContest>,
}

#[derive(Debug, Deserialize)]
struct CodeforcesContest {
    id: i64,
    name: Option<String>,
    phase: Option<String>,
    #[serde(rename = "startTimeSeconds")]
    start_time_seconds: Option<i64>,
}

/// Codeforces REST adapter.
pub struct CodeforcesAdapter;

impl CodeforcesAdapter {
    const URL: &'static str = "https://codeforces.com/api/contest.list";

    /// Fetch upcoming Codeforces contests. Never fails: errors are logged
    /// and produce an empty listing.
    pub async fn fetch(client: &reqwest::Client) -> Vec<Contest> {
        match Self::fetch_inner(client).await {
            Ok(contests) => contests,
            Err(e) => {
                warn!(error = %e, "Codeforces fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_inner(client: &reqwest::Client) -> Result<Vec<Contest>, SourceError> {
        let response = client.get(Self::URL).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }
        let body = response.text().await?;
        Self::parse(&body)
    }

    /// Parse the contest.list payload, keeping contests in the `BEFORE`
    /// phase (not yet started) that carry a start time.
    pub fn parse(body: &str) -> Result<Vec<Contest>, SourceError> {
        let payload: CodeforcesResponse = serde_json::from_str(body)?;

        let contests = payload
            .result
            .into_iter()
            .filter(|c| c.phase.as_deref() == Some("BEFORE"))
            .filter_map(|c| {
                let start_epoch = c.start_time_seconds?;
                Some(Contest {
                    id: Platform::Codeforces.contest_id(&c.id.to_string()),
                    name: c.name.unwrap_or_else(|| "Codeforces Contest".to_string()),
                    start_epoch,
                    platform: Platform::Codeforces,
                    url: format!("https://codeforces.com/contest/{}", c.id),
                })
            })
            .collect();

        Ok(contests)
    }
}
