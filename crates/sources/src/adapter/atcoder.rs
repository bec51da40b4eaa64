//! AtCoder contest listing adapter.
//!
//! Uses the kenkoooo.com AtCoder Problems mirror, which serves the full
//! contest archive as a single JSON array.

use crate::error::SourceError;
use contest_core::{Contest, Platform};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct AtCoderContest {
    id: Option<String>,
    title: Option<String>,
    start_epoch_second: Option<i64>,
}

/// AtCoder REST adapter.
pub struct AtCoderAdapter;

impl AtCoderAdapter {
    const URL: &'static str = "https://kenkoooo.com/atcoder/resources/contests.json";

    /// Fetch upcoming AtCoder contests. Never fails: errors are logged and
    /// produce an empty listing.
    pub async fn fetch(client: &reqwest::Client, now: i64) -> Vec<Contest> {
        match Self::fetch_inner(client, now).await {
            Ok(contests) => contests,
            Err(e) => {
                warn!(error = %e, "AtCoder fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_inner(client: &reqwest::Client, now: i64) -> Result<Vec<Contest>, SourceError> {
        let response = client.get(Self::URL).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }
        let body = response.text().await?;
        Self::parse(&body, now)
    }

    /// Parse the contest archive, keeping contests that start after `now`.
    pub fn parse(body: &str, now: i64) -> Result<Vec<Contest>, SourceError> {
        let payload: Vec<AtCoderContest> = serde_json::from_str(body)?;

        let contests = payload
            .into_iter()
            .filter_map(|c| {
                let start_epoch = c.start_epoch_second.filter(|&t| t > now)?;
                let id = c.id?;
                Some(Contest {
                    id: Platform::AtCoder.contest_id(&id),
                    name: c.title.unwrap_or_else(|| "AtCoder Contest".to_string()),
                    start_epoch,
                    platform: Platform::AtCoder,
                    url: format!("https://atcoder.jp/contests/{}", id),
                })
            })
            .collect();

        Ok(contests)
    }
}
