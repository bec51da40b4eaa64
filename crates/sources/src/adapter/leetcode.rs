//! LeetCode contest listing adapter.

use crate::error::SourceError;
use contest_core::{Contest, Platform};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct LeetCodeResponse {
    #[serde(default)]
    data: LeetCodeData,
}

#[derive(Debug, Default, Deserialize)]
struct LeetCodeData {
    #[serde(rename = "allContests", default)]
    all_contests: Vec<LeetCodeContest>,
}

#[derive(Debug, Deserialize)]
struct LeetCodeContest {
    title: Option<String>,
    #[serde(rename = "startTime")]
    start_time: Option<i64>,
    #[serde(rename = "titleSlug")]
    title_slug: Option<String>,
}

/// LeetCode GraphQL adapter.
pub struct LeetCodeAdapter;

impl LeetCodeAdapter {
    const URL: &'static str = "https://leetcode.com/graphql";
    const QUERY: &'static str = "{ allContests { title startTime titleSlug } }";

    /// Fetch upcoming LeetCode contests. Never fails: errors are logged and
    /// produce an empty listing.
    pub async fn fetch(client: &reqwest::Client, now: i64) -> Vec<Contest> {
        match Self::fetch_inner(client, now).await {
            Ok(contests) => contests,
            Err(e) => {
                warn!(error = %e, "LeetCode fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_inner(client: &reqwest::Client, now: i64) -> Result<Vec<Contest>, SourceError> {
        let response = client
            .post(Self::URL)
            .json(&json!({ "query": Self::QUERY }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }
        let body = response.text().await?;
        Self::parse(&body, now)
    }

    /// Parse the `allContests` payload, keeping contests that start after
    /// `now`. The listing includes every past contest, so the time filter
    /// does the heavy lifting here.
    pub fn parse(body: &str, now: i64) -> Result<Vec<Contest>, SourceError> {
        let payload: LeetCodeResponse = serde_json::from_str(body)?;

        let contests = payload
            .data
            .all_contests
            .into_iter()
            .filter_map(|c| {
                let start_epoch = c.start_time.filter(|&t| t > now)?;
                let slug = c.title_slug?;
                Some(Contest {
                    id: Platform::LeetCode.contest_id(&slug),
                    name: c.title.unwrap_or_else(|| "LeetCode Contest".to_string()),
                    start_epoch,
                    platform: Platform::LeetCode,
                    url: format!("https://leetcode.com/contest/{}/", slug),
                })
            })
            .collect();

        Ok(contests)
    }
}
