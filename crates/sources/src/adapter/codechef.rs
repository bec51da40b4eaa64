//! CodeChef contest listing adapter.

use crate::error::SourceError;
use chrono::{DateTime, NaiveDateTime};
use contest_core::{Contest, Platform};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct CodeChefResponse {
    #[serde(default)]
    future_contests: Vec<CodeChefContest>,
}

#[derive(Debug, Deserialize)]
struct CodeChefContest {
    contest_code: Option<String>,
    contest_name: Option<String>,
    contest_start_date_iso: Option<String>,
}

/// CodeChef REST adapter.
pub struct CodeChefAdapter;

impl CodeChefAdapter {
    const URL: &'static str = "https://www.codechef.com/api/list/contests/all";
    // CodeChef rejects requests without a browser-looking user agent.
    const USER_AGENT: &'static str = "Mozilla/5.0";

    /// Fetch upcoming CodeChef contests. Never fails: errors are logged and
    /// produce an empty listing.
    pub async fn fetch(client: &reqwest::Client, now: i64) -> Vec<Contest> {
        match Self::fetch_inner(client, now).await {
            Ok(contests) => contests,
            Err(e) => {
                warn!(error = %e, "CodeChef fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_inner(client: &reqwest::Client, now: i64) -> Result<Vec<Contest>, SourceError> {
        let response = client
            .get(Self::URL)
            .header(reqwest::header::USER_AGENT, Self::USER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }
        let body = response.text().await?;
        Self::parse(&body, now)
    }

    /// Parse the `future_contests` listing, keeping contests whose ISO start
    /// date parses and lies after `now`. Entries with a missing or malformed
    /// date are skipped.
    pub fn parse(body: &str, now: i64) -> Result<Vec<Contest>, SourceError> {
        let payload: CodeChefResponse = serde_json::from_str(body)?;

        let contests = payload
            .future_contests
            .into_iter()
            .filter_map(|c| {
                let start_epoch =
                    parse_start_date(c.contest_start_date_iso.as_deref()?).filter(|&t| t > now)?;
                let code = c.contest_code?;
                Some(Contest {
                    id: Platform::CodeChef.contest_id(&code),
                    name: c
                        .contest_name
                        .unwrap_or_else(|| "CodeChef Contest".to_string()),
                    start_epoch,
                    platform: Platform::CodeChef,
                    url: format!("https://www.codechef.com/{}", code),
                })
            })
            .collect();

        Ok(contests)
    }
}

/// Parse the ISO start date to epoch seconds. CodeChef serves RFC 3339 with
/// a zone offset; a zone-less timestamp is read as UTC.
fn parse_start_date(iso: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Some(dt.timestamp());
    }
    NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}
