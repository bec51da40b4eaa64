//! Contest aggregation across all platforms.

use crate::adapter::{AtCoderAdapter, CodeChefAdapter, CodeforcesAdapter, LeetCodeAdapter};
use contest_core::{Contest, Platform};
use tracing::debug;

/// Per-request timeout. Bounds how long one slow platform can hold up a
/// poll; the fetches themselves run concurrently.
const FETCH_TIMEOUT_SECS: u64 = 15;

/// Aggregated contest feed over every supported platform.
pub struct ContestFeed {
    client: reqwest::Client,
}

impl Default for ContestFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ContestFeed {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Fetch the upcoming contest listings of all platforms concurrently and
    /// concatenate them. Order across platforms is unspecified. A failed
    /// platform contributes nothing; the call itself never fails.
    pub async fn fetch_all(&self, now: i64) -> Vec<Contest> {
        let (codeforces, leetcode, atcoder, codechef) = tokio::join!(
            CodeforcesAdapter::fetch(&self.client),
            LeetCodeAdapter::fetch(&self.client, now),
            AtCoderAdapter::fetch(&self.client, now),
            CodeChefAdapter::fetch(&self.client, now),
        );

        debug!(
            codeforces = codeforces.len(),
            leetcode = leetcode.len(),
            atcoder = atcoder.len(),
            codechef = codechef.len(),
            "Fetched contest listings"
        );

        let mut contests = codeforces;
        contests.extend(leetcode);
        contests.extend(atcoder);
        contests.extend(codechef);
        contests
    }
}

/// The next `limit` contests on the enabled platforms, ascending by start.
pub fn upcoming(contests: &[Contest], platforms: &[Platform], limit: usize) -> Vec<Contest> {
    let mut filtered: Vec<Contest> = contests
        .iter()
        .filter(|c| platforms.contains(&c.platform))
        .cloned()
        .collect();
    filtered.sort_by_key(|c| c.start_epoch);
    filtered.truncate(limit);
    filtered
}

/// The single soonest contest on the enabled platforms.
pub fn next_contest(contests: &[Contest], platforms: &[Platform]) -> Option<Contest> {
    contests
        .iter()
        .filter(|c| platforms.contains(&c.platform))
        .min_by_key(|c| c.start_epoch)
        .cloned()
}

/// The latest `limit` contests by start time on the enabled platforms,
/// descending. Deliberately not filtered by time direction: "recent" means
/// latest by start time, future contests included.
pub fn recent(contests: &[Contest], platforms: &[Platform], limit: usize) -> Vec<Contest> {
    let mut filtered: Vec<Contest> = contests
        .iter()
        .filter(|c| platforms.contains(&c.platform))
        .cloned()
        .collect();
    filtered.sort_by_key(|c| std::cmp::Reverse(c.start_epoch));
    filtered.truncate(limit);
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contest(id: &str, platform: Platform, start_epoch: i64) -> Contest {
        Contest {
            id: id.to_string(),
            name: format!("Contest {}", id),
            start_epoch,
            platform,
            url: format!("https://example.com/{}", id),
        }
    }

    fn sample() -> Vec<Contest> {
        vec![
            contest("cf_1", Platform::Codeforces, 5_000),
            contest("lc_1", Platform::LeetCode, 2_000),
            contest("ac_1", Platform::AtCoder, 4_000),
            contest("cc_1", Platform::CodeChef, 1_000),
            contest("cf_2", Platform::Codeforces, 3_000),
            contest("ac_2", Platform::AtCoder, 6_000),
        ]
    }

    #[test]
    fn test_upcoming_filters_sorts_and_limits() {
        // 6 contests, 2 enabled platforms, 4 matching entries, limit 3.
        let platforms = [Platform::Codeforces, Platform::AtCoder];
        let result = upcoming(&sample(), &platforms, 3);
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cf_2", "ac_1", "cf_1"]);

        let result = upcoming(&sample(), &platforms, 10);
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cf_2", "ac_1", "cf_1", "ac_2"]);
    }

    #[test]
    fn test_next_contest_is_minimum_by_start() {
        let result = next_contest(&sample(), &Platform::ALL).unwrap();
        assert_eq!(result.id, "cc_1");

        let result = next_contest(&sample(), &[Platform::LeetCode]).unwrap();
        assert_eq!(result.id, "lc_1");

        assert_eq!(next_contest(&[], &Platform::ALL), None);
    }

    #[test]
    fn test_recent_sorts_descending() {
        let result = recent(&sample(), &Platform::ALL, 10);
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ac_2", "cf_1", "ac_1", "cf_2", "lc_1", "cc_1"]);
    }

    #[test]
    fn test_recent_respects_platform_filter_and_limit() {
        let result = recent(&sample(), &[Platform::Codeforces], 1);
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cf_1"]);
    }
}
