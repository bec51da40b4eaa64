//! The polling scheduler: the loop that decides what to send and when.
//!
//! Each tick aggregates the platform listings, announces contests never
//! seen before, and fires reminders whose offset falls inside the tolerance
//! window around the time remaining. Ledger marks are committed before the
//! corresponding delivery is attempted, so a failed delivery is never
//! re-detected and retried on a later tick.

use crate::db::{Database, StoreError};
use crate::notifier::Messenger;
use crate::settings::SubscriberSettings;
use crate::telegram::{format_new_contest, format_reminder};
use chrono::Utc;
use contest_core::Contest;
use contest_sources::ContestFeed;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Scheduler timing configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between ticks.
    pub poll_interval: Duration,
    /// Delay before the first tick after startup.
    pub first_tick_delay: Duration,
    /// Half-width of the reminder matching window, seconds. An offset `r`
    /// matches when `r - tolerance <= remaining <= r + tolerance`.
    pub tolerance_secs: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            first_tick_delay: Duration::from_secs(5),
            tolerance_secs: 60,
        }
    }
}

/// Counts of notifications produced by one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub new_contests: u32,
    pub announcements: u32,
    pub reminders: u32,
}

/// The polling loop over aggregation, ledger, and delivery.
pub struct Scheduler {
    db: Database,
    feed: Arc<ContestFeed>,
    messenger: Arc<dyn Messenger>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        db: Database,
        feed: Arc<ContestFeed>,
        messenger: Arc<dyn Messenger>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            db,
            feed,
            messenger,
            config,
        }
    }

    /// Run ticks forever. Ticks are strictly sequential: a slow tick delays
    /// the next one, it never overlaps it. A failed tick is logged and the
    /// loop continues.
    pub async fn run(&self) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "Starting reminder scheduler"
        );
        tokio::time::sleep(self.config.first_tick_delay).await;

        loop {
            let started = std::time::Instant::now();
            match self.tick().await {
                Ok(stats) => {
                    if stats.new_contests > 0 || stats.reminders > 0 {
                        info!(
                            new_contests = stats.new_contests,
                            announcements = stats.announcements,
                            reminders = stats.reminders,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Tick complete"
                        );
                    } else {
                        debug!(
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Tick complete, nothing to send"
                        );
                    }
                }
                Err(e) => {
                    error!(error = %e, "Tick failed");
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// One polling cycle: fetch, then process against the ledger.
    pub async fn tick(&self) -> Result<TickStats, SchedulerError> {
        let now = Utc::now().timestamp();
        let contests = self.feed.fetch_all(now).await;
        self.process(&contests, now).await
    }

    /// Process an aggregated contest list at time `now`. Split from
    /// [`tick`](Self::tick) so it can be driven without network access.
    pub async fn process(
        &self,
        contests: &[Contest],
        now: i64,
    ) -> Result<TickStats, SchedulerError> {
        // Snapshot subscribers and their settings once; the rest of the
        // tick works against this consistent view.
        let subscribers = self.load_subscribers().await?;
        let mut stats = TickStats::default();

        for contest in contests {
            // New-contest check. The ledger mark goes in before any
            // delivery attempt so a send failure cannot re-announce.
            if !self.db.is_announced(&contest.id).await? {
                self.db.mark_announced(&contest.id).await?;
                stats.new_contests += 1;

                let text = format_new_contest(contest);
                for (chat_id, settings) in &subscribers {
                    if settings.wants(contest.platform) && self.deliver(*chat_id, &text).await {
                        stats.announcements += 1;
                    }
                }
            }

            // Reminder check, for new and known contests alike.
            let remaining = contest.remaining(now);
            if remaining <= 0 {
                continue;
            }

            for (chat_id, settings) in &subscribers {
                if !settings.wants(contest.platform) {
                    continue;
                }
                for &offset in &settings.offsets {
                    let in_window = offset - self.config.tolerance_secs <= remaining
                        && remaining <= offset + self.config.tolerance_secs;
                    if !in_window {
                        continue;
                    }
                    if self
                        .db
                        .is_reminder_sent(&contest.id, offset, *chat_id)
                        .await?
                    {
                        continue;
                    }

                    self.db
                        .mark_reminder_sent(&contest.id, offset, *chat_id)
                        .await?;
                    if self
                        .deliver(*chat_id, &format_reminder(contest, offset))
                        .await
                    {
                        stats.reminders += 1;
                    }
                }
            }
        }

        Ok(stats)
    }

    async fn load_subscribers(&self) -> Result<Vec<(i64, SubscriberSettings)>, SchedulerError> {
        let chat_ids = self.db.list_subscribers().await?;
        let mut subscribers = Vec::with_capacity(chat_ids.len());
        for chat_id in chat_ids {
            let settings = self.db.get_settings(chat_id).await?;
            subscribers.push((chat_id, settings));
        }
        Ok(subscribers)
    }

    /// Deliver one message, isolating failures. Returns whether it went out.
    async fn deliver(&self, chat_id: i64, text: &str) -> bool {
        match self.messenger.send(chat_id, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(chat_id, error = %e, "Failed to deliver notification");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::NotifyError;
    use async_trait::async_trait;
    use contest_core::Platform;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every send; optionally fails for selected chats.
    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(i64, String)>>,
        failing: HashSet<i64>,
    }

    impl RecordingMessenger {
        fn failing_for(chat_ids: &[i64]) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing: chat_ids.iter().copied().collect(),
            }
        }

        fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
            if self.failing.contains(&chat_id) {
                return Err(NotifyError::Store(crate::db::StoreError::Sqlx(
                    sqlx::Error::RowNotFound,
                )));
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    const NOW: i64 = 1_700_000_000;

    fn contest(id: &str, platform: Platform, start_epoch: i64) -> Contest {
        Contest {
            id: id.to_string(),
            name: format!("Contest {}", id),
            start_epoch,
            platform,
            url: format!("https://example.com/{}", id),
        }
    }

    async fn scheduler_with(
        messenger: Arc<RecordingMessenger>,
    ) -> (Scheduler, Database) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let scheduler = Scheduler::new(
            db.clone(),
            Arc::new(ContestFeed::new()),
            messenger,
            SchedulerConfig::default(),
        );
        (scheduler, db)
    }

    #[tokio::test]
    async fn test_new_contest_announced_once() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (scheduler, db) = scheduler_with(Arc::clone(&messenger)).await;
        db.subscribe(100).await.unwrap();

        let contests = vec![contest("cf_1", Platform::Codeforces, NOW + 500_000)];

        let stats = scheduler.process(&contests, NOW).await.unwrap();
        assert_eq!(stats.new_contests, 1);
        assert_eq!(stats.announcements, 1);

        // Second tick: already in the ledger, nothing sent.
        let stats = scheduler.process(&contests, NOW + 300).await.unwrap();
        assert_eq!(stats.new_contests, 0);
        assert_eq!(stats.announcements, 0);
        assert_eq!(messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_announcement_respects_platform_filter() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (scheduler, db) = scheduler_with(Arc::clone(&messenger)).await;
        db.subscribe(100).await.unwrap();
        db.subscribe(200).await.unwrap();
        db.save_settings(
            200,
            &SubscriberSettings {
                platforms: vec![Platform::LeetCode],
                offsets: vec![3_600],
            },
        )
        .await
        .unwrap();

        let contests = vec![contest("cf_1", Platform::Codeforces, NOW + 500_000)];
        let stats = scheduler.process(&contests, NOW).await.unwrap();

        assert_eq!(stats.announcements, 1);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 100);
    }

    #[tokio::test]
    async fn test_reminder_fires_once_inside_window() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (scheduler, db) = scheduler_with(Arc::clone(&messenger)).await;
        db.subscribe(100).await.unwrap();
        db.save_settings(
            100,
            &SubscriberSettings {
                platforms: Platform::ALL.to_vec(),
                offsets: vec![3_600],
            },
        )
        .await
        .unwrap();

        // remaining = 3630, inside [3540, 3660].
        let contests = vec![contest("ac_1", Platform::AtCoder, NOW + 3_630)];
        // Mark announced so only the reminder path is exercised.
        db.mark_announced("ac_1").await.unwrap();

        let stats = scheduler.process(&contests, NOW).await.unwrap();
        assert_eq!(stats.reminders, 1);
        assert!(messenger.sent()[0].1.starts_with("⏰ Reminder (1h left)"));

        // Still inside the window on a retried tick: deduplicated.
        let stats = scheduler.process(&contests, NOW + 30).await.unwrap();
        assert_eq!(stats.reminders, 0);
        assert_eq!(messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_reminder_outside_window_or_started() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (scheduler, db) = scheduler_with(Arc::clone(&messenger)).await;
        db.subscribe(100).await.unwrap();
        db.save_settings(
            100,
            &SubscriberSettings {
                platforms: Platform::ALL.to_vec(),
                offsets: vec![3_600],
            },
        )
        .await
        .unwrap();

        for c in [
            // remaining = 3700: above the window.
            contest("ac_early", Platform::AtCoder, NOW + 3_700),
            // remaining = 3500: below the window.
            contest("ac_late", Platform::AtCoder, NOW + 3_500),
            // already started.
            contest("ac_past", Platform::AtCoder, NOW - 10),
        ] {
            db.mark_announced(&c.id).await.unwrap();
            let stats = scheduler.process(&[c], NOW).await.unwrap();
            assert_eq!(stats.reminders, 0);
        }
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_reannounce() {
        let messenger = Arc::new(RecordingMessenger::failing_for(&[100]));
        let (scheduler, db) = scheduler_with(Arc::clone(&messenger)).await;
        db.subscribe(100).await.unwrap();

        let contests = vec![contest("cf_1", Platform::Codeforces, NOW + 500_000)];

        let stats = scheduler.process(&contests, NOW).await.unwrap();
        assert_eq!(stats.new_contests, 1);
        assert_eq!(stats.announcements, 0);

        // The ledger mark was committed despite the failed delivery.
        assert!(db.is_announced("cf_1").await.unwrap());
        let stats = scheduler.process(&contests, NOW + 300).await.unwrap();
        assert_eq!(stats.new_contests, 0);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_abort_batch() {
        let messenger = Arc::new(RecordingMessenger::failing_for(&[100]));
        let (scheduler, db) = scheduler_with(Arc::clone(&messenger)).await;
        db.subscribe(100).await.unwrap();
        db.subscribe(200).await.unwrap();

        let contests = vec![contest("cc_1", Platform::CodeChef, NOW + 500_000)];
        let stats = scheduler.process(&contests, NOW).await.unwrap();

        assert_eq!(stats.announcements, 1);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 200);
    }
}
