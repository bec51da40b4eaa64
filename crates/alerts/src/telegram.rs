//! Telegram bot commands and message formatting.

use crate::db::Database;
use chrono::{DateTime, Utc};
use contest_core::{format_offset, format_offset_list, parse_offset_tokens, Contest, Platform};
use contest_sources::{aggregator, ContestFeed};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
    #[error("Store error: {0}")]
    Store(#[from] crate::db::StoreError),
}

/// Bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Subscribe to contest reminders")]
    Start,
    #[command(description = "Unsubscribe")]
    Stop,
    #[command(description = "Show next contests. Usage: /upcoming 3 (1-10, default 5)")]
    Upcoming(String),
    #[command(description = "Show the next contest")]
    Next,
    #[command(description = "Show latest contests by start time. Usage: /recent 5")]
    Recent(String),
    #[command(description = "Set platform filters. Usage: /platform all | cf lc ac cc")]
    Platform(String),
    #[command(description = "Set reminder times. Usage: /reminders 1d 2h 1h 30m 10m 5m")]
    Reminders(String),
    #[command(description = "Show help")]
    Help,
}

/// Telegram bot wrapper servicing subscriber commands.
pub struct TelegramBot {
    bot: Bot,
    db: Database,
    feed: Arc<ContestFeed>,
}

impl TelegramBot {
    /// Create a new bot with the given token.
    pub fn new(token: &str, db: Database, feed: Arc<ContestFeed>) -> Self {
        Self {
            bot: Bot::new(token),
            db,
            feed,
        }
    }

    /// The underlying bot, for sending messages outside command handling.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Run the command dispatcher. Plain (non-command) text messages
    /// auto-subscribe the chat.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();

        let commands = Arc::clone(&self);
        let texts = Arc::clone(&self);
        let handler = Update::filter_message()
            .branch(
                dptree::entry().filter_command::<Command>().endpoint(
                    move |bot: Bot, msg: Message, cmd: Command| {
                        let this = Arc::clone(&commands);
                        async move { this.handle_command(bot, msg, cmd).await }
                    },
                ),
            )
            .branch(
                dptree::filter(|msg: Message| msg.text().is_some()).endpoint(
                    move |msg: Message| {
                        let this = Arc::clone(&texts);
                        async move { this.handle_text(msg).await }
                    },
                ),
            );

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    /// Any plain text message subscribes the chat.
    async fn handle_text(&self, msg: Message) -> Result<(), TelegramError> {
        self.db.subscribe(msg.chat.id.0).await?;
        Ok(())
    }

    async fn handle_command(
        &self,
        bot: Bot,
        msg: Message,
        cmd: Command,
    ) -> Result<(), TelegramError> {
        let chat_id = msg.chat.id.0;

        match cmd {
            Command::Start => {
                self.db.subscribe(chat_id).await?;
                bot.send_message(msg.chat.id, "✅ Subscribed to contest reminders!")
                    .await?;
            }

            Command::Stop => {
                self.db.unsubscribe(chat_id).await?;
                bot.send_message(msg.chat.id, "❌ Unsubscribed!").await?;
            }

            Command::Upcoming(arg) => {
                let limit = parse_limit(&arg);
                let settings = self.db.get_settings(chat_id).await?;
                let now = Utc::now().timestamp();
                let contests = self.feed.fetch_all(now).await;
                let upcoming = aggregator::upcoming(&contests, &settings.platforms, limit);

                if upcoming.is_empty() {
                    bot.send_message(msg.chat.id, "No upcoming contests found for your filters.")
                        .await?;
                } else {
                    bot.send_message(msg.chat.id, format_contest_list(&upcoming))
                        .await?;
                }
            }

            Command::Next => {
                let settings = self.db.get_settings(chat_id).await?;
                let now = Utc::now().timestamp();
                let contests = self.feed.fetch_all(now).await;

                match aggregator::next_contest(&contests, &settings.platforms) {
                    Some(contest) => {
                        bot.send_message(msg.chat.id, format_contest_block(&contest))
                            .await?;
                    }
                    None => {
                        bot.send_message(
                            msg.chat.id,
                            "No upcoming contests found for your filters.",
                        )
                        .await?;
                    }
                }
            }

            Command::Recent(arg) => {
                let limit = parse_limit(&arg);
                let settings = self.db.get_settings(chat_id).await?;
                let now = Utc::now().timestamp();
                let contests = self.feed.fetch_all(now).await;
                let recent = aggregator::recent(&contests, &settings.platforms, limit);

                if recent.is_empty() {
                    bot.send_message(msg.chat.id, "No contests found for your filters.")
                        .await?;
                } else {
                    bot.send_message(msg.chat.id, format_contest_list(&recent))
                        .await?;
                }
            }

            Command::Platform(arg) => {
                let arg = arg.trim();
                if arg.is_empty() {
                    let settings = self.db.get_settings(chat_id).await?;
                    let enabled: Vec<&str> =
                        settings.platforms.iter().map(|p| p.as_str()).collect();
                    bot.send_message(
                        msg.chat.id,
                        format!(
                            "Platforms enabled: {}\nUsage: /platform all | /platform cf lc ac cc",
                            enabled.join(", ")
                        ),
                    )
                    .await?;
                    return Ok(());
                }

                let Some(platforms) = parse_platform_args(arg) else {
                    bot.send_message(
                        msg.chat.id,
                        "Invalid platforms. Use: /platform all | /platform cf lc ac cc",
                    )
                    .await?;
                    return Ok(());
                };

                let mut settings = self.db.get_settings(chat_id).await?;
                settings.platforms = platforms;
                self.db.save_settings(chat_id, &settings).await?;

                let enabled: Vec<&str> = settings.platforms.iter().map(|p| p.as_str()).collect();
                bot.send_message(
                    msg.chat.id,
                    format!("Platforms updated: {}", enabled.join(", ")),
                )
                .await?;
            }

            Command::Reminders(arg) => {
                let arg = arg.trim();
                if arg.is_empty() {
                    let settings = self.db.get_settings(chat_id).await?;
                    bot.send_message(
                        msg.chat.id,
                        format!(
                            "Reminder times: {}\nUsage: /reminders 1d 2h 1h 30m 10m 5m",
                            format_offset_list(&settings.offsets)
                        ),
                    )
                    .await?;
                    return Ok(());
                }

                let offsets = parse_offset_tokens(arg);
                if offsets.is_empty() {
                    bot.send_message(
                        msg.chat.id,
                        "Invalid reminder list. Example: /reminders 1d 2h 1h 30m 10m 5m",
                    )
                    .await?;
                    return Ok(());
                }

                let mut settings = self.db.get_settings(chat_id).await?;
                settings.offsets = offsets;
                self.db.save_settings(chat_id, &settings).await?;

                bot.send_message(
                    msg.chat.id,
                    format!(
                        "Reminder times updated: {}",
                        format_offset_list(&settings.offsets)
                    ),
                )
                .await?;
            }

            Command::Help => {
                let text = format!(
                    "{}\n\nPlatforms: Codeforces (cf), LeetCode (lc), AtCoder (ac), CodeChef (cc)",
                    Command::descriptions()
                );
                bot.send_message(msg.chat.id, text).await?;
            }
        }

        Ok(())
    }
}

/// Parse an optional count argument: 1-10, default 5.
fn parse_limit(arg: &str) -> usize {
    arg.trim()
        .parse::<usize>()
        .map(|n| n.clamp(1, 10))
        .unwrap_or(5)
}

/// Parse `/platform` arguments: `all`, or a list of platform tokens.
/// Unknown tokens are ignored; returns None when nothing valid remains.
fn parse_platform_args(arg: &str) -> Option<Vec<Platform>> {
    let mut tokens = arg.split_whitespace();
    let first = tokens.next()?;
    if first.eq_ignore_ascii_case("all") {
        return Some(Platform::ALL.to_vec());
    }

    let mut platforms = Vec::new();
    for token in std::iter::once(first).chain(tokens) {
        if let Some(platform) = Platform::from_token(token) {
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
    }

    if platforms.is_empty() {
        None
    } else {
        Some(platforms)
    }
}

/// Render a start time for display.
fn format_start_time(start_epoch: i64) -> String {
    match DateTime::<Utc>::from_timestamp(start_epoch, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "unknown".to_string(),
    }
}

/// One contest as a message block.
pub fn format_contest_block(contest: &Contest) -> String {
    format!(
        "{}\nPlatform: {}\nStart: {}\n{}",
        contest.name,
        contest.platform,
        format_start_time(contest.start_epoch),
        contest.url
    )
}

/// Several contests, blank-line separated.
pub fn format_contest_list(contests: &[Contest]) -> String {
    contests
        .iter()
        .map(format_contest_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The "new contest published" notification.
pub fn format_new_contest(contest: &Contest) -> String {
    format!(
        "🆕 New Contest Published!\n\n{}\nPlatform: {}\n{}",
        contest.name, contest.platform, contest.url
    )
}

/// A reminder notification for the given offset.
pub fn format_reminder(contest: &Contest, offset: i64) -> String {
    format!(
        "⏰ Reminder ({} left)\n\n{}\nPlatform: {}\n{}",
        format_offset(offset),
        contest.name,
        contest.platform,
        contest.url
    )
}
