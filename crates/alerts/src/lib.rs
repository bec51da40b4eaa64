//! Telegram notification system for contest reminders.
//!
//! This crate provides:
//! - SQLite-backed subscriber store and announcement ledger
//! - Telegram bot integration (commands and outbound notifications)
//! - The polling scheduler that decides what to announce and remind

pub mod db;
pub mod notifier;
pub mod scheduler;
pub mod settings;
pub mod telegram;

pub use db::Database;
pub use notifier::{Messenger, Notifier};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use settings::SubscriberSettings;
pub use telegram::TelegramBot;
