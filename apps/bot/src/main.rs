//! Contest Reminder Bot
//!
//! Polls competitive programming platforms for upcoming contests and
//! notifies Telegram subscribers about new contests and configurable
//! pre-start reminders.

use clap::Parser;
use contest_alerts::{Database, Notifier, Scheduler, SchedulerConfig, TelegramBot};
use contest_sources::ContestFeed;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Contest Reminder Bot CLI
#[derive(Parser, Debug)]
#[command(name = "contest-bot")]
#[command(about = "Telegram bot for programming contest reminders", long_about = None)]
struct Args {
    /// SQLite database path
    #[arg(short, long, default_value = "contests.db")]
    db: String,

    /// Poll interval in seconds
    #[arg(short, long, default_value_t = 300)]
    poll_interval: u64,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    init_logging(&args.log_level);

    info!("🚀 Contest Reminder Bot starting...");
    info!("  Database: {}", args.db);
    info!("  Poll interval: {}s", args.poll_interval);

    let token = match std::env::var("BOT_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            tracing::error!("BOT_TOKEN environment variable is not set");
            std::process::exit(1);
        }
    };

    let db = match Database::connect(&args.db).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database {}: {}", args.db, e);
            std::process::exit(1);
        }
    };

    let feed = Arc::new(ContestFeed::new());
    let bot = Arc::new(TelegramBot::new(&token, db.clone(), Arc::clone(&feed)));
    let notifier = Arc::new(Notifier::new(bot.bot().clone(), db.clone()));

    let scheduler_config = SchedulerConfig {
        poll_interval: Duration::from_secs(args.poll_interval),
        ..Default::default()
    };
    let scheduler = Scheduler::new(db, feed, notifier, scheduler_config);
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run().await;
    });

    info!("Bot started, dispatching commands");

    // Blocks until shutdown (ctrl-c is handled by the dispatcher).
    bot.run().await;

    warn!("Shutdown signal received");
    scheduler_handle.abort();

    info!("👋 Contest Reminder Bot stopped");
}
