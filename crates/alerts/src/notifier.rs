//! Outbound notification delivery.

use crate::db::Database;
use async_trait::async_trait;
use teloxide::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
    #[error("Store error: {0}")]
    Store(#[from] crate::db::StoreError),
}

/// Delivery seam between the scheduler and the chat transport. The
/// production implementation is [`Notifier`]; tests substitute a recorder.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver one message to one chat.
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
}

/// Telegram-backed notifier.
pub struct Notifier {
    bot: Bot,
    db: Database,
}

impl Notifier {
    pub fn new(bot: Bot, db: Database) -> Self {
        Self { bot, db }
    }

    /// Send a message to every current subscriber.
    pub async fn broadcast(&self, text: &str) -> Result<u32, NotifyError> {
        broadcast(self, &self.db, text).await
    }
}

/// Send a message to every current subscriber, returning how many went out.
/// A failed recipient is logged and skipped; one blocked chat never aborts
/// the batch.
pub async fn broadcast(
    messenger: &dyn Messenger,
    db: &Database,
    text: &str,
) -> Result<u32, NotifyError> {
    let subscribers = db.list_subscribers().await?;
    let mut sent = 0u32;

    for chat_id in subscribers {
        match messenger.send(chat_id, text).await {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!(chat_id, error = %e, "Broadcast delivery failed");
            }
        }
    }

    info!(sent, "Broadcast complete");
    Ok(sent)
}

#[async_trait]
impl Messenger for Notifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}
