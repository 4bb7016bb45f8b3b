pub mod sqs;

use anyhow::Result;
use async_trait::async_trait;

/// A message handed out by `receive`. The receipt must be passed back to
/// `delete` to acknowledge it; until then the message is merely invisible
/// and comes back once the visibility timeout expires.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub body: String,
    pub receipt: String,
}

/// At-least-once FIFO work queue, one queue per handle.
///
/// Guarantees assumed of implementations: strict ordering within a group,
/// and dedup-id suppression of duplicate enqueues within a bounded recent
/// window only. Redelivery after a crash or visibility timeout is the
/// normal case, so every consumer operation must be re-executable from
/// scratch.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn enqueue(&self, body: &str, group: &str, dedup_id: &str) -> Result<()>;

    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<QueueMessage>>;

    async fn delete(&self, receipt: &str) -> Result<()>;
}
