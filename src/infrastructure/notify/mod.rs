pub mod sns;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Fire-and-forget pub/sub publisher, one topic per handle. Attributes are
/// delivered alongside the message so subscribers can filter on them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(
        &self,
        subject: &str,
        message: &str,
        attributes: HashMap<String, String>,
    ) -> Result<()>;
}
