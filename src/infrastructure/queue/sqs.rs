use super::{QueueMessage, WorkQueue};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::config::{BehaviorVersion, Builder, Credentials, Region};
use tracing::info;

/// SQS FIFO queue handle.
#[derive(Clone)]
pub struct SqsWorkQueue {
    client: Client,
    queue_url: String,
}

impl SqsWorkQueue {
    pub fn new(
        region: &str,
        endpoint: Option<&str>,
        queue_url: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let mut config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials);

        if let Some(endpoint) = endpoint {
            config = config.endpoint_url(endpoint);
        }

        let client = Client::from_conf(config.build());

        info!("✅ Connected to SQS queue {}", queue_url);

        Self {
            client,
            queue_url: queue_url.to_string(),
        }
    }
}

#[async_trait]
impl WorkQueue for SqsWorkQueue {
    async fn enqueue(&self, body: &str, group: &str, dedup_id: &str) -> Result<()> {
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(group)
            .message_deduplication_id(dedup_id)
            .send()
            .await
            .map_err(|e| anyhow!("sqs send: {}", e.into_service_error()))?;
        Ok(())
    }

    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<QueueMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .map_err(|e| anyhow!("sqs receive: {}", e.into_service_error()))?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|msg| {
                let body = msg.body?;
                let receipt = msg.receipt_handle?;
                Some(QueueMessage { body, receipt })
            })
            .collect();

        Ok(messages)
    }

    async fn delete(&self, receipt: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt)
            .send()
            .await
            .map_err(|e| anyhow!("sqs delete: {}", e.into_service_error()))?;
        Ok(())
    }
}
