use super::Notifier;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_sns::Client;
use aws_sdk_sns::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_sns::types::MessageAttributeValue;
use std::collections::HashMap;
use tracing::info;

/// SNS topic publisher.
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(
        region: &str,
        endpoint: Option<&str>,
        topic_arn: &str,
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

        info!("✅ Connected to SNS topic {}", topic_arn);

        Self {
            client,
            topic_arn: topic_arn.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(
        &self,
        subject: &str,
        message: &str,
        attributes: HashMap<String, String>,
    ) -> Result<()> {
        let mut request = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message);

        for (name, value) in attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .map_err(|e| anyhow!("sns attribute {name}: {e}"))?;
            request = request.message_attributes(name, attribute);
        }

        request
            .send()
            .await
            .map_err(|e| anyhow!("sns publish: {}", e.into_service_error()))?;

        Ok(())
    }
}
