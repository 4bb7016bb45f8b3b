use crate::common::error::PipelineError;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::queue::{QueueMessage, WorkQueue};
use crate::modules::media::dto::AudioReady;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const MAX_MESSAGES: i32 = 1;
const WAIT_TIME_SECONDS: i32 = 10;
const POLL_PAUSE: Duration = Duration::from_secs(1);

const SUBJECT: &str = "MP3 Download Ready";

/// Consumes completion messages and publishes an owner-addressed event.
///
/// Duplicate publishes from redelivery are accepted as harmless; the event
/// is informational, so no dedup is layered on top of the queue's own
/// window.
pub struct NotificationWorker {
    notifications: Arc<dyn WorkQueue>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationWorker {
    pub fn new(notifications: Arc<dyn WorkQueue>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifications,
            notifier,
        }
    }

    pub async fn run(&self) {
        info!("📣 Notification worker waiting for messages");
        loop {
            if let Err(e) = self.poll_once().await {
                error!("receive from notification queue failed: {e:#}");
            }
            tokio::time::sleep(POLL_PAUSE).await;
        }
    }

    pub async fn poll_once(&self) -> anyhow::Result<usize> {
        let messages = self
            .notifications
            .receive(MAX_MESSAGES, WAIT_TIME_SECONDS)
            .await?;
        let count = messages.len();
        for message in messages {
            self.handle(message).await;
        }
        Ok(count)
    }

    async fn handle(&self, message: QueueMessage) {
        match self.notify(&message.body).await {
            Ok(username) => {
                // Publish succeeded; only now is the message acknowledged.
                if let Err(e) = self.notifications.delete(&message.receipt).await {
                    warn!("failed to ack notification: {e:#}");
                }
                info!(%username, "✅ completion event published");
            }
            Err(PipelineError::Validation(reason)) => {
                error!("dropping invalid notification message: {reason}");
                if let Err(e) = self.notifications.delete(&message.receipt).await {
                    warn!("failed to drop poison message: {e:#}");
                }
            }
            Err(e) => {
                warn!("publish failed, leaving message for redelivery: {e:#}");
            }
        }
    }

    async fn notify(&self, body: &str) -> Result<String, PipelineError> {
        let note: AudioReady = serde_json::from_str(body)
            .map_err(|e| PipelineError::Validation(format!("bad notification payload: {e}")))?;

        if note.mp3_s3_key.is_empty() || note.username.is_empty() {
            return Err(PipelineError::Validation(
                "missing required fields: mp3_s3_key or username".to_string(),
            ));
        }

        // The result key itself stays out of the message body; recipients
        // pick the file up from their dashboard.
        let message = format!(
            "Hello {},\n\n\
             Your MP3 file is now ready for download!\n\n\
             You can download it from your account dashboard.\n\n\
             Best regards,\n\
             Video to MP3 Converter Service\n",
            note.username
        );

        let attributes = HashMap::from([
            ("type".to_string(), "email_notification".to_string()),
            ("username".to_string(), note.username.clone()),
        ]);

        self.notifier
            .publish(SUBJECT, &message, attributes)
            .await
            .map_err(PipelineError::TransientInfra)?;

        Ok(note.username)
    }
}
