use audiomill::config::settings::AppConfig;
use audiomill::infrastructure::notify::sns::SnsNotifier;
use audiomill::infrastructure::queue::sqs::SqsWorkQueue;
use audiomill::workers::notifier::NotificationWorker;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting notification worker...");

    let config = AppConfig::new()?;

    let notifications = Arc::new(SqsWorkQueue::new(
        &config.aws_region,
        config.aws_endpoint.as_deref(),
        &config.audio_queue_url,
        &config.aws_access_key,
        &config.aws_secret_key,
    ));
    let notifier = Arc::new(SnsNotifier::new(
        &config.aws_region,
        config.aws_endpoint.as_deref(),
        &config.notification_topic_arn,
        &config.aws_access_key,
        &config.aws_secret_key,
    ));

    let worker = NotificationWorker::new(notifications, notifier);

    worker.run().await;
    Ok(())
}
