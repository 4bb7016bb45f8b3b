use audiomill::config::settings::AppConfig;
use audiomill::infrastructure::queue::sqs::SqsWorkQueue;
use audiomill::infrastructure::storage::s3::S3ObjectStore;
use audiomill::transcode::ffmpeg::FfmpegTranscoder;
use audiomill::workers::converter::ConverterWorker;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting converter worker...");

    let config = AppConfig::new()?;

    let videos = Arc::new(S3ObjectStore::new(
        &config.aws_region,
        config.aws_endpoint.as_deref(),
        &config.video_bucket,
        &config.aws_access_key,
        &config.aws_secret_key,
    ));
    let audio = Arc::new(S3ObjectStore::new(
        &config.aws_region,
        config.aws_endpoint.as_deref(),
        &config.audio_bucket,
        &config.aws_access_key,
        &config.aws_secret_key,
    ));
    let jobs = Arc::new(SqsWorkQueue::new(
        &config.aws_region,
        config.aws_endpoint.as_deref(),
        &config.video_queue_url,
        &config.aws_access_key,
        &config.aws_secret_key,
    ));
    let notifications = Arc::new(SqsWorkQueue::new(
        &config.aws_region,
        config.aws_endpoint.as_deref(),
        &config.audio_queue_url,
        &config.aws_access_key,
        &config.aws_secret_key,
    ));

    let worker = ConverterWorker::new(
        videos,
        audio,
        jobs,
        notifications,
        Arc::new(FfmpegTranscoder::new()),
    );

    worker.run().await;
    Ok(())
}
