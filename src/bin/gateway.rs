use audiomill::app;
use audiomill::config::settings::AppConfig;
use audiomill::infrastructure::queue::sqs::SqsWorkQueue;
use audiomill::infrastructure::storage::s3::S3ObjectStore;
use audiomill::state::AppState;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting gateway...");

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

    let port = config.server_port;
    let state = AppState::new(config, videos, audio, jobs);
    let app = app::create_app(state).await;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("Gateway running on http://0.0.0.0:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
