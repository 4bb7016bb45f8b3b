use crate::config::env::{self, EnvKey};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub aws_region: String,
    /// Optional endpoint override for MinIO / LocalStack style deployments.
    pub aws_endpoint: Option<String>,
    pub aws_access_key: String,
    pub aws_secret_key: String,
    pub video_bucket: String,
    pub audio_bucket: String,
    pub video_queue_url: String,
    pub audio_queue_url: String,
    pub notification_topic_arn: String,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 8080),
            aws_region: env::get_or(EnvKey::AwsRegion, "eu-west-1"),
            aws_endpoint: env::get(EnvKey::AwsEndpoint).ok(),
            aws_access_key: env::get(EnvKey::AwsAccessKey)?,
            aws_secret_key: env::get(EnvKey::AwsSecretKey)?,
            video_bucket: env::get(EnvKey::VideoBucket)?,
            audio_bucket: env::get(EnvKey::AudioBucket)?,
            video_queue_url: env::get(EnvKey::VideoQueueUrl)?,
            audio_queue_url: env::get(EnvKey::AudioQueueUrl)?,
            notification_topic_arn: env::get(EnvKey::NotificationTopicArn)?,
            jwt_secret: env::get(EnvKey::JwtSecret)?,
        })
    }
}
