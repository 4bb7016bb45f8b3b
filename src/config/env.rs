use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    AwsRegion,
    AwsEndpoint,
    AwsAccessKey,
    AwsSecretKey,
    VideoBucket,
    AudioBucket,
    VideoQueueUrl,
    AudioQueueUrl,
    NotificationTopicArn,
    JwtSecret,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::AwsRegion => "AWS_REGION",
            EnvKey::AwsEndpoint => "AWS_ENDPOINT_URL",
            EnvKey::AwsAccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::AwsSecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::VideoBucket => "S3_BUCKET_VIDEOS",
            EnvKey::AudioBucket => "S3_BUCKET_MP3S",
            EnvKey::VideoQueueUrl => "SQS_VIDEO_QUEUE_URL",
            EnvKey::AudioQueueUrl => "SQS_MP3_QUEUE_URL",
            EnvKey::NotificationTopicArn => "SNS_TOPIC_ARN",
            EnvKey::JwtSecret => "JWT_SECRET",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
