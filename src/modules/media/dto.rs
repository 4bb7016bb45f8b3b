use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Suffix appended to a source key to address its conversion result.
pub const AUDIO_SUFFIX: &str = ".mp3";

/// Single FIFO ordering group for conversion jobs: global strict order.
pub const VIDEO_GROUP: &str = "video-group";

/// FIFO ordering group for completion notifications.
pub const AUDIO_GROUP: &str = "mp3-group";

/// Result addressing is a pure function of the source key — no wall clock,
/// no randomness — so repeated conversions of one job land on one object.
pub fn audio_key(video_key: &str) -> String {
    format!("{video_key}{AUDIO_SUFFIX}")
}

/// Dedup token for the notification enqueue, derived from the source key.
/// Stable across retries, so redelivered conversions collapse to a single
/// logical notification within the queue's dedup window.
pub fn notification_dedup_id(video_key: &str) -> String {
    format!("notif-{video_key}")
}

/// Conversion queue payload. Carries everything needed to reprocess the
/// job from scratch on redelivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    pub video_s3_key: String,
    pub mp3_s3_key: Option<String>,
    pub username: String,
}

/// Notification queue payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioReady {
    pub mp3_s3_key: String,
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub video_key: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusResponse {
    Completed { audio_key: String },
    Processing,
}
