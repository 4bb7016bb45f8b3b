pub mod ffmpeg;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Extracts the audio track of a video as MP3 bytes.
///
/// Implementations must be deterministic enough that re-running a job
/// produces an equivalent artifact; the pipeline overwrites the result key
/// on every run and relies on that.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    async fn extract_audio(&self, video: &[u8]) -> Result<Bytes>;
}
