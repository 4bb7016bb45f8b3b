use super::AudioTranscoder;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::process::Command;
use tracing::info;
use uuid::Uuid;

/// Shells out to ffmpeg through temp files to pull the audio track out of
/// a video container.
#[derive(Clone, Default)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn extract_audio(&self, video: &[u8]) -> Result<Bytes> {
        let scratch = Uuid::new_v4();
        let input_path = std::env::temp_dir().join(format!("{scratch}_input.video"));
        let output_path = std::env::temp_dir().join(format!("{scratch}_output.mp3"));

        fs::write(&input_path, video).await?;

        let status = Command::new("ffmpeg")
            .arg("-i")
            .arg(&input_path)
            .args(["-vn", "-acodec", "libmp3lame", "-f", "mp3", "-y"])
            .arg(&output_path)
            .status()
            .await?;

        if !status.success() {
            let _ = fs::remove_file(&input_path).await;
            let _ = fs::remove_file(&output_path).await;
            return Err(anyhow!("ffmpeg failed to extract audio"));
        }

        let audio = fs::read(&output_path).await?;
        info!("🎵 Extracted {} bytes of audio", audio.len());

        let _ = fs::remove_file(&input_path).await;
        let _ = fs::remove_file(&output_path).await;

        Ok(Bytes::from(audio))
    }
}
