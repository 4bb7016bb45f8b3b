use crate::common::compensation;
use crate::common::error::PipelineError;
use crate::infrastructure::queue::{QueueMessage, WorkQueue};
use crate::infrastructure::storage::{ObjectStore, StoreError};
use crate::modules::media::dto::{AUDIO_GROUP, AudioReady, ConversionJob, audio_key, notification_dedup_id};
use crate::transcode::AudioTranscoder;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const MAX_MESSAGES: i32 = 1;
const WAIT_TIME_SECONDS: i32 = 10;
const POLL_PAUSE: Duration = Duration::from_secs(1);

/// Consumes conversion jobs, produces the result artifact, and hands the
/// job off to the notification queue.
///
/// Redelivery is the normal case: every step is re-executable from
/// scratch, the result key is deterministic, and the notification dedup
/// token is stable, so retrying a job converges instead of duplicating.
pub struct ConverterWorker {
    videos: Arc<dyn ObjectStore>,
    audio: Arc<dyn ObjectStore>,
    jobs: Arc<dyn WorkQueue>,
    notifications: Arc<dyn WorkQueue>,
    transcoder: Arc<dyn AudioTranscoder>,
}

impl ConverterWorker {
    pub fn new(
        videos: Arc<dyn ObjectStore>,
        audio: Arc<dyn ObjectStore>,
        jobs: Arc<dyn WorkQueue>,
        notifications: Arc<dyn WorkQueue>,
        transcoder: Arc<dyn AudioTranscoder>,
    ) -> Self {
        Self {
            videos,
            audio,
            jobs,
            notifications,
            transcoder,
        }
    }

    pub async fn run(&self) {
        info!("🎵 Converter worker waiting for jobs");
        loop {
            if let Err(e) = self.poll_once().await {
                error!("receive from conversion queue failed: {e:#}");
            }
            tokio::time::sleep(POLL_PAUSE).await;
        }
    }

    /// One poll cycle: receive up to one message and process it to
    /// completion before returning. Returns how many messages were
    /// received.
    pub async fn poll_once(&self) -> anyhow::Result<usize> {
        let messages = self.jobs.receive(MAX_MESSAGES, WAIT_TIME_SECONDS).await?;
        let count = messages.len();
        for message in messages {
            self.handle(message).await;
        }
        Ok(count)
    }

    async fn handle(&self, message: QueueMessage) {
        match self.convert(&message.body).await {
            Ok(job) => {
                // The notification enqueue has succeeded; only now is the
                // inbound job acknowledged.
                if let Err(e) = self.jobs.delete(&message.receipt).await {
                    warn!("failed to ack finished job: {e:#}");
                }
                info!(video_key = %job.video_s3_key, "✅ conversion completed");
            }
            Err(PipelineError::PermanentAsset { key }) => {
                // No retry can succeed. Drop the message; the job is closed
                // and no notification will ever fire for it.
                error!(video_key = %key, "source asset gone, abandoning job");
                if let Err(e) = self.jobs.delete(&message.receipt).await {
                    warn!("failed to drop abandoned job: {e:#}");
                }
            }
            Err(PipelineError::Validation(reason)) => {
                error!("dropping unparseable job message: {reason}");
                if let Err(e) = self.jobs.delete(&message.receipt).await {
                    warn!("failed to drop poison message: {e:#}");
                }
            }
            Err(e) => {
                // Leave the message un-acked; the visibility timeout will
                // hand it to another worker and the whole job reruns.
                warn!("conversion failed, leaving job for redelivery: {e:#}");
            }
        }
    }

    async fn convert(&self, body: &str) -> Result<ConversionJob, PipelineError> {
        let mut job: ConversionJob = serde_json::from_str(body)
            .map_err(|e| PipelineError::Validation(format!("bad job payload: {e}")))?;

        let video = match self.videos.get(&job.video_s3_key).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound) => {
                return Err(PipelineError::PermanentAsset {
                    key: job.video_s3_key,
                });
            }
            Err(StoreError::Other(err)) => return Err(PipelineError::TransientInfra(err)),
        };

        let mp3 = self
            .transcoder
            .extract_audio(&video)
            .await
            .map_err(PipelineError::TransientInfra)?;

        // Full overwrite of reproducible content at a deterministic key:
        // concurrent or repeated runs of this job converge on one artifact.
        let mp3_key = audio_key(&job.video_s3_key);
        self.audio
            .put(&mp3_key, mp3)
            .await
            .map_err(PipelineError::transient)?;
        job.mp3_s3_key = Some(mp3_key.clone());

        let note = AudioReady {
            mp3_s3_key: mp3_key.clone(),
            username: job.username.clone(),
        };
        let payload = serde_json::to_string(&note).map_err(PipelineError::transient)?;

        if let Err(err) = self
            .notifications
            .enqueue(&payload, AUDIO_GROUP, &notification_dedup_id(&job.video_s3_key))
            .await
        {
            // The artifact write committed but the required follow-up did
            // not: roll the write back before reporting the failure.
            warn!(%mp3_key, "notification enqueue failed, rolling back result");
            compensation::undo_put(self.audio.as_ref(), &mp3_key).await;
            return Err(PipelineError::TransientInfra(err));
        }

        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{MemoryQueue, MemoryStore};
    use anyhow::Result;
    use async_trait::async_trait;
    use bytes::Bytes;

    /// Deterministic stand-in for ffmpeg: prefixes the input bytes.
    struct FakeTranscoder;

    #[async_trait]
    impl AudioTranscoder for FakeTranscoder {
        async fn extract_audio(&self, video: &[u8]) -> Result<Bytes> {
            let mut out = b"mp3:".to_vec();
            out.extend_from_slice(video);
            Ok(Bytes::from(out))
        }
    }

    /// Transcoder that always fails, for the retry path.
    struct BrokenTranscoder;

    #[async_trait]
    impl AudioTranscoder for BrokenTranscoder {
        async fn extract_audio(&self, _video: &[u8]) -> Result<Bytes> {
            Err(anyhow::anyhow!("codec exploded"))
        }
    }

    struct Fixture {
        videos: Arc<MemoryStore>,
        audio: Arc<MemoryStore>,
        jobs: Arc<MemoryQueue>,
        notifications: Arc<MemoryQueue>,
        worker: ConverterWorker,
    }

    fn fixture_with(transcoder: Arc<dyn AudioTranscoder>) -> Fixture {
        let videos = Arc::new(MemoryStore::new());
        let audio = Arc::new(MemoryStore::new());
        let jobs = Arc::new(MemoryQueue::new());
        let notifications = Arc::new(MemoryQueue::new());
        let worker = ConverterWorker::new(
            videos.clone(),
            audio.clone(),
            jobs.clone(),
            notifications.clone(),
            transcoder,
        );
        Fixture {
            videos,
            audio,
            jobs,
            notifications,
            worker,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(FakeTranscoder))
    }

    async fn seed_job(f: &Fixture, video_key: &str, dedup: &str) {
        f.videos
            .put(video_key, Bytes::from_static(b"raw video"))
            .await
            .unwrap();
        let job = ConversionJob {
            video_s3_key: video_key.to_string(),
            mp3_s3_key: None,
            username: "alice".to_string(),
        };
        f.jobs
            .enqueue(&serde_json::to_string(&job).unwrap(), "video-group", dedup)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn writes_result_notifies_then_acks() {
        let f = fixture();
        seed_job(&f, "v1", "d1").await;

        assert_eq!(f.worker.poll_once().await.unwrap(), 1);

        let result = f.audio.get("v1.mp3").await.unwrap();
        assert_eq!(result, Bytes::from_static(b"mp3:raw video"));

        assert_eq!(f.notifications.pending(), 1);
        let note: AudioReady =
            serde_json::from_str(&f.notifications.pending_bodies()[0]).unwrap();
        assert_eq!(note.mp3_s3_key, "v1.mp3");
        assert_eq!(note.username, "alice");

        // Fully acked: nothing pending, nothing in flight.
        assert_eq!(f.jobs.pending(), 0);
        assert_eq!(f.jobs.in_flight(), 0);
    }

    #[tokio::test]
    async fn redelivered_job_converges_to_one_result_and_one_notification() {
        let f = fixture();
        seed_job(&f, "v1", "d1").await;
        // Same job body again, as a crashed worker's redelivery would be.
        seed_job(&f, "v1", "d2").await;

        assert_eq!(f.worker.poll_once().await.unwrap(), 1);
        assert_eq!(f.worker.poll_once().await.unwrap(), 1);

        assert_eq!(f.audio.object_count(), 1);
        assert_eq!(
            f.audio.get("v1.mp3").await.unwrap(),
            Bytes::from_static(b"mp3:raw video")
        );
        // The stable dedup token collapsed the second notification.
        assert_eq!(f.notifications.pending(), 1);
    }

    #[tokio::test]
    async fn missing_asset_abandons_the_job() {
        let f = fixture();
        let job = ConversionJob {
            video_s3_key: "ghost".to_string(),
            mp3_s3_key: None,
            username: "alice".to_string(),
        };
        f.jobs
            .enqueue(&serde_json::to_string(&job).unwrap(), "video-group", "d1")
            .await
            .unwrap();

        f.worker.poll_once().await.unwrap();

        // Message gone for good, no result, no notification.
        assert_eq!(f.jobs.pending(), 0);
        assert_eq!(f.jobs.in_flight(), 0);
        assert_eq!(f.jobs.redeliver(), 0);
        assert_eq!(f.audio.object_count(), 0);
        assert_eq!(f.notifications.pending(), 0);
    }

    #[tokio::test]
    async fn never_acks_before_notification_enqueue_succeeds() {
        let f = fixture();
        seed_job(&f, "v1", "d1").await;
        f.notifications.fail_enqueues(true);

        f.worker.poll_once().await.unwrap();

        // Result was rolled back and the job is still owed to the queue.
        assert!(!f.audio.contains("v1.mp3"));
        assert_eq!(f.jobs.in_flight(), 1);
        assert_eq!(f.jobs.redeliver(), 1);

        // Once the queue recovers, redelivery finishes the job.
        f.notifications.fail_enqueues(false);
        f.worker.poll_once().await.unwrap();

        assert!(f.audio.contains("v1.mp3"));
        assert_eq!(f.notifications.pending(), 1);
        assert_eq!(f.jobs.pending(), 0);
        assert_eq!(f.jobs.in_flight(), 0);
    }

    #[tokio::test]
    async fn transcoder_failure_leaves_job_for_redelivery() {
        let f = fixture_with(Arc::new(BrokenTranscoder));
        seed_job(&f, "v1", "d1").await;

        f.worker.poll_once().await.unwrap();

        assert_eq!(f.audio.object_count(), 0);
        assert_eq!(f.notifications.pending(), 0);
        assert_eq!(f.jobs.redeliver(), 1);
    }

    #[tokio::test]
    async fn unparseable_message_is_dropped() {
        let f = fixture();
        f.jobs.enqueue("not json", "video-group", "d1").await.unwrap();

        f.worker.poll_once().await.unwrap();

        assert_eq!(f.jobs.pending(), 0);
        assert_eq!(f.jobs.in_flight(), 0);
        assert_eq!(f.audio.object_count(), 0);
    }
}
