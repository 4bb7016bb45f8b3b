use super::dto::{ConversionJob, StatusResponse, VIDEO_GROUP, audio_key};
use crate::common::compensation;
use crate::common::error::PipelineError;
use crate::infrastructure::queue::WorkQueue;
use crate::infrastructure::storage::{ObjectStore, StoreError};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Ingests one asset and enqueues its conversion job.
#[derive(Clone)]
pub struct SubmissionService {
    videos: Arc<dyn ObjectStore>,
    jobs: Arc<dyn WorkQueue>,
}

impl SubmissionService {
    pub fn new(videos: Arc<dyn ObjectStore>, jobs: Arc<dyn WorkQueue>) -> Self {
        Self { videos, jobs }
    }

    /// Stores the asset under a fresh key, then enqueues the job. If the
    /// enqueue fails the stored asset is rolled back so no orphan is left
    /// without a corresponding queue entry.
    pub async fn submit(&self, payload: Bytes, username: &str) -> Result<String, PipelineError> {
        if username.trim().is_empty() {
            return Err(PipelineError::Validation("username is required".to_string()));
        }

        let video_key = Uuid::new_v4().to_string();
        self.videos
            .put(&video_key, payload)
            .await
            .map_err(PipelineError::transient)?;

        let job = ConversionJob {
            video_s3_key: video_key.clone(),
            mp3_s3_key: None,
            username: username.to_string(),
        };
        let body = serde_json::to_string(&job).map_err(PipelineError::transient)?;

        // Fresh dedup token per submission: re-uploading identical content
        // is a new job, never collapsed with an earlier one.
        let dedup_id = Uuid::new_v4().to_string();
        if let Err(err) = self.jobs.enqueue(&body, VIDEO_GROUP, &dedup_id).await {
            warn!(%video_key, "job enqueue failed, rolling back stored asset");
            compensation::undo_put(self.videos.as_ref(), &video_key).await;
            return Err(PipelineError::TransientInfra(err));
        }

        info!(%video_key, username, "job submitted");
        Ok(video_key)
    }
}

/// Derives job status from result existence alone. No job ledger exists:
/// a job abandoned because its source asset disappeared reports
/// `processing` forever, indistinguishable from one still in flight.
#[derive(Clone)]
pub struct StatusService {
    audio: Arc<dyn ObjectStore>,
}

impl StatusService {
    pub fn new(audio: Arc<dyn ObjectStore>) -> Self {
        Self { audio }
    }

    pub async fn check(&self, video_key: &str) -> Result<StatusResponse, PipelineError> {
        let audio_key = audio_key(video_key);
        match self.audio.head(&audio_key).await {
            Ok(Some(_)) => Ok(StatusResponse::Completed { audio_key }),
            Ok(None) => Ok(StatusResponse::Processing),
            Err(err) => Err(PipelineError::transient(err)),
        }
    }
}

/// Fetches a finished conversion result.
#[derive(Clone)]
pub struct DownloadService {
    audio: Arc<dyn ObjectStore>,
}

impl DownloadService {
    pub fn new(audio: Arc<dyn ObjectStore>) -> Self {
        Self { audio }
    }

    pub async fn fetch(&self, key: &str) -> Result<Bytes, PipelineError> {
        match self.audio.get(key).await {
            Ok(bytes) => Ok(bytes),
            Err(StoreError::NotFound) => Err(PipelineError::PermanentAsset {
                key: key.to_string(),
            }),
            Err(StoreError::Other(err)) => Err(PipelineError::TransientInfra(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{MemoryQueue, MemoryStore};

    fn submission() -> (Arc<MemoryStore>, Arc<MemoryQueue>, SubmissionService) {
        let videos = Arc::new(MemoryStore::new());
        let jobs = Arc::new(MemoryQueue::new());
        let service = SubmissionService::new(videos.clone(), jobs.clone());
        (videos, jobs, service)
    }

    #[tokio::test]
    async fn submit_stores_asset_then_enqueues_job() {
        let (videos, jobs, service) = submission();

        let video_key = service
            .submit(Bytes::from_static(b"raw video"), "alice")
            .await
            .unwrap();

        assert!(videos.contains(&video_key));
        assert_eq!(jobs.pending(), 1);

        let job: ConversionJob = serde_json::from_str(&jobs.pending_bodies()[0]).unwrap();
        assert_eq!(job.video_s3_key, video_key);
        assert_eq!(job.mp3_s3_key, None);
        assert_eq!(job.username, "alice");
    }

    #[tokio::test]
    async fn submit_rolls_back_asset_when_enqueue_fails() {
        let (videos, jobs, service) = submission();
        jobs.fail_enqueues(true);

        let result = service.submit(Bytes::from_static(b"raw video"), "alice").await;

        assert!(matches!(result, Err(PipelineError::TransientInfra(_))));
        assert_eq!(videos.object_count(), 0);
        assert_eq!(jobs.pending(), 0);
    }

    #[tokio::test]
    async fn failed_rollback_leaves_orphan_and_still_reports_the_enqueue_error() {
        let (videos, jobs, service) = submission();
        jobs.fail_enqueues(true);
        videos.fail_deletes(true);

        let result = service.submit(Bytes::from_static(b"raw video"), "alice").await;

        // The caller still sees the enqueue failure; the orphaned object is
        // left for external reconciliation.
        assert!(matches!(result, Err(PipelineError::TransientInfra(_))));
        assert_eq!(videos.object_count(), 1);
    }

    #[tokio::test]
    async fn failed_store_write_causes_no_queue_side_effects() {
        let (videos, jobs, service) = submission();
        videos.fail_puts(true);

        let result = service.submit(Bytes::from_static(b"raw video"), "alice").await;

        assert!(matches!(result, Err(PipelineError::TransientInfra(_))));
        assert_eq!(videos.object_count(), 0);
        assert_eq!(jobs.pending(), 0);
    }

    #[tokio::test]
    async fn identical_payloads_stay_distinct_jobs() {
        let (_videos, jobs, service) = submission();

        let first = service.submit(Bytes::from_static(b"same"), "alice").await.unwrap();
        let second = service.submit(Bytes::from_static(b"same"), "alice").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(jobs.pending(), 2);
    }

    #[tokio::test]
    async fn submit_rejects_blank_username() {
        let (videos, jobs, service) = submission();

        let result = service.submit(Bytes::from_static(b"raw video"), "  ").await;

        assert!(matches!(result, Err(PipelineError::Validation(_))));
        assert_eq!(videos.object_count(), 0);
        assert_eq!(jobs.pending(), 0);
    }

    #[tokio::test]
    async fn status_follows_result_existence() {
        let audio = Arc::new(MemoryStore::new());
        let service = StatusService::new(audio.clone());

        assert!(matches!(
            service.check("v1").await.unwrap(),
            StatusResponse::Processing
        ));

        audio.put("v1.mp3", Bytes::from_static(b"mp3")).await.unwrap();

        match service.check("v1").await.unwrap() {
            StatusResponse::Completed { audio_key } => assert_eq!(audio_key, "v1.mp3"),
            other => panic!("expected completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn download_distinguishes_missing_from_present() {
        let audio = Arc::new(MemoryStore::new());
        audio.put("v1.mp3", Bytes::from_static(b"mp3")).await.unwrap();
        let service = DownloadService::new(audio);

        assert_eq!(service.fetch("v1.mp3").await.unwrap(), Bytes::from_static(b"mp3"));
        assert!(matches!(
            service.fetch("nope.mp3").await,
            Err(PipelineError::PermanentAsset { .. })
        ));
    }
}
