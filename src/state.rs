use crate::config::settings::AppConfig;
use crate::infrastructure::queue::WorkQueue;
use crate::infrastructure::storage::ObjectStore;
use crate::modules::media::service::{DownloadService, StatusService, SubmissionService};
use std::sync::Arc;

/// Gateway state: configuration plus the pipeline services, each built
/// once at startup from explicitly injected store/queue handles.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub submission: SubmissionService,
    pub status: StatusService,
    pub download: DownloadService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        videos: Arc<dyn ObjectStore>,
        audio: Arc<dyn ObjectStore>,
        jobs: Arc<dyn WorkQueue>,
    ) -> Self {
        Self {
            config,
            submission: SubmissionService::new(videos, jobs),
            status: StatusService::new(audio.clone()),
            download: DownloadService::new(audio),
        }
    }
}
