use crate::common::error::PipelineError;
use crate::infrastructure::storage::ObjectStore;
use tracing::{error, info};

/// Best-effort rollback of a stored object after a later required step
/// failed.
///
/// Returns `true` when the object was removed. A failed rollback is
/// terminal: it is logged under the `compensation` target with the orphaned
/// key and never retried, so an external reconciliation process can find
/// the object later.
pub async fn undo_put(store: &dyn ObjectStore, key: &str) -> bool {
    match store.delete(key).await {
        Ok(()) => {
            info!(key, "rolled back stored object");
            true
        }
        Err(err) => {
            let failure = PipelineError::Compensation {
                key: key.to_string(),
                source: err.into(),
            };
            error!(
                target: "compensation",
                key,
                error = %failure,
                "rollback failed, orphaned object requires external reconciliation"
            );
            false
        }
    }
}
