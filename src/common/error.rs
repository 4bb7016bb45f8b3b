use thiserror::Error;

/// Pipeline error taxonomy.
///
/// The synchronous submission path surfaces these directly to the caller;
/// the asynchronous stages never do. A conversion or notification failure is
/// only visible as a status that stays at processing, plus the worker logs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or absent request shape. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Store, queue or publish temporarily unreachable. Synchronous callers
    /// see it immediately; workers leave the inbound message un-acked and
    /// let queue redelivery retry the whole job.
    #[error("transient infrastructure failure: {0}")]
    TransientInfra(#[source] anyhow::Error),

    /// The referenced source asset no longer exists. Non-retryable: the job
    /// is abandoned and no notification is ever emitted for it.
    #[error("source asset {key} not found")]
    PermanentAsset { key: String },

    /// Rollback of an already-committed side effect failed. Logged once and
    /// never retried; the orphaned object can only be repaired by an
    /// external reconciliation pass.
    #[error("compensation failed for {key}: {source}")]
    Compensation {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn transient(err: impl Into<anyhow::Error>) -> Self {
        Self::TransientInfra(err.into())
    }
}
