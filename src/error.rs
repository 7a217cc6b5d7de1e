use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while building or running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Queue capacity must be positive
    #[error("queue capacity must be greater than zero")]
    InvalidCapacity,

    /// Queue size argument did not parse as a strict positive integer
    #[error("invalid queue size: {0} (must be a positive integer)")]
    InvalidQueueSize(String),

    /// No stage names were supplied
    #[error("cannot build a pipeline with no stages")]
    NoStages,

    /// A stage name has no registered implementation
    #[error("unknown stage: {0}")]
    UnknownStage(String),

    /// Stage lifecycle misuse: init called twice
    #[error("stage {0} is already initialized")]
    AlreadyInitialized(String),

    /// Stage lifecycle misuse: operation before init
    #[error("stage {0} is not initialized")]
    NotInitialized(String),

    /// Work was offered to a stage whose worker has already finished
    #[error("stage {0} has already finished processing")]
    StageFinished(String),

    /// The OS refused to spawn a worker thread
    #[error("failed to spawn worker for stage {name}: {source}")]
    WorkerSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked and could not be joined cleanly
    #[error("worker thread for stage {0} panicked")]
    WorkerPanic(String),

    /// A transform rejected an item
    #[error("transform failed: {0}")]
    Transform(String),

    /// I/O error reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
