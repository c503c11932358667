use crate::workflow::sequencer::StepStatus;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown step id `{step_id}`")]
    UnknownStep { step_id: String },
    #[error("step catalog is malformed: {0}")]
    Registry(String),
    #[error("workflow is not ready to start: {}", .blockers.join("; "))]
    NotReady { blockers: Vec<String> },
    #[error("step `{step_id}` cannot be completed: {}", .reasons.join("; "))]
    CompletionBlocked {
        step_id: String,
        reasons: Vec<String>,
    },
    #[error("step `{step_id}` does not allow skipping")]
    SkipNotAllowed { step_id: String },
    #[error("payment cannot be confirmed before a payment method is added")]
    ConfirmationWithoutMethod,
    #[error("a payment confirmation is already recorded for step `{step_id}`")]
    ConfirmationAlreadyRecorded { step_id: String },
    #[error("step status transition `{from}` -> `{to}` is invalid")]
    InvalidStatusTransition { from: StepStatus, to: StepStatus },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
