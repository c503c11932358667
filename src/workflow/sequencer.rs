use crate::shared::ids::StepId;
use crate::workflow::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Completed,
    Skipped,
}

impl StepStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (StepStatus::NotStarted, StepStatus::InProgress)
                | (StepStatus::NotStarted, StepStatus::Skipped)
                | (StepStatus::InProgress, StepStatus::Completed)
                | (StepStatus::InProgress, StepStatus::Skipped)
                | (StepStatus::Completed, StepStatus::InProgress)
        )
    }

    /// Settled steps unlock their successor.
    pub fn is_settled(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Skipped)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::NotStarted => write!(f, "not_started"),
            StepStatus::InProgress => write!(f, "in_progress"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_id: StepId,
    pub order: u32,
    pub status: StepStatus,
    #[serde(default)]
    pub is_accessible: bool,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl StepRecord {
    pub fn fresh(step_id: StepId, order: u32) -> Self {
        Self {
            step_id,
            order,
            status: StepStatus::NotStarted,
            is_accessible: false,
            is_enabled: true,
            data: Map::new(),
        }
    }
}

pub fn transition_status(record: &mut StepRecord, next: StepStatus) -> Result<(), EngineError> {
    if !record.status.can_transition_to(next) {
        return Err(EngineError::InvalidStatusTransition {
            from: record.status,
            to: next,
        });
    }
    record.status = next;
    Ok(())
}

/// Editing or navigating into a step enters it. Reopening a completed step
/// is deliberate leniency; skipped steps stay skipped.
pub fn mark_entered(record: &mut StepRecord) {
    if matches!(record.status, StepStatus::NotStarted | StepStatus::Completed) {
        record.status = StepStatus::InProgress;
    }
}

/// Strict linear unlock with forward-progress preservation: step 0 is always
/// accessible, step N unlocks once step N-1 settles, and access already
/// granted downstream is never revoked when an earlier step reopens.
pub fn recompute_accessibility(steps: &mut [StepRecord]) {
    let mut previous_settled = true;
    for record in steps.iter_mut() {
        if previous_settled {
            record.is_accessible = true;
        }
        previous_settled = record.status.is_settled();
    }
}

/// Instance-level enabled flag mirrored onto every step; interaction can be
/// restricted independently of accessibility.
pub fn apply_enabled(steps: &mut [StepRecord], enabled: bool) {
    for record in steps.iter_mut() {
        record.is_enabled = enabled;
    }
}

pub fn can_go_to(steps: &[StepRecord], step_id: &StepId) -> bool {
    steps
        .iter()
        .find(|record| &record.step_id == step_id)
        .map(|record| record.is_accessible && record.is_enabled)
        .unwrap_or(false)
}
