use crate::shared::ids::{CaseId, StepId};
use crate::workflow::error::EngineError;
use crate::workflow::payment::{
    self, PaymentConfirmation, PaymentMethod, PaymentState, FIELD_CONFIRMATION,
    FIELD_PAYMENT_METHOD,
};
use crate::workflow::readiness::ReadinessResult;
use crate::workflow::registry::StepDefinitionRegistry;
use crate::workflow::sequencer::{self, StepRecord, StepStatus};
use crate::workflow::validator::{self, StepEvaluation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serialized form of one case's onboarding run. `snapshot()` and `load()`
/// round-trip this losslessly, including step data keys the engine does not
/// interpret itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub case_id: CaseId,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub current_step_id: StepId,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

fn default_enabled() -> bool {
    true
}

/// Owns the canonical workflow instance and mediates every read and write:
/// edits run the conditional validator, apply its clears atomically, keep
/// step statuses legal, and recompute accessibility.
#[derive(Debug, Clone)]
pub struct WorkflowStateStore {
    registry: StepDefinitionRegistry,
    case_id: CaseId,
    enabled: bool,
    current_step_id: StepId,
    steps: Vec<StepRecord>,
}

impl WorkflowStateStore {
    /// Builds a fresh instance, refusing when the readiness check failed and
    /// surfacing its blockers verbatim.
    pub fn start(
        registry: StepDefinitionRegistry,
        case_id: CaseId,
        readiness: &ReadinessResult,
    ) -> Result<Self, EngineError> {
        if !readiness.is_ready {
            return Err(EngineError::NotReady {
                blockers: readiness.blocker_messages(),
            });
        }
        let mut steps: Vec<StepRecord> = registry
            .steps()
            .iter()
            .map(|definition| StepRecord::fresh(definition.step_id.clone(), definition.order))
            .collect();
        sequencer::recompute_accessibility(&mut steps);
        let current_step_id = registry.first_step().step_id.clone();
        Ok(Self {
            registry,
            case_id,
            enabled: true,
            current_step_id,
            steps,
        })
    }

    /// Restores an instance from persisted state. Steps missing from the
    /// payload fall back to their defaults; persisted steps the catalog no
    /// longer declares are dropped.
    pub fn load(
        registry: StepDefinitionRegistry,
        instance: WorkflowInstance,
    ) -> Result<Self, EngineError> {
        let mut steps: Vec<StepRecord> = registry
            .steps()
            .iter()
            .map(|definition| StepRecord::fresh(definition.step_id.clone(), definition.order))
            .collect();
        for persisted in instance.steps {
            if let Some(record) = steps
                .iter_mut()
                .find(|record| record.step_id == persisted.step_id)
            {
                record.status = persisted.status;
                record.is_accessible = persisted.is_accessible;
                record.data = persisted.data;
            }
        }
        sequencer::recompute_accessibility(&mut steps);
        sequencer::apply_enabled(&mut steps, instance.enabled);
        let current_step_id = if registry.position_of(&instance.current_step_id).is_some() {
            instance.current_step_id
        } else {
            registry.first_step().step_id.clone()
        };
        Ok(Self {
            registry,
            case_id: instance.case_id,
            enabled: instance.enabled,
            current_step_id,
            steps,
        })
    }

    /// Last load wins: replaces the whole in-memory instance with the
    /// freshly persisted one, discarding optimistic local edits.
    pub fn reload(&mut self, instance: WorkflowInstance) -> Result<(), EngineError> {
        *self = Self::load(self.registry.clone(), instance)?;
        Ok(())
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn step(&self, step_id: &StepId) -> Result<&StepRecord, EngineError> {
        self.registry.definition_for(step_id)?;
        Ok(self
            .steps
            .iter()
            .find(|record| &record.step_id == step_id)
            .expect("every catalog step has a record"))
    }

    fn step_mut(&mut self, step_id: &StepId) -> Result<&mut StepRecord, EngineError> {
        self.registry.definition_for(step_id)?;
        Ok(self
            .steps
            .iter_mut()
            .find(|record| &record.step_id == step_id)
            .expect("every catalog step has a record"))
    }

    pub fn step_data(&self, step_id: &StepId) -> Result<&Map<String, Value>, EngineError> {
        Ok(&self.step(step_id)?.data)
    }

    /// Merges a partial edit into the step's data (a `null` value removes
    /// the key), applies the gate and validator rules, and returns the fresh
    /// evaluation. Entering data flips the step in progress, including the
    /// deliberate reopen of a completed step.
    pub fn set_step_data(
        &mut self,
        step_id: &StepId,
        partial: Map<String, Value>,
    ) -> Result<StepEvaluation, EngineError> {
        let definition = self.registry.definition_for(step_id)?.clone();
        let record = self
            .steps
            .iter_mut()
            .find(|record| &record.step_id == step_id)
            .expect("every catalog step has a record");

        let previous_payment = definition
            .payment_gated
            .then(|| PaymentState::from_step_data(&record.data));
        for (key, value) in partial {
            if value.is_null() {
                record.data.remove(&key);
            } else {
                record.data.insert(key, value);
            }
        }
        if let Some(previous) = previous_payment {
            payment::normalize_after_edit(&previous, &mut record.data);
        }

        let first_pass = validator::evaluate(&definition, &record.data);
        let evaluation = if first_pass.to_clear.is_empty() {
            first_pass
        } else {
            for field in &first_pass.to_clear {
                record.data.remove(field);
            }
            validator::evaluate(&definition, &record.data)
        };

        sequencer::mark_entered(record);
        sequencer::recompute_accessibility(&mut self.steps);
        Ok(evaluation)
    }

    /// Pure "would completing this step succeed" check: validator errors
    /// plus the payment gate's reasons, human-readable, never a bare bool.
    pub fn completion_blockers(&self, step_id: &StepId) -> Result<Vec<String>, EngineError> {
        let definition = self.registry.definition_for(step_id)?;
        let record = self
            .steps
            .iter()
            .find(|record| &record.step_id == step_id)
            .expect("every catalog step has a record");
        let evaluation = validator::evaluate(definition, &record.data);
        let mut reasons: Vec<String> = evaluation
            .errors
            .iter()
            .map(|(field, reason)| format!("{field} {reason}"))
            .collect();
        if definition.payment_gated {
            reasons.extend(PaymentState::from_step_data(&record.data).completion_blockers());
        }
        Ok(reasons)
    }

    pub fn evaluate_step(&self, step_id: &StepId) -> Result<StepEvaluation, EngineError> {
        let definition = self.registry.definition_for(step_id)?;
        let record = self.step(step_id)?;
        Ok(validator::evaluate(definition, &record.data))
    }

    pub fn complete_step(&mut self, step_id: &StepId) -> Result<(), EngineError> {
        let reasons = self.completion_blockers(step_id)?;
        if !reasons.is_empty() {
            return Err(EngineError::CompletionBlocked {
                step_id: step_id.to_string(),
                reasons,
            });
        }
        let record = self.step_mut(step_id)?;
        if record.status == StepStatus::NotStarted {
            sequencer::mark_entered(record);
        }
        sequencer::transition_status(record, StepStatus::Completed)?;
        sequencer::recompute_accessibility(&mut self.steps);
        Ok(())
    }

    pub fn skip_step(&mut self, step_id: &StepId) -> Result<(), EngineError> {
        let definition = self.registry.definition_for(step_id)?;
        if !definition.skippable {
            return Err(EngineError::SkipNotAllowed {
                step_id: step_id.to_string(),
            });
        }
        let record = self.step_mut(step_id)?;
        sequencer::transition_status(record, StepStatus::Skipped)?;
        sequencer::recompute_accessibility(&mut self.steps);
        Ok(())
    }

    /// Moves the current pointer. No-ops (returning false) when the target
    /// is unknown, inaccessible, or the instance is disabled; callers check
    /// `is_accessible` before offering navigation.
    pub fn go_to(&mut self, step_id: &StepId) -> bool {
        if !self.enabled || !sequencer::can_go_to(&self.steps, step_id) {
            return false;
        }
        self.current_step_id = step_id.clone();
        if let Some(record) = self
            .steps
            .iter_mut()
            .find(|record| &record.step_id == step_id)
        {
            // Navigation-in starts a fresh step; a completed step reopens
            // only on edit.
            if record.status == StepStatus::NotStarted {
                record.status = StepStatus::InProgress;
            }
        }
        true
    }

    pub fn current_step(&self) -> &StepRecord {
        self.steps
            .iter()
            .find(|record| record.step_id == self.current_step_id)
            .expect("current step exists in catalog")
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        sequencer::apply_enabled(&mut self.steps, enabled);
    }

    /// Stores a display-safe payment method through the normal edit path;
    /// the gate rules reset any prior confirmation.
    pub fn set_payment_method(
        &mut self,
        step_id: &StepId,
        method: PaymentMethod,
    ) -> Result<StepEvaluation, EngineError> {
        let mut partial = Map::new();
        partial.insert(
            FIELD_PAYMENT_METHOD.to_string(),
            serde_json::to_value(&method).expect("payment method serializes"),
        );
        self.set_step_data(step_id, partial)
    }

    /// Explicit confirmation action; the only path that sets the payment
    /// gate's `confirmed` flag.
    pub fn confirm_payment(&mut self, step_id: &StepId) -> Result<(), EngineError> {
        let record = self.step_mut(step_id)?;
        let mut state = PaymentState::from_step_data(&record.data);
        state.confirm()?;
        state.apply_to(&mut record.data);
        sequencer::mark_entered(record);
        Ok(())
    }

    /// Writes the immutable receipt into the step's data, exactly once.
    pub fn attach_confirmation(
        &mut self,
        step_id: &StepId,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), EngineError> {
        let record = self.step_mut(step_id)?;
        if record.data.contains_key(FIELD_CONFIRMATION) {
            return Err(EngineError::ConfirmationAlreadyRecorded {
                step_id: step_id.to_string(),
            });
        }
        let value = serde_json::to_value(confirmation).expect("confirmation serializes");
        record.data.insert(FIELD_CONFIRMATION.to_string(), value);
        Ok(())
    }

    pub fn snapshot(&self) -> WorkflowInstance {
        WorkflowInstance {
            case_id: self.case_id.clone(),
            enabled: self.enabled,
            current_step_id: self.current_step_id.clone(),
            steps: self.steps.clone(),
        }
    }
}
