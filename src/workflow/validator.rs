use crate::workflow::registry::StepDefinition;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Result of evaluating one step's answers against its field rules.
///
/// `to_clear` lists fields whose predicate no longer holds but which still
/// carry a value; the state store resets them on the same edit event so a
/// hidden field never keeps a stale answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepEvaluation {
    pub active_fields: BTreeSet<String>,
    pub errors: BTreeMap<String, String>,
    pub to_clear: Vec<String>,
}

impl StepEvaluation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(raw) => raw.trim().is_empty(),
        _ => false,
    }
}

/// Evaluates a step against its current answers. Missing fields are treated
/// as empty; evaluating a step with no prior data never fails.
pub fn evaluate(definition: &StepDefinition, data: &Map<String, Value>) -> StepEvaluation {
    let mut evaluation = StepEvaluation::default();
    for rule in &definition.field_rules {
        if rule.required_when.is_met(data) {
            evaluation.active_fields.insert(rule.field.clone());
            match data.get(&rule.field).filter(|value| !value_is_empty(value)) {
                None => {
                    evaluation
                        .errors
                        .insert(rule.field.clone(), "is required".to_string());
                }
                Some(value) => {
                    if let Some(reason) = rule
                        .constraints
                        .iter()
                        .find_map(|constraint| constraint.violation(value))
                    {
                        evaluation.errors.insert(rule.field.clone(), reason);
                    }
                }
            }
        } else if rule.clear_on_deactivate
            && data
                .get(&rule.field)
                .map(|value| !value_is_empty(value))
                .unwrap_or(false)
        {
            evaluation.to_clear.push(rule.field.clone());
        }
    }
    evaluation
}
