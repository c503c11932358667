use crate::shared::ids::StepId;
use crate::workflow::error::EngineError;
use crate::workflow::payment::{
    FIELD_PAYMENT_CHANNEL, FIELD_PREMIUM_AMOUNT, FIELD_WANTS_INITIAL_PREMIUM,
};
use serde_json::{Map, Value};

pub const STEP_BILLING_SETUP: &str = "billing_setup";
pub const STEP_PAYMENT_CAPTURE: &str = "payment_capture";
pub const STEP_ACCESS_REVIEW: &str = "access_review";

pub const FIELD_BILLING_MODEL: &str = "billing_model";
pub const FIELD_BILLING_FREQUENCY: &str = "billing_frequency";
pub const FIELD_RESPONSIBLE_ENTITY: &str = "responsible_entity";
pub const FIELD_REMITTANCE_ADDRESS: &str = "remittance_address";
pub const FIELD_ADMIN_CONTACT_NAME: &str = "admin_contact_name";
pub const FIELD_ADMIN_CONTACT_EMAIL: &str = "admin_contact_email";
pub const FIELD_MAINTENANCE_CONTACT_ACK: &str = "maintenance_contact_ack";

/// Predicate over sibling answers within the same step. A field is active
/// (and therefore required) exactly when its predicate holds.
#[derive(Debug, Clone, PartialEq)]
pub enum RequiredWhen {
    Always,
    FieldEquals { field: String, value: Value },
    AllOf(Vec<RequiredWhen>),
    AnyOf(Vec<RequiredWhen>),
}

impl RequiredWhen {
    pub fn field_equals(field: &str, value: &str) -> Self {
        Self::FieldEquals {
            field: field.to_string(),
            value: Value::String(value.to_string()),
        }
    }

    pub fn is_met(&self, data: &Map<String, Value>) -> bool {
        match self {
            RequiredWhen::Always => true,
            RequiredWhen::FieldEquals { field, value } => {
                data.get(field).map(|current| current == value).unwrap_or(false)
            }
            RequiredWhen::AllOf(rules) => rules.iter().all(|rule| rule.is_met(data)),
            RequiredWhen::AnyOf(rules) => rules.iter().any(|rule| rule.is_met(data)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldConstraint {
    OneOf(Vec<&'static str>),
    Email,
    Digits { min: usize, max: usize },
    Amount { min: f64 },
}

impl FieldConstraint {
    pub fn violation(&self, value: &Value) -> Option<String> {
        match self {
            FieldConstraint::OneOf(allowed) => {
                let raw = value.as_str().unwrap_or_default();
                if allowed.contains(&raw) {
                    None
                } else {
                    Some(format!("must be one of: {}", allowed.join(", ")))
                }
            }
            FieldConstraint::Email => {
                let raw = value.as_str().unwrap_or_default();
                let mut parts = raw.splitn(2, '@');
                let local = parts.next().unwrap_or_default();
                let domain = parts.next().unwrap_or_default();
                if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') {
                    None
                } else {
                    Some("must be a valid email address".to_string())
                }
            }
            FieldConstraint::Digits { min, max } => {
                let raw = value.as_str().unwrap_or_default();
                if raw.len() >= *min && raw.len() <= *max && raw.chars().all(|ch| ch.is_ascii_digit())
                {
                    None
                } else {
                    Some(format!("must be {min} to {max} digits"))
                }
            }
            FieldConstraint::Amount { min } => match value.as_f64() {
                Some(amount) if amount >= *min => None,
                _ => Some(format!("must be an amount of at least {min}")),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: String,
    pub required_when: RequiredWhen,
    pub clear_on_deactivate: bool,
    pub constraints: Vec<FieldConstraint>,
}

impl FieldRule {
    pub fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            required_when: RequiredWhen::Always,
            clear_on_deactivate: false,
            constraints: Vec::new(),
        }
    }

    pub fn when(mut self, predicate: RequiredWhen) -> Self {
        self.required_when = predicate;
        self
    }

    pub fn clearing(mut self) -> Self {
        self.clear_on_deactivate = true;
        self
    }

    pub fn constrained(mut self, constraint: FieldConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub step_id: StepId,
    pub order: u32,
    pub field_rules: Vec<FieldRule>,
    pub skippable: bool,
    pub payment_gated: bool,
}

impl StepDefinition {
    pub fn new(step_id: &str, order: u32) -> Result<Self, EngineError> {
        let step_id = StepId::parse(step_id).map_err(EngineError::Registry)?;
        Ok(Self {
            step_id,
            order,
            field_rules: Vec::new(),
            skippable: false,
            payment_gated: false,
        })
    }

    pub fn with_rules(mut self, rules: Vec<FieldRule>) -> Self {
        self.field_rules = rules;
        self
    }

    pub fn skippable(mut self) -> Self {
        self.skippable = true;
        self
    }

    pub fn payment_gated(mut self) -> Self {
        self.payment_gated = true;
        self
    }
}

/// Static catalog of step definitions. Lookup failures are configuration
/// defects, not user errors; `definition_for` asserts loudly in debug builds.
#[derive(Debug, Clone)]
pub struct StepDefinitionRegistry {
    steps: Vec<StepDefinition>,
}

impl StepDefinitionRegistry {
    pub fn new(mut steps: Vec<StepDefinition>) -> Result<Self, EngineError> {
        if steps.is_empty() {
            return Err(EngineError::Registry(
                "catalog must declare at least one step".to_string(),
            ));
        }
        steps.sort_by_key(|step| step.order);
        for pair in steps.windows(2) {
            if pair[0].order == pair[1].order {
                return Err(EngineError::Registry(format!(
                    "steps `{}` and `{}` share order {}",
                    pair[0].step_id, pair[1].step_id, pair[0].order
                )));
            }
        }
        for (index, step) in steps.iter().enumerate() {
            if steps[..index]
                .iter()
                .any(|other| other.step_id == step.step_id)
            {
                return Err(EngineError::Registry(format!(
                    "duplicate step id `{}`",
                    step.step_id
                )));
            }
        }
        Ok(Self { steps })
    }

    pub fn definition_for(&self, step_id: &StepId) -> Result<&StepDefinition, EngineError> {
        self.steps
            .iter()
            .find(|step| &step.step_id == step_id)
            .ok_or_else(|| EngineError::UnknownStep {
                step_id: step_id.to_string(),
            })
    }

    /// Definitions in traversal order.
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn first_step(&self) -> &StepDefinition {
        &self.steps[0]
    }

    pub fn position_of(&self, step_id: &StepId) -> Option<usize> {
        self.steps.iter().position(|step| &step.step_id == step_id)
    }
}

/// Production catalog for employer-group onboarding.
pub fn onboarding_catalog() -> StepDefinitionRegistry {
    let self_administered =
        RequiredWhen::field_equals(FIELD_BILLING_MODEL, "self_administered");
    let wants_premium = RequiredWhen::field_equals(FIELD_WANTS_INITIAL_PREMIUM, "yes");

    let billing_setup = StepDefinition::new(STEP_BILLING_SETUP, 0)
        .expect("catalog step id is valid")
        .with_rules(vec![
            FieldRule::required(FIELD_BILLING_MODEL)
                .constrained(FieldConstraint::OneOf(vec!["list_bill", "self_administered"])),
            FieldRule::required(FIELD_BILLING_FREQUENCY)
                .constrained(FieldConstraint::OneOf(vec!["monthly", "quarterly", "annual"])),
            FieldRule::required(FIELD_RESPONSIBLE_ENTITY)
                .constrained(FieldConstraint::OneOf(vec!["employer", "broker", "tpa"])),
            FieldRule::required(FIELD_REMITTANCE_ADDRESS)
                .when(self_administered.clone())
                .clearing(),
            FieldRule::required(FIELD_ADMIN_CONTACT_NAME)
                .when(self_administered.clone())
                .clearing(),
            FieldRule::required(FIELD_ADMIN_CONTACT_EMAIL)
                .when(self_administered)
                .clearing()
                .constrained(FieldConstraint::Email),
        ]);

    let payment_capture = StepDefinition::new(STEP_PAYMENT_CAPTURE, 1)
        .expect("catalog step id is valid")
        .payment_gated()
        .with_rules(vec![
            FieldRule::required(FIELD_WANTS_INITIAL_PREMIUM)
                .constrained(FieldConstraint::OneOf(vec!["yes", "no"])),
            FieldRule::required(FIELD_PREMIUM_AMOUNT)
                .when(wants_premium.clone())
                .clearing()
                .constrained(FieldConstraint::Amount { min: 0.01 }),
            FieldRule::required(FIELD_PAYMENT_CHANNEL)
                .when(wants_premium)
                .clearing()
                .constrained(FieldConstraint::OneOf(vec!["online", "offline"])),
        ]);

    let access_review = StepDefinition::new(STEP_ACCESS_REVIEW, 2)
        .expect("catalog step id is valid")
        .skippable()
        .with_rules(vec![FieldRule::required(FIELD_MAINTENANCE_CONTACT_ACK)
            .constrained(FieldConstraint::OneOf(vec!["yes", "no"]))]);

    StepDefinitionRegistry::new(vec![billing_setup, payment_capture, access_review])
        .expect("onboarding catalog is well-formed")
}
