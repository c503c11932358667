use crate::shared::ids::GroupId;
use crate::shared::serde_ext::parse_via_string;
use crate::workflow::error::EngineError;
use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const FIELD_WANTS_INITIAL_PREMIUM: &str = "wants_initial_premium";
pub const FIELD_PREMIUM_AMOUNT: &str = "premium_amount";
pub const FIELD_PAYMENT_CHANNEL: &str = "payment_channel";
pub const FIELD_PAYMENT_METHOD: &str = "payment_method";
pub const FIELD_PAYMENT_CONFIRMED: &str = "payment_confirmed";
pub const FIELD_CONFIRMATION: &str = "confirmation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentChannel {
    Online,
    Offline,
}

impl PaymentChannel {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            other => Err(format!("unknown payment channel `{other}`")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PaymentChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentChannel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentChannel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_via_string(deserializer, "payment channel", Self::parse)
    }
}

/// A stored payment method keeps only display-safe data; the raw account or
/// card number is consumed by the constructor and never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    BankingAccount { bank_name: String, last_four: String },
    Card { brand: String, last_four: String },
}

impl PaymentMethod {
    pub fn banking_account(bank_name: &str, account_number: &str) -> Result<Self, String> {
        let bank_name = bank_name.trim();
        if bank_name.is_empty() {
            return Err("bank name must be non-empty".to_string());
        }
        let digits = digits_only("account number", account_number, 4, 17)?;
        Ok(Self::BankingAccount {
            bank_name: bank_name.to_string(),
            last_four: last_four(&digits),
        })
    }

    pub fn card(card_number: &str) -> Result<Self, String> {
        let digits = digits_only("card number", card_number, 12, 19)?;
        let brand = match digits.chars().next() {
            Some('3') => "amex",
            Some('4') => "visa",
            Some('5') => "mastercard",
            _ => "card",
        };
        Ok(Self::Card {
            brand: brand.to_string(),
            last_four: last_four(&digits),
        })
    }

    pub fn summary(&self) -> String {
        match self {
            Self::BankingAccount {
                bank_name,
                last_four,
            } => format!("{bank_name} account ending {last_four}"),
            Self::Card { brand, last_four } => format!("{brand} ending {last_four}"),
        }
    }
}

fn digits_only(kind: &str, raw: &str, min: usize, max: usize) -> Result<String, String> {
    let digits: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(format!("{kind} must contain only digits"));
    }
    if digits.len() < min || digits.len() > max {
        return Err(format!("{kind} must be {min} to {max} digits"));
    }
    Ok(digits)
}

fn last_four(digits: &str) -> String {
    digits.chars().skip(digits.len().saturating_sub(4)).collect()
}

/// Gate state of the payment-capture step.
///
/// `wants_payment == None` means the question is unanswered, which is a
/// validator concern; the gate itself only blocks when payment is wanted
/// through the online channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentState {
    pub wants_payment: Option<bool>,
    pub amount: Option<f64>,
    pub channel: Option<PaymentChannel>,
    pub method: Option<PaymentMethod>,
    pub confirmed: bool,
}

impl PaymentState {
    /// Reads the gate state out of a step's open data mapping. Missing or
    /// malformed keys fall back to defaults.
    pub fn from_step_data(data: &Map<String, Value>) -> Self {
        let wants_payment = data
            .get(FIELD_WANTS_INITIAL_PREMIUM)
            .and_then(Value::as_str)
            .and_then(|raw| match raw {
                "yes" => Some(true),
                "no" => Some(false),
                _ => None,
            });
        let amount = data.get(FIELD_PREMIUM_AMOUNT).and_then(Value::as_f64);
        let channel = data
            .get(FIELD_PAYMENT_CHANNEL)
            .and_then(Value::as_str)
            .and_then(|raw| PaymentChannel::parse(raw).ok());
        let method = data
            .get(FIELD_PAYMENT_METHOD)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());
        let confirmed = data
            .get(FIELD_PAYMENT_CONFIRMED)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Self {
            wants_payment,
            amount,
            channel,
            method,
            confirmed,
        }
    }

    /// Writes the gate state back into the step's data mapping. Unset parts
    /// remove their keys so cleared answers do not linger.
    pub fn apply_to(&self, data: &mut Map<String, Value>) {
        match self.wants_payment {
            Some(wants) => {
                data.insert(
                    FIELD_WANTS_INITIAL_PREMIUM.to_string(),
                    Value::String(if wants { "yes" } else { "no" }.to_string()),
                );
            }
            None => {
                data.remove(FIELD_WANTS_INITIAL_PREMIUM);
            }
        }
        match self.amount {
            Some(amount) => {
                data.insert(FIELD_PREMIUM_AMOUNT.to_string(), Value::from(amount));
            }
            None => {
                data.remove(FIELD_PREMIUM_AMOUNT);
            }
        }
        match self.channel {
            Some(channel) => {
                data.insert(
                    FIELD_PAYMENT_CHANNEL.to_string(),
                    Value::String(channel.as_str().to_string()),
                );
            }
            None => {
                data.remove(FIELD_PAYMENT_CHANNEL);
            }
        }
        match &self.method {
            Some(method) => {
                let value = serde_json::to_value(method).unwrap_or(Value::Null);
                data.insert(FIELD_PAYMENT_METHOD.to_string(), value);
            }
            None => {
                data.remove(FIELD_PAYMENT_METHOD);
            }
        }
        if self.confirmed {
            data.insert(FIELD_PAYMENT_CONFIRMED.to_string(), Value::Bool(true));
        } else {
            data.remove(FIELD_PAYMENT_CONFIRMED);
        }
    }

    pub fn set_wants_payment(&mut self, wants: bool) {
        self.wants_payment = Some(wants);
        if !wants {
            self.amount = None;
            self.channel = None;
            self.method = None;
            self.confirmed = false;
        }
    }

    /// Switching channels always drops trust in the prior confirmation.
    pub fn set_channel(&mut self, channel: PaymentChannel) {
        self.channel = Some(channel);
        self.confirmed = false;
    }

    /// Adding or replacing a method never confirms it; the prior
    /// confirmation no longer covers the new method.
    pub fn set_method(&mut self, method: PaymentMethod) {
        self.method = Some(method);
        self.confirmed = false;
    }

    /// The only way `confirmed` becomes true.
    pub fn confirm(&mut self) -> Result<(), EngineError> {
        if self.method.is_none() {
            return Err(EngineError::ConfirmationWithoutMethod);
        }
        self.confirmed = true;
        Ok(())
    }

    /// Human-readable reasons the gate blocks step completion; empty when
    /// satisfied. Offline payment needs no method or confirmation.
    pub fn completion_blockers(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.wants_payment == Some(true) && self.channel == Some(PaymentChannel::Online) {
            if self.method.is_none() {
                reasons.push("an online payment requires a payment method".to_string());
            }
            if !self.confirmed {
                reasons.push("the payment method must be confirmed".to_string());
            }
        }
        reasons
    }
}

/// Normalizes a payment-gated step's data after a raw edit has been merged.
///
/// Invariants enforced here:
/// - `confirmed` cannot be introduced or removed through a data edit; it
///   carries over from the previous state and is reset by the rules below.
/// - Declining payment clears amount, channel, method, and confirmation.
/// - Changing channel or method resets confirmation.
pub fn normalize_after_edit(previous: &PaymentState, data: &mut Map<String, Value>) {
    let mut next = PaymentState::from_step_data(data);
    next.confirmed = previous.confirmed;
    if next.wants_payment != Some(true) {
        next.amount = None;
        next.channel = None;
        next.method = None;
        next.confirmed = false;
    }
    if next.channel != previous.channel {
        next.confirmed = false;
    }
    if next.method != previous.method {
        next.confirmed = false;
    }
    next.apply_to(data);
}

/// Immutable receipt written once per successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub confirmation_number: String,
    pub group_id: GroupId,
    pub amount: f64,
    pub payment_method_summary: String,
    pub recorded_at: DateTime<Utc>,
}

impl PaymentConfirmation {
    pub fn record(
        state: &PaymentState,
        confirmation_number: &str,
        group_id: GroupId,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let method = state
            .method
            .as_ref()
            .ok_or(EngineError::ConfirmationWithoutMethod)?;
        Ok(Self {
            confirmation_number: confirmation_number.to_string(),
            group_id,
            amount: state.amount.unwrap_or_default(),
            payment_method_summary: method.summary(),
            recorded_at,
        })
    }
}
