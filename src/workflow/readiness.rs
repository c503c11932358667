use serde::{Deserialize, Serialize};

/// Verdict of the external readiness check. Produced outside the engine and
/// consumed read-only as a start gate; the engine never re-derives it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResult {
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub blockers: Vec<ReadinessBlocker>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessBlocker {
    pub message: String,
}

impl ReadinessResult {
    pub fn ready() -> Self {
        Self {
            is_ready: true,
            blockers: Vec::new(),
        }
    }

    pub fn blocked<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_ready: false,
            blockers: messages
                .into_iter()
                .map(|message| ReadinessBlocker {
                    message: message.into(),
                })
                .collect(),
        }
    }

    pub fn blocker_messages(&self) -> Vec<String> {
        self.blockers
            .iter()
            .map(|blocker| blocker.message.clone())
            .collect()
    }
}
