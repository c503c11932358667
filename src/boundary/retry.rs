/// Pure retry/error-classification policy for the external calls that
/// surround the engine. The surrounding application owns the actual
/// transport and timers; this layer only decides what to do next.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The call never reached the server (status 0).
    Transport,
    /// 401: the session is gone; never retried.
    Unauthorized,
    /// 403, optionally with a server-supplied recovery hint.
    Forbidden { hint: Option<String> },
    /// Other 4xx: the request itself is wrong; never retried.
    Client { status: u16 },
    /// 5xx: transient server failure.
    Server { status: u16 },
}

pub fn classify_status(status: u16, hint: Option<String>) -> ApiErrorKind {
    match status {
        0 => ApiErrorKind::Transport,
        401 => ApiErrorKind::Unauthorized,
        403 => ApiErrorKind::Forbidden { hint },
        400..=499 => ApiErrorKind::Client { status },
        _ => ApiErrorKind::Server { status },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    Idempotent,
    NonIdempotent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { delay_ms: u64 },
    Surface { message: String, hint: Option<String> },
    ForceLogout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Bounded exponential backoff: 1000ms for the first retry, 2000ms for
    /// the second.
    pub fn backoff_delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay_ms << exponent
    }

    /// `attempt` counts failures so far, starting at 1 for the first one.
    pub fn decide(
        &self,
        error: &ApiErrorKind,
        idempotency: Idempotency,
        attempt: u32,
    ) -> RetryDecision {
        match error {
            ApiErrorKind::Unauthorized => RetryDecision::ForceLogout,
            ApiErrorKind::Forbidden { hint } => RetryDecision::Surface {
                message: "you do not have permission to perform this action".to_string(),
                hint: hint.clone(),
            },
            ApiErrorKind::Client { status } => RetryDecision::Surface {
                message: format!("the request was rejected (status {status})"),
                hint: None,
            },
            ApiErrorKind::Transport => self.retry_or_surface(
                idempotency,
                attempt,
                "could not reach the server; check your connection".to_string(),
            ),
            ApiErrorKind::Server { status } => self.retry_or_surface(
                idempotency,
                attempt,
                format!("the server reported an error (status {status})"),
            ),
        }
    }

    fn retry_or_surface(
        &self,
        idempotency: Idempotency,
        attempt: u32,
        message: String,
    ) -> RetryDecision {
        if idempotency == Idempotency::Idempotent && attempt <= self.max_retries {
            RetryDecision::Retry {
                delay_ms: self.backoff_delay_ms(attempt),
            }
        } else {
            RetryDecision::Surface {
                message,
                hint: None,
            }
        }
    }
}
