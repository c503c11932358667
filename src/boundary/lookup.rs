/// Supersede-don't-race bookkeeping for debounced lookups (user search,
/// prefill autocomplete). The boundary issues a ticket per query; a result
/// is applied only while its ticket is still the newest, so a stale
/// in-flight response is discarded instead of clobbering a fresher one.

pub const DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket(u64);

#[derive(Debug, Default)]
pub struct LookupSequencer {
    issued: u64,
    applied: u64,
}

impl LookupSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> QueryTicket {
        self.issued += 1;
        QueryTicket(self.issued)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Returns true when the result for `ticket` should be applied; marks it
    /// consumed so the same response cannot apply twice.
    pub fn try_apply(&mut self, ticket: QueryTicket) -> bool {
        if ticket.0 == self.issued && ticket.0 > self.applied {
            self.applied = ticket.0;
            return true;
        }
        false
    }
}
