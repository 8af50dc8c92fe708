//! Fetch session bookkeeping.
//!
//! At most one session is live per data source. Beginning a new session
//! aborts the in-flight one (cooperative, via `AbortHandle`) and bumps a
//! generation counter; a completion whose ticket carries a stale generation
//! is refused, so an already-resolved response that raced past its abort can
//! never mutate state. The abort signal alone is not enough for that — the
//! generation check is the liveness flag.

use futures::future::{AbortHandle, AbortRegistration};

use crate::config::DEBUG_FLAGS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Price,
    Holders,
}

/// Classification of a completed fetch: initial/range-change loads drive
/// loading states and fit-to-content, refreshes stay visually silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initial,
    Refresh,
}

/// Proof of having begun a session. `complete` only accepts the ticket of
/// the newest session per source.
#[derive(Debug)]
pub struct SessionTicket {
    pub source: DataSource,
    pub kind: FetchKind,
    generation: u64,
}

#[derive(Debug, Default)]
struct SourceSlot {
    generation: u64,
    in_flight: Option<AbortHandle>,
}

#[derive(Debug, Default)]
pub struct FetchSessionManager {
    price: SourceSlot,
    holders: SourceSlot,
}

impl FetchSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session, aborting any in-flight one for the same source.
    /// The returned registration arms the fetch future's `Abortable`.
    pub fn begin(
        &mut self,
        source: DataSource,
        kind: FetchKind,
    ) -> (SessionTicket, AbortRegistration) {
        let slot = self.slot_mut(source);

        if let Some(prior) = slot.in_flight.take() {
            prior.abort();
            if DEBUG_FLAGS.print_fetch_sessions {
                log::info!("[session] {source:?}: superseding in-flight fetch");
            }
        }

        slot.generation += 1;
        let (handle, registration) = AbortHandle::new_pair();
        slot.in_flight = Some(handle);

        (
            SessionTicket {
                source,
                kind,
                generation: slot.generation,
            },
            registration,
        )
    }

    /// Completion gate. Returns true only when the ticket still names the
    /// live session; a stale ticket means the result must be discarded with
    /// zero state mutation.
    pub fn complete(&mut self, ticket: &SessionTicket) -> bool {
        let slot = self.slot_mut(ticket.source);
        if slot.generation == ticket.generation {
            slot.in_flight = None;
            true
        } else {
            if DEBUG_FLAGS.print_fetch_sessions {
                log::info!("[session] {:?}: stale completion discarded", ticket.source);
            }
            false
        }
    }

    pub fn in_progress(&self, source: DataSource) -> bool {
        self.slot(source).in_flight.is_some()
    }

    /// Teardown path: abort everything still in flight.
    pub fn abort_all(&mut self) {
        for source in [DataSource::Price, DataSource::Holders] {
            if let Some(handle) = self.slot_mut(source).in_flight.take() {
                handle.abort();
            }
        }
    }

    fn slot(&self, source: DataSource) -> &SourceSlot {
        match source {
            DataSource::Price => &self.price,
            DataSource::Holders => &self.holders,
        }
    }

    fn slot_mut(&mut self, source: DataSource) -> &mut SourceSlot {
        match source {
            DataSource::Price => &mut self.price,
            DataSource::Holders => &mut self.holders,
        }
    }
}

impl Drop for FetchSessionManager {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::Abortable;

    #[test]
    fn test_superseded_session_cannot_complete() {
        let mut sessions = FetchSessionManager::new();

        let (ticket_a, _reg_a) = sessions.begin(DataSource::Price, FetchKind::Initial);
        let (ticket_b, _reg_b) = sessions.begin(DataSource::Price, FetchKind::Refresh);

        // A resolves after B started: its completion must be refused,
        // regardless of completion order.
        assert!(!sessions.complete(&ticket_a));
        assert!(sessions.complete(&ticket_b));
    }

    #[test]
    fn test_begin_aborts_prior_in_flight_future() {
        let mut sessions = FetchSessionManager::new();

        let (_ticket_a, reg_a) = sessions.begin(DataSource::Price, FetchKind::Initial);
        let (_ticket_b, _reg_b) = sessions.begin(DataSource::Price, FetchKind::Refresh);

        // The fetch armed with A's registration observes the abort.
        let outcome = block_on(Abortable::new(async { 42 }, reg_a));
        assert!(outcome.is_err());
    }

    #[test]
    fn test_cancellation_race_applies_no_state() {
        // Simulated consumer: data is applied only behind the completion gate.
        let mut sessions = FetchSessionManager::new();
        let mut applied: Vec<&str> = Vec::new();

        let (ticket_a, _reg_a) = sessions.begin(DataSource::Price, FetchKind::Initial);
        let (ticket_b, _reg_b) = sessions.begin(DataSource::Price, FetchKind::Initial);

        // B completes first, then A's stale resolution arrives.
        if sessions.complete(&ticket_b) {
            applied.push("B");
        }
        if sessions.complete(&ticket_a) {
            applied.push("A");
        }

        assert_eq!(applied, vec!["B"]);
    }

    #[test]
    fn test_sources_are_independent() {
        let mut sessions = FetchSessionManager::new();

        let (price_ticket, _pr) = sessions.begin(DataSource::Price, FetchKind::Initial);
        let (holders_ticket, _hr) = sessions.begin(DataSource::Holders, FetchKind::Initial);

        // Neither supersedes the other.
        assert!(sessions.complete(&price_ticket));
        assert!(sessions.complete(&holders_ticket));
    }

    #[test]
    fn test_in_progress_tracking() {
        let mut sessions = FetchSessionManager::new();
        assert!(!sessions.in_progress(DataSource::Price));

        let (ticket, _reg) = sessions.begin(DataSource::Price, FetchKind::Initial);
        assert!(sessions.in_progress(DataSource::Price));

        sessions.complete(&ticket);
        assert!(!sessions.in_progress(DataSource::Price));
    }
}
