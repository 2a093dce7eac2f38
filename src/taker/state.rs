//! # Poll State Machine
//!
//! [`PollOperation`] is an immutable snapshot of how far a take has progressed. Every
//! transition returns a new snapshot, so the pipeline threads values through its loop
//! instead of sharing a mutable state behind a lock.
//!
//! ```text
//!  AwaitingAck ──Processing──▶ AckPendingPoll ──Processing──▶ Polling ─┐
//!   │  ▲ transient              │  ▲ transient                 ▲       │ Processing /
//!   │  └─(no pause)             │  └─(retry_interval)          └───────┘ transient
//!   │                           │                                      (retry_interval)
//!   └──── Accepted / Declined / decline reason ────▶ Resolved(Outcome) ◀───┘
//! ```
//!
//! The first poll is paid `initial_poll_delay` after the submit answered `Processing`.
//! Every later poll is paced by `retry_interval`. A transient submit failure is resubmitted
//! with no pause at all; that asymmetry is deliberate and covered by tests.

use crate::clients::TransportFailure;
use crate::framework::CommandKind;
use crate::model::{Order, TakeResponse};
use std::time::Duration;

/// Terminal result of one race branch, before details are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    AcceptedPending,
    Declined(String),
}

/// Phase of the polling state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    AwaitingAck,
    AckPendingPoll,
    Polling,
    Resolved(Outcome),
}

impl PollState {
    fn rank(&self) -> u8 {
        match self {
            PollState::AwaitingAck => 0,
            PollState::AckPendingPoll => 1,
            PollState::Polling => 2,
            PollState::Resolved(_) => 3,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, PollState::Resolved(_))
    }
}

/// Immutable snapshot of pipeline progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOperation {
    state: PollState,
    order: Order,
    retry_interval: Duration,
    initial_poll_delay: Duration,
}

impl PollOperation {
    /// A fresh operation in [`PollState::AwaitingAck`].
    pub fn start(order: Order, retry_interval: Duration, initial_poll_delay: Duration) -> Self {
        Self {
            state: PollState::AwaitingAck,
            order,
            retry_interval,
            initial_poll_delay,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub fn initial_poll_delay(&self) -> Duration {
        self.initial_poll_delay
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            PollState::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The call the current state issues, or `None` once resolved.
    pub fn next_command(&self) -> Option<CommandKind> {
        match self.state {
            PollState::AwaitingAck => Some(CommandKind::SubmitTake),
            PollState::AckPendingPoll | PollState::Polling => Some(CommandKind::PollStatus),
            PollState::Resolved(_) => None,
        }
    }

    /// Returns a snapshot in `next`.
    ///
    /// States never regress: asking for an earlier state, or for anything once resolved,
    /// returns the snapshot unchanged.
    pub fn move_to(&self, next: PollState) -> Self {
        if self.state.is_resolved() || next.rank() < self.state.rank() {
            return self.clone();
        }
        Self {
            state: next,
            ..self.clone()
        }
    }

    /// Folds the answer of the call issued from the current state.
    pub fn absorb(&self, result: Result<TakeResponse, TransportFailure>) -> Self {
        let next = match result {
            Ok(TakeResponse::Accepted) => PollState::Resolved(Outcome::AcceptedPending),
            Ok(TakeResponse::Declined(reason)) => PollState::Resolved(Outcome::Declined(reason)),
            Ok(TakeResponse::Processing) => match self.state {
                PollState::AwaitingAck => PollState::AckPendingPoll,
                _ => PollState::Polling,
            },
            Err(failure) => match failure.decline_reason() {
                Some(reason) => PollState::Resolved(Outcome::Declined(reason.to_string())),
                None => self.state.clone(),
            },
        };
        self.move_to(next)
    }

    /// How long to wait before issuing the call of the current state, given the state
    /// the previous call was issued from.
    pub fn pause_before_next(&self, previous: &PollState) -> Duration {
        match (&self.state, previous) {
            (PollState::AckPendingPoll, PollState::AwaitingAck) => self.initial_poll_delay,
            (PollState::AckPendingPoll, _) | (PollState::Polling, _) => self.retry_interval,
            (PollState::AwaitingAck, _) | (PollState::Resolved(_), _) => Duration::ZERO,
        }
    }
}
